//! # Core Domain Entities
//!
//! The two request kinds handled by the gate and the lifecycle block they
//! share.
//!
//! ## State Machine
//!
//! ```text
//! [PENDING] ──approve──→ [APPROVED]   (terminal)
//!     │
//!     └──────reject───→ [REJECTED]   (terminal)
//! ```
//!
//! ## Durable Shape
//!
//! Both requests serialize to a flat JSON object. The lifecycle fields are
//! flattened into the request, optional fields are omitted when empty and
//! tolerated when missing.

use crate::errors::TransitionError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Wall-clock timestamp used on every record.
pub type Timestamp = DateTime<Utc>;

/// Operator name recorded when a decision does not name one.
pub const DEFAULT_OPERATOR: &str = "admin";

/// Lifecycle status of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    /// Awaiting an operator decision.
    #[default]
    Pending,
    /// Provisioned and closed.
    Approved,
    /// Closed without provisioning.
    Rejected,
}

impl RequestStatus {
    /// Approved and Rejected never transition again.
    pub fn is_terminal(self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(RequestStatus::Pending),
            "approved" => Ok(RequestStatus::Approved),
            "rejected" => Ok(RequestStatus::Rejected),
            other => Err(format!("unknown request status: {}", other)),
        }
    }
}

/// Status and decision stamp shared by both request kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestLifecycle {
    pub status: RequestStatus,
    pub created_at: Timestamp,
    /// Moves only when the status moves.
    pub updated_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reject_reason: Option<String>,
}

impl RequestLifecycle {
    /// Fresh Pending lifecycle stamped at `now`.
    pub fn pending(now: Timestamp) -> Self {
        Self {
            status: RequestStatus::Pending,
            created_at: now,
            updated_at: now,
            processed_by: None,
            processed_at: None,
            reject_reason: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }

    /// Transition Pending → Approved.
    pub fn approve(&mut self, processed_by: &str, now: Timestamp) -> Result<(), TransitionError> {
        self.close(RequestStatus::Approved, processed_by, None, now)
    }

    /// Transition Pending → Rejected, keeping the reason if one is given.
    pub fn reject(
        &mut self,
        processed_by: &str,
        reason: Option<String>,
        now: Timestamp,
    ) -> Result<(), TransitionError> {
        let reason = reason.filter(|r| !r.trim().is_empty());
        self.close(RequestStatus::Rejected, processed_by, reason, now)
    }

    fn close(
        &mut self,
        to: RequestStatus,
        processed_by: &str,
        reject_reason: Option<String>,
        now: Timestamp,
    ) -> Result<(), TransitionError> {
        if self.status.is_terminal() {
            return Err(TransitionError::NotPending {
                status: self.status,
                attempted: to,
            });
        }

        self.status = to;
        self.processed_by = Some(operator_or_default(processed_by));
        self.processed_at = Some(now);
        self.reject_reason = reject_reason;
        self.updated_at = now;
        Ok(())
    }
}

fn operator_or_default(processed_by: &str) -> String {
    let trimmed = processed_by.trim();
    if trimmed.is_empty() {
        DEFAULT_OPERATOR.to_string()
    } else {
        trimmed.to_string()
    }
}

/// A request to create a new provisioned account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRequest {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    pub public_key: String,
    #[serde(flatten)]
    pub lifecycle: RequestLifecycle,
}

impl RegistrationRequest {
    /// Build a Pending registration stamped at `now`.
    pub fn new_pending(
        id: String,
        username: String,
        email: String,
        team: Option<String>,
        public_key: String,
        now: Timestamp,
    ) -> Self {
        Self {
            id,
            username,
            email,
            team: team.filter(|t| !t.trim().is_empty()),
            public_key,
            lifecycle: RequestLifecycle::pending(now),
        }
    }

    pub fn status(&self) -> RequestStatus {
        self.lifecycle.status
    }
}

/// A request to replace the SSH public key of an existing account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyChangeRequest {
    pub id: String,
    pub username: String,
    pub email: String,
    pub new_public_key: String,
    /// Why the key is changing (lost, rotation, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(flatten)]
    pub lifecycle: RequestLifecycle,
}

impl KeyChangeRequest {
    /// Build a Pending key change stamped at `now`.
    pub fn new_pending(
        id: String,
        username: String,
        email: String,
        new_public_key: String,
        reason: Option<String>,
        now: Timestamp,
    ) -> Self {
        Self {
            id,
            username,
            email,
            new_public_key,
            reason: reason.filter(|r| !r.trim().is_empty()),
            lifecycle: RequestLifecycle::pending(now),
        }
    }

    pub fn status(&self) -> RequestStatus {
        self.lifecycle.status
    }
}
