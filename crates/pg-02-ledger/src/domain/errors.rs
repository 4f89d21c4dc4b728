//! # Domain Errors
//!
//! Error types for the ledger.
//!
//! ## Design Principles
//!
//! - Uniqueness violations name the colliding field and value
//! - Backend failures are reported as `Storage` with the backend's text
//! - No panics in ledger logic (use Result instead)

use shared_types::RequestStatus;
use std::fmt;
use thiserror::Error;

/// Field a `Conflict` collided on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictField {
    Id,
    Subject,
    Email,
}

impl ConflictField {
    pub fn as_str(self) -> &'static str {
        match self {
            ConflictField::Id => "id",
            ConflictField::Subject => "username",
            ConflictField::Email => "email",
        }
    }
}

impl fmt::Display for ConflictField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors surfaced by `LedgerApi`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// A uniqueness invariant would be violated.
    #[error("{}", conflict_message(ledger, *field, value))]
    Conflict {
        ledger: &'static str,
        field: ConflictField,
        value: String,
    },

    /// No record matches the id or subject.
    #[error("{ledger} request not found: {key}")]
    NotFound { ledger: &'static str, key: String },

    /// Attempt to rewrite the decision of a closed record.
    #[error("{ledger} request {id} is already {status}")]
    DecisionImmutable {
        ledger: &'static str,
        id: String,
        status: RequestStatus,
    },

    /// Reading or writing a record failed.
    #[error("{ledger} storage error: {message}")]
    Storage {
        ledger: &'static str,
        message: String,
    },
}

fn conflict_message(ledger: &str, field: ConflictField, value: &str) -> String {
    match field {
        ConflictField::Id => format!("{} request id '{}' already exists", ledger, value),
        _ => format!(
            "a {} request for {} '{}' is already pending",
            ledger, field, value
        ),
    }
}

/// Errors raised by a `RecordBackend`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The key is not a safe storage key.
    #[error("invalid record key: {key:?}")]
    InvalidKey { key: String },

    /// I/O failure on one record or on the collection.
    #[error("I/O error on {target}: {message}")]
    Io { target: String, message: String },
}

impl BackendError {
    pub(crate) fn io(target: impl Into<String>, err: std::io::Error) -> Self {
        BackendError::Io {
            target: target.into(),
            message: err.to_string(),
        }
    }
}
