//! # Ledger Records
//!
//! The contract a request type must satisfy to live in a ledger, and its
//! implementations for the two request kinds.

use serde::de::DeserializeOwned;
use serde::Serialize;
use shared_types::{KeyChangeRequest, RegistrationRequest, RequestStatus, Timestamp};
use std::cmp::Ordering;

/// A self-contained, serializable request record.
pub trait LedgerRecord: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// Storage key. Immutable once created.
    fn id(&self) -> &str;

    /// The username the request concerns.
    fn subject(&self) -> &str;

    fn contact_email(&self) -> &str;

    fn status(&self) -> RequestStatus;

    fn created_at(&self) -> Timestamp;

    /// Who decided the request, if anyone.
    fn processed_by(&self) -> Option<&str>;

    fn processed_at(&self) -> Option<Timestamp>;

    fn is_pending(&self) -> bool {
        self.status() == RequestStatus::Pending
    }
}

impl LedgerRecord for RegistrationRequest {
    fn id(&self) -> &str {
        &self.id
    }

    fn subject(&self) -> &str {
        &self.username
    }

    fn contact_email(&self) -> &str {
        &self.email
    }

    fn status(&self) -> RequestStatus {
        self.lifecycle.status
    }

    fn created_at(&self) -> Timestamp {
        self.lifecycle.created_at
    }

    fn processed_by(&self) -> Option<&str> {
        self.lifecycle.processed_by.as_deref()
    }

    fn processed_at(&self) -> Option<Timestamp> {
        self.lifecycle.processed_at
    }
}

impl LedgerRecord for KeyChangeRequest {
    fn id(&self) -> &str {
        &self.id
    }

    fn subject(&self) -> &str {
        &self.username
    }

    fn contact_email(&self) -> &str {
        &self.email
    }

    fn status(&self) -> RequestStatus {
        self.lifecycle.status
    }

    fn created_at(&self) -> Timestamp {
        self.lifecycle.created_at
    }

    fn processed_by(&self) -> Option<&str> {
        self.lifecycle.processed_by.as_deref()
    }

    fn processed_at(&self) -> Option<Timestamp> {
        self.lifecycle.processed_at
    }
}

/// Newest-created first; equal timestamps fall back to id, descending.
pub fn newest_first<R: LedgerRecord>(a: &R, b: &R) -> Ordering {
    b.created_at()
        .cmp(&a.created_at())
        .then_with(|| b.id().cmp(a.id()))
}

/// Whether `updated` keeps the decision already recorded on `stored`.
///
/// A Pending record may change freely; a decided one may only be rewritten
/// with the same status and decision stamp.
pub fn preserves_decision<R: LedgerRecord>(stored: &R, updated: &R) -> bool {
    stored.is_pending()
        || (stored.status() == updated.status()
            && stored.processed_by() == updated.processed_by()
            && stored.processed_at() == updated.processed_at())
}
