//! # Inbound Ports (Driving Ports)
//!
//! The ledger API consumed by the lifecycle coordinator.

use crate::domain::errors::LedgerError;
use crate::domain::record::LedgerRecord;
use shared_types::RequestStatus;

/// Uniqueness-enforcing CRUD over one kind of request.
///
/// All methods take `&self`; implementations synchronize internally so a
/// ledger can be shared behind an `Arc`.
pub trait LedgerApi<R: LedgerRecord>: Send + Sync {
    /// Persist a new record.
    ///
    /// # Errors
    ///
    /// - `Conflict` if a Pending record exists for the subject, for the email
    ///   on email-unique ledgers, or if the id is already stored
    /// - `Storage` if the write fails
    fn create(&self, record: R) -> Result<(), LedgerError>;

    /// Fetch a record by id.
    fn get(&self, id: &str) -> Result<R, LedgerError>;

    /// Fetch by subject according to the ledger's `SubjectLookup`.
    fn get_by_subject(&self, subject: &str) -> Result<R, LedgerError>;

    /// The Pending record for the subject, else its newest closed record.
    ///
    /// Independent of the ledger's `SubjectLookup`; used to decide requests
    /// so a repeated decision sees the closed record instead of nothing.
    fn find_latest_by_subject(&self, subject: &str) -> Result<R, LedgerError>;

    /// Snapshot of all records, newest-created first, optionally filtered.
    fn list(&self, status: Option<RequestStatus>) -> Result<Vec<R>, LedgerError>;

    /// Replace a stored record wholesale.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no record has this id
    /// - `DecisionImmutable` if the stored record is closed and the update
    ///   changes its decision
    fn update(&self, record: &R) -> Result<(), LedgerError>;

    /// Remove a record.
    fn delete(&self, id: &str) -> Result<(), LedgerError>;

    /// Whether a Pending record exists for the subject.
    fn exists_subject(&self, subject: &str) -> Result<bool, LedgerError>;

    /// Whether a Pending record exists for the email.
    fn exists_email(&self, email: &str) -> Result<bool, LedgerError>;
}
