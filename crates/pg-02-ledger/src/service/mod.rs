//! # Ledger Service
//!
//! `LedgerStore` implements `LedgerApi` over any `RecordBackend`.
//!
//! ## Architecture
//!
//! This service:
//! 1. Serializes records to JSON and hands them to the backend
//! 2. Enforces the uniqueness invariants atomically with the write
//! 3. Scans the whole collection for list, probe and subject lookups
//! 4. Skips (and logs) records it cannot read during scans

mod helpers;
mod ledger;

use crate::adapters::storage::{FileRecordBackend, InMemoryRecordBackend};
use crate::domain::errors::LedgerError;
use crate::domain::policy::LedgerPolicy;
use crate::domain::record::LedgerRecord;
use crate::ports::outbound::RecordBackend;
use parking_lot::RwLock;
use shared_types::{KeyChangeRequest, RegistrationRequest};
use std::marker::PhantomData;
use std::path::Path;

/// Sub-directory of the data directory holding key-change records.
pub const KEY_CHANGE_SUBDIR: &str = "key-changes";

/// A ledger persisted as one JSON file per record.
pub type FileLedger<R> = LedgerStore<R, FileRecordBackend>;

/// A ledger that lives only in memory.
pub type MemoryLedger<R> = LedgerStore<R, InMemoryRecordBackend>;

/// The request ledger.
///
/// Owns its backend exclusively. One coarse `RwLock` guards every
/// operation: mutations take it for writing, reads for reading.
pub struct LedgerStore<R, B>
where
    R: LedgerRecord,
    B: RecordBackend,
{
    /// Record persistence, behind the single-writer lock.
    pub(crate) backend: RwLock<B>,
    pub(crate) policy: LedgerPolicy,
    _record: PhantomData<fn() -> R>,
}

impl<R, B> LedgerStore<R, B>
where
    R: LedgerRecord,
    B: RecordBackend,
{
    /// Create a ledger over an already opened backend.
    pub fn new(backend: B, policy: LedgerPolicy) -> Self {
        Self {
            backend: RwLock::new(backend),
            policy,
            _record: PhantomData,
        }
    }

    pub fn policy(&self) -> LedgerPolicy {
        self.policy
    }

    /// Consume the ledger and return its backend.
    pub fn into_backend(self) -> B {
        self.backend.into_inner()
    }
}

impl<R: LedgerRecord> LedgerStore<R, InMemoryRecordBackend> {
    /// Empty in-memory ledger.
    pub fn in_memory(policy: LedgerPolicy) -> Self {
        Self::new(InMemoryRecordBackend::new(), policy)
    }
}

impl<R: LedgerRecord> LedgerStore<R, FileRecordBackend> {
    /// Open a file-backed ledger rooted at `dir`, creating it if needed.
    pub fn open<P: AsRef<Path>>(dir: P, policy: LedgerPolicy) -> Result<Self, LedgerError> {
        let backend = FileRecordBackend::open(dir).map_err(|e| LedgerError::Storage {
            ledger: policy.name,
            message: e.to_string(),
        })?;
        Ok(Self::new(backend, policy))
    }
}

/// Open the registration ledger stored directly in `data_dir`.
pub fn open_registration_ledger(
    data_dir: &Path,
) -> Result<FileLedger<RegistrationRequest>, LedgerError> {
    LedgerStore::open(data_dir, LedgerPolicy::registration())
}

/// Open the key-change ledger stored in `data_dir/key-changes`.
pub fn open_key_change_ledger(
    data_dir: &Path,
) -> Result<FileLedger<KeyChangeRequest>, LedgerError> {
    LedgerStore::open(data_dir.join(KEY_CHANGE_SUBDIR), LedgerPolicy::key_change())
}
