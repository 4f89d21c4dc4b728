//! # Request Ledger (pg-02)
//!
//! The ledger is the authoritative store for one kind of request. It is
//! instantiated twice, once for registrations and once for key changes,
//! with the same contract and a per-kind `LedgerPolicy`.
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Enforcement |
//! |----|-----------|-------------|
//! | 1 | One Pending record per subject | `create` re-checks under the write lock |
//! | 2 | One Pending record per email (registrations) | `create` re-checks under the write lock |
//! | 3 | Id addresses exactly one record | `create` refuses a stored id |
//! | 4 | Terminal records keep their decision | `update` refuses to rewrite a decision |
//! | 5 | No torn records | file backend writes temp + fsync + rename |
//! | 6 | One bad record never hides the others | scans skip unreadable records |
//!
//! ## Concurrency
//!
//! Each `LedgerStore` owns one `parking_lot::RwLock` around its backend.
//! Mutations hold it exclusively across their whole check-then-write
//! sequence; reads share it. Nothing here coordinates between processes:
//! exactly one process may own a ledger directory.
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - record contract, policies, errors, key rules
//! - `ports/` - `LedgerApi` (inbound) and `RecordBackend` (outbound)
//! - `adapters/` - file and in-memory backends
//! - `service/` - `LedgerStore` implementing `LedgerApi`
//!
//! ## Usage
//!
//! ```ignore
//! use pg_02_ledger::{open_registration_ledger, LedgerApi};
//!
//! let ledger = open_registration_ledger(Path::new("/var/lib/gate/pending"))?;
//! ledger.create(request)?;
//! let pending = ledger.list(Some(RequestStatus::Pending))?;
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

#[cfg(test)]
mod test_utils;

pub use adapters::storage::{FileRecordBackend, InMemoryRecordBackend};
pub use domain::errors::{BackendError, ConflictField, LedgerError};
pub use domain::keys::is_valid_record_key;
pub use domain::policy::{LedgerPolicy, SubjectLookup};
pub use domain::record::LedgerRecord;
pub use ports::inbound::LedgerApi;
pub use ports::outbound::RecordBackend;
pub use service::{
    open_key_change_ledger, open_registration_ledger, FileLedger, LedgerStore, MemoryLedger,
    KEY_CHANGE_SUBDIR,
};
