//! # Outbound Ports (Driven Ports)
//!
//! Persistence required by the ledger.
//!
//! Production: `FileRecordBackend` (one JSON document per record)
//! Testing: `InMemoryRecordBackend`

use crate::domain::errors::BackendError;

/// Keyed persistence of serialized records, one unit per key.
pub trait RecordBackend: Send + Sync {
    /// Read a record's bytes. `Ok(None)` if the key is absent.
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError>;

    /// Create or replace a record.
    ///
    /// ## Atomicity Guarantee
    ///
    /// A reader sees either the previous bytes or the new bytes, never a
    /// mix of the two.
    fn write(&mut self, key: &str, bytes: &[u8]) -> Result<(), BackendError>;

    /// Remove a record. Returns whether it existed.
    fn remove(&mut self, key: &str) -> Result<bool, BackendError>;

    /// Every stored key, in no particular order.
    fn keys(&self) -> Result<Vec<String>, BackendError>;

    /// Check if a key exists.
    fn contains(&self, key: &str) -> Result<bool, BackendError> {
        Ok(self.read(key)?.is_some())
    }
}
