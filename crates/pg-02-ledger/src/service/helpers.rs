//! # Ledger Helpers
//!
//! Serialization, scanning and lookup primitives. Every function here
//! expects the caller to already hold the lock in the right mode.

use super::*;
use crate::domain::errors::ConflictField;
use crate::domain::keys::is_valid_record_key;
use crate::domain::policy::SubjectLookup;
use crate::domain::record::newest_first;

impl<R, B> LedgerStore<R, B>
where
    R: LedgerRecord,
    B: RecordBackend,
{
    pub(crate) fn not_found(&self, key: &str) -> LedgerError {
        LedgerError::NotFound {
            ledger: self.policy.name,
            key: key.to_string(),
        }
    }

    pub(crate) fn conflict(&self, field: ConflictField, value: &str) -> LedgerError {
        LedgerError::Conflict {
            ledger: self.policy.name,
            field,
            value: value.to_string(),
        }
    }

    pub(crate) fn storage_error(&self, err: impl std::fmt::Display) -> LedgerError {
        LedgerError::Storage {
            ledger: self.policy.name,
            message: err.to_string(),
        }
    }

    pub(crate) fn encode(&self, record: &R) -> Result<Vec<u8>, LedgerError> {
        serde_json::to_vec_pretty(record)
            .map_err(|e| self.storage_error(format!("failed to serialize {}: {}", record.id(), e)))
    }

    /// Load one record. `Ok(None)` when absent or when the id cannot be a key.
    pub(crate) fn load(&self, backend: &B, id: &str) -> Result<Option<R>, LedgerError> {
        if !is_valid_record_key(id) {
            return Ok(None);
        }

        let Some(bytes) = backend.read(id).map_err(|e| self.storage_error(e))? else {
            return Ok(None);
        };

        let record: R = serde_json::from_slice(&bytes)
            .map_err(|e| self.storage_error(format!("failed to parse {}: {}", id, e)))?;

        if record.id() != id {
            return Err(self.storage_error(format!(
                "record stored under {} carries id {}",
                id,
                record.id()
            )));
        }

        Ok(Some(record))
    }

    /// Load every readable record, newest-created first.
    ///
    /// A record that fails to read or parse is logged and skipped; only a
    /// failure to enumerate the collection is an error.
    pub(crate) fn scan(&self, backend: &B) -> Result<Vec<R>, LedgerError> {
        let keys = backend.keys().map_err(|e| self.storage_error(e))?;

        let mut records = Vec::with_capacity(keys.len());
        for key in keys {
            match self.load(backend, &key) {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!("[pg-02] skipping {} record {}: {}", self.policy.name, key, e);
                }
            }
        }

        records.sort_by(newest_first);
        tracing::debug!(
            "[pg-02] scanned {} {} records",
            records.len(),
            self.policy.name
        );
        Ok(records)
    }

    pub(crate) fn pending_subject_exists(&self, backend: &B, subject: &str) -> Result<bool, LedgerError> {
        Ok(self
            .scan(backend)?
            .iter()
            .any(|r| r.is_pending() && r.subject() == subject))
    }

    pub(crate) fn pending_email_exists(&self, backend: &B, email: &str) -> Result<bool, LedgerError> {
        Ok(self
            .scan(backend)?
            .iter()
            .any(|r| r.is_pending() && r.contact_email() == email))
    }

    /// Resolve a subject under the given lookup rule.
    pub(crate) fn resolve_subject(
        &self,
        backend: &B,
        subject: &str,
        lookup: SubjectLookup,
    ) -> Result<R, LedgerError> {
        let mut newest_closed = None;
        for record in self.scan(backend)?.into_iter().filter(|r| r.subject() == subject) {
            if record.is_pending() {
                return Ok(record);
            }
            if newest_closed.is_none() {
                newest_closed = Some(record);
            }
        }

        match lookup {
            SubjectLookup::AnyStatus => newest_closed.ok_or_else(|| self.not_found(subject)),
            SubjectLookup::PendingOnly => Err(self.not_found(subject)),
        }
    }
}
