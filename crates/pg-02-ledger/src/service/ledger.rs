//! # Ledger API Implementation
//!
//! Implements `LedgerApi` for `LedgerStore`.

use super::*;
use crate::domain::errors::{BackendError, ConflictField};
use crate::domain::keys::is_valid_record_key;
use crate::domain::policy::SubjectLookup;
use crate::domain::record::preserves_decision;
use crate::ports::inbound::LedgerApi;
use shared_types::RequestStatus;

impl<R, B> LedgerApi<R> for LedgerStore<R, B>
where
    R: LedgerRecord,
    B: RecordBackend,
{
    fn create(&self, record: R) -> Result<(), LedgerError> {
        let id = record.id();
        if !is_valid_record_key(id) {
            return Err(self.storage_error(BackendError::InvalidKey { key: id.to_string() }));
        }

        // Exclusive for the whole check-then-write sequence
        let mut backend = self.backend.write();

        if backend.contains(id).map_err(|e| self.storage_error(e))? {
            return Err(self.conflict(ConflictField::Id, id));
        }

        let existing = self.scan(&backend)?;
        let pending = || existing.iter().filter(|r| r.is_pending());

        if pending().any(|r| r.subject() == record.subject()) {
            return Err(self.conflict(ConflictField::Subject, record.subject()));
        }
        if self.policy.unique_email && pending().any(|r| r.contact_email() == record.contact_email())
        {
            return Err(self.conflict(ConflictField::Email, record.contact_email()));
        }

        let bytes = self.encode(&record)?;
        backend
            .write(id, &bytes)
            .map_err(|e| self.storage_error(e))?;

        tracing::info!(
            "[pg-02] created {} request {} for {}",
            self.policy.name,
            id,
            record.subject()
        );
        Ok(())
    }

    fn get(&self, id: &str) -> Result<R, LedgerError> {
        let backend = self.backend.read();
        self.load(&backend, id)?
            .ok_or_else(|| self.not_found(id))
    }

    fn get_by_subject(&self, subject: &str) -> Result<R, LedgerError> {
        let backend = self.backend.read();
        self.resolve_subject(&backend, subject, self.policy.subject_lookup)
    }

    fn find_latest_by_subject(&self, subject: &str) -> Result<R, LedgerError> {
        let backend = self.backend.read();
        self.resolve_subject(&backend, subject, SubjectLookup::AnyStatus)
    }

    fn list(&self, status: Option<RequestStatus>) -> Result<Vec<R>, LedgerError> {
        let backend = self.backend.read();
        let records = self.scan(&backend)?;

        Ok(match status {
            Some(status) => records.into_iter().filter(|r| r.status() == status).collect(),
            None => records,
        })
    }

    fn update(&self, record: &R) -> Result<(), LedgerError> {
        let id = record.id();
        let mut backend = self.backend.write();

        let stored = self
            .load(&backend, id)?
            .ok_or_else(|| self.not_found(id))?;

        if !preserves_decision(&stored, record) {
            return Err(LedgerError::DecisionImmutable {
                ledger: self.policy.name,
                id: id.to_string(),
                status: stored.status(),
            });
        }

        let bytes = self.encode(record)?;
        backend
            .write(id, &bytes)
            .map_err(|e| self.storage_error(e))?;

        if stored.status() != record.status() {
            tracing::info!(
                "[pg-02] {} request {} for {}: {} -> {}",
                self.policy.name,
                id,
                record.subject(),
                stored.status(),
                record.status()
            );
        }
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<(), LedgerError> {
        if !is_valid_record_key(id) {
            return Err(self.not_found(id));
        }

        let mut backend = self.backend.write();
        if backend.remove(id).map_err(|e| self.storage_error(e))? {
            tracing::info!("[pg-02] deleted {} request {}", self.policy.name, id);
            Ok(())
        } else {
            Err(self.not_found(id))
        }
    }

    fn exists_subject(&self, subject: &str) -> Result<bool, LedgerError> {
        let backend = self.backend.read();
        self.pending_subject_exists(&backend, subject)
    }

    fn exists_email(&self, email: &str) -> Result<bool, LedgerError> {
        let backend = self.backend.read();
        self.pending_email_exists(&backend, email)
    }
}
