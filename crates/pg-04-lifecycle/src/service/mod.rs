//! # Lifecycle Coordinator
//!
//! Runs submissions and decisions for both request kinds against their
//! ledgers and the provisioner.
//!
//! ## Decision Sequence
//!
//! ```text
//! lock kind ─→ resolve subject ─→ still Pending? ─→ provisioner call ─→ stamp ─→ write
//!                   │                  │                   │
//!                NotFound         InvalidState      error: record untouched
//! ```
//!
//! The record is written only after the provisioner call succeeds. Each
//! kind has its own decision lock, so one request is never handed to the
//! provisioner twice by this process.

mod key_change;
mod registration;
#[cfg(test)]
mod tests;

use crate::domain::errors::LifecycleError;
use crate::ports::outbound::{SystemTimeSource, TimeSource};
use parking_lot::Mutex;
use pg_02_ledger::{FileLedger, LedgerApi, LedgerRecord};
use pg_03_provisioner::Provisioner;
use shared_types::{KeyChangeRequest, RegistrationRequest, TransitionError};
use std::sync::Arc;

/// Coordinator over file-backed ledgers and a provisioner picked at runtime.
pub type FileCoordinator = LifecycleCoordinator<
    dyn Provisioner,
    FileLedger<RegistrationRequest>,
    FileLedger<KeyChangeRequest>,
>;

pub struct LifecycleCoordinator<P, RL, KL>
where
    P: Provisioner + ?Sized,
    RL: LedgerApi<RegistrationRequest>,
    KL: LedgerApi<KeyChangeRequest>,
{
    registrations: Arc<RL>,
    key_changes: Arc<KL>,
    provisioner: Arc<P>,
    clock: Arc<dyn TimeSource>,
    /// Registration email domains accepted; empty accepts all.
    allowed_domains: Vec<String>,
    registration_decisions: Mutex<()>,
    key_change_decisions: Mutex<()>,
}

impl<P, RL, KL> LifecycleCoordinator<P, RL, KL>
where
    P: Provisioner + ?Sized,
    RL: LedgerApi<RegistrationRequest>,
    KL: LedgerApi<KeyChangeRequest>,
{
    pub fn new(registrations: Arc<RL>, key_changes: Arc<KL>, provisioner: Arc<P>) -> Self {
        Self {
            registrations,
            key_changes,
            provisioner,
            clock: Arc::new(SystemTimeSource),
            allowed_domains: Vec::new(),
            registration_decisions: Mutex::new(()),
            key_change_decisions: Mutex::new(()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn TimeSource>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_allowed_domains(mut self, domains: Vec<String>) -> Self {
        self.allowed_domains = domains;
        self
    }

    pub fn provisioner(&self) -> &Arc<P> {
        &self.provisioner
    }

    pub fn allowed_domains(&self) -> &[String] {
        &self.allowed_domains
    }
}

/// Resolve the subject's latest request and apply a decision to it.
///
/// `apply` runs only on a Pending record and must leave it closed; the
/// record is persisted only if `apply` succeeds.
pub(crate) fn decide<R, L, F>(
    ledger: &L,
    gate: &Mutex<()>,
    kind: &'static str,
    subject: &str,
    apply: F,
) -> Result<R, LifecycleError>
where
    R: LedgerRecord,
    L: LedgerApi<R> + ?Sized,
    F: FnOnce(&mut R) -> Result<(), LifecycleError>,
{
    let _decision = gate.lock();

    let mut record = ledger.find_latest_by_subject(subject)?;
    if !record.is_pending() {
        return Err(invalid_state(kind, &record));
    }

    apply(&mut record)?;
    ledger.update(&record)?;
    Ok(record)
}

pub(crate) fn invalid_state<R: LedgerRecord>(kind: &'static str, record: &R) -> LifecycleError {
    LifecycleError::InvalidState {
        kind,
        id: record.id().to_string(),
        status: record.status(),
    }
}

pub(crate) fn transition_error(kind: &'static str, id: &str, err: TransitionError) -> LifecycleError {
    match err {
        TransitionError::NotPending { status, .. } => LifecycleError::InvalidState {
            kind,
            id: id.to_string(),
            status,
        },
    }
}
