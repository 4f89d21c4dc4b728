//! Key-change requests.

use super::{decide, transition_error, LifecycleCoordinator};
use crate::domain::errors::LifecycleError;
use crate::ports::inbound::KeyChangeApi;
use pg_01_validation::validate_key_change;
use pg_02_ledger::{ConflictField, LedgerApi, LedgerError};
use pg_03_provisioner::Provisioner;
use shared_types::{
    new_key_change_id, ApproveInput, KeyChangeInput, KeyChangeRequest, RegistrationRequest,
    RejectInput, RequestStatus,
};

const KIND: &str = "key change";

impl<P, RL, KL> LifecycleCoordinator<P, RL, KL>
where
    P: Provisioner + ?Sized,
    RL: LedgerApi<RegistrationRequest>,
    KL: LedgerApi<KeyChangeRequest>,
{
    /// The submitted email must match the one on record, when there is one.
    fn verify_contact_email(&self, username: &str, email: &str) -> Result<(), LifecycleError> {
        match self.provisioner.contact_email(username) {
            Ok(Some(registered)) if registered.eq_ignore_ascii_case(email) => Ok(()),
            Ok(Some(_)) => Err(LifecycleError::email_mismatch(username, email)),
            Ok(None) => {
                tracing::warn!(
                    "[pg-04] no email on record for {}, key change accepted unverified",
                    username
                );
                Ok(())
            }
            Err(e) => {
                tracing::warn!(
                    "[pg-04] could not read email on record for {} ({}), key change accepted unverified",
                    username,
                    e
                );
                Ok(())
            }
        }
    }
}

impl<P, RL, KL> KeyChangeApi for LifecycleCoordinator<P, RL, KL>
where
    P: Provisioner + ?Sized,
    RL: LedgerApi<RegistrationRequest>,
    KL: LedgerApi<KeyChangeRequest>,
{
    fn submit_key_change(&self, input: &KeyChangeInput) -> Result<KeyChangeRequest, LifecycleError> {
        let valid = validate_key_change(input)?;

        if !self.provisioner.subject_exists(&valid.username)? {
            return Err(LifecycleError::NotFound {
                what: "user",
                key: valid.username,
            });
        }
        self.verify_contact_email(&valid.username, &valid.email)?;

        if self.key_changes.exists_subject(&valid.username)? {
            return Err(LedgerError::Conflict {
                ledger: KIND,
                field: ConflictField::Subject,
                value: valid.username,
            }
            .into());
        }

        let request = KeyChangeRequest::new_pending(
            new_key_change_id(),
            valid.username,
            valid.email,
            valid.new_public_key,
            valid.reason,
            self.clock.now(),
        );
        self.key_changes.create(request.clone())?;

        tracing::info!(
            "[pg-04] key change {} submitted for {}",
            request.id,
            request.username
        );
        Ok(request)
    }

    fn approve_key_change(
        &self,
        username: &str,
        input: &ApproveInput,
    ) -> Result<KeyChangeRequest, LifecycleError> {
        let approved = decide(
            self.key_changes.as_ref(),
            &self.key_change_decisions,
            KIND,
            username,
            |request: &mut KeyChangeRequest| {
                if let Err(e) = self
                    .provisioner
                    .update_credential(&request.username, &request.new_public_key)
                {
                    tracing::error!(
                        "[pg-04] key rotation for {} failed, request {} stays pending: {}",
                        request.username,
                        request.id,
                        e
                    );
                    return Err(e.into());
                }

                request
                    .lifecycle
                    .approve(&input.processed_by, self.clock.now())
                    .map_err(|e| transition_error(KIND, &request.id, e))
            },
        )?;

        tracing::info!(
            "[pg-04] key change {} for {} approved by {}",
            approved.id,
            approved.username,
            approved.lifecycle.processed_by.as_deref().unwrap_or_default()
        );
        Ok(approved)
    }

    fn reject_key_change(
        &self,
        username: &str,
        input: &RejectInput,
    ) -> Result<KeyChangeRequest, LifecycleError> {
        let rejected = decide(
            self.key_changes.as_ref(),
            &self.key_change_decisions,
            KIND,
            username,
            |request: &mut KeyChangeRequest| {
                request
                    .lifecycle
                    .reject(&input.processed_by, input.reason.clone(), self.clock.now())
                    .map_err(|e| transition_error(KIND, &request.id, e))
            },
        )?;

        tracing::info!(
            "[pg-04] key change {} for {} rejected by {}",
            rejected.id,
            rejected.username,
            rejected.lifecycle.processed_by.as_deref().unwrap_or_default()
        );
        Ok(rejected)
    }

    fn get_key_change(&self, id: &str) -> Result<KeyChangeRequest, LifecycleError> {
        Ok(self.key_changes.get(id)?)
    }

    fn key_change_for(&self, username: &str) -> Result<KeyChangeRequest, LifecycleError> {
        Ok(self.key_changes.get_by_subject(username)?)
    }

    fn list_key_changes(
        &self,
        status: Option<RequestStatus>,
    ) -> Result<Vec<KeyChangeRequest>, LifecycleError> {
        Ok(self.key_changes.list(status)?)
    }

    fn key_change_pending_for(&self, username: &str) -> Result<bool, LifecycleError> {
        Ok(self.key_changes.exists_subject(username)?)
    }
}
