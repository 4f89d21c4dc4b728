//! Registration requests.

use super::{decide, transition_error, LifecycleCoordinator};
use crate::domain::errors::LifecycleError;
use crate::ports::inbound::RegistrationApi;
use pg_01_validation::validate_registration;
use pg_02_ledger::{ConflictField, LedgerApi, LedgerError};
use pg_03_provisioner::Provisioner;
use shared_types::{
    new_registration_id, ApproveInput, KeyChangeRequest, RegisterInput, RegistrationRequest,
    RejectInput, RequestStatus,
};

const KIND: &str = "registration";

impl<P, RL, KL> RegistrationApi for LifecycleCoordinator<P, RL, KL>
where
    P: Provisioner + ?Sized,
    RL: LedgerApi<RegistrationRequest>,
    KL: LedgerApi<KeyChangeRequest>,
{
    fn submit_registration(
        &self,
        input: &RegisterInput,
    ) -> Result<RegistrationRequest, LifecycleError> {
        let valid = validate_registration(input, &self.allowed_domains)?;

        if self.registrations.exists_subject(&valid.username)? {
            return Err(LedgerError::Conflict {
                ledger: KIND,
                field: ConflictField::Subject,
                value: valid.username,
            }
            .into());
        }
        if self.registrations.exists_email(&valid.email)? {
            return Err(LedgerError::Conflict {
                ledger: KIND,
                field: ConflictField::Email,
                value: valid.email,
            }
            .into());
        }
        if self.provisioner.subject_exists(&valid.username)? {
            return Err(LifecycleError::already_provisioned(&valid.username));
        }

        let request = RegistrationRequest::new_pending(
            new_registration_id(),
            valid.username,
            valid.email,
            valid.team,
            valid.public_key,
            self.clock.now(),
        );

        // The ledger re-checks uniqueness atomically with the write
        self.registrations.create(request.clone())?;

        tracing::info!(
            "[pg-04] registration {} submitted for {}",
            request.id,
            request.username
        );
        Ok(request)
    }

    fn approve_registration(
        &self,
        username: &str,
        input: &ApproveInput,
    ) -> Result<RegistrationRequest, LifecycleError> {
        let approved = decide(
            self.registrations.as_ref(),
            &self.registration_decisions,
            KIND,
            username,
            |request: &mut RegistrationRequest| {
                // Provisioned out of band since submission
                if self.provisioner.subject_exists(&request.username)? {
                    return Err(LifecycleError::already_provisioned(&request.username));
                }

                if let Err(e) = self.provisioner.create_subject(request) {
                    tracing::error!(
                        "[pg-04] provisioning {} failed, request {} stays pending: {}",
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
        )
        .inspect_err(|e| {
            if matches!(e, LifecycleError::Storage(_)) {
                tracing::error!(
                    "[pg-04] {} may be provisioned but its approval was not recorded: {}",
                    username,
                    e
                );
            }
        })?;

        tracing::info!(
            "[pg-04] registration {} for {} approved by {}",
            approved.id,
            approved.username,
            approved.lifecycle.processed_by.as_deref().unwrap_or_default()
        );
        Ok(approved)
    }

    fn reject_registration(
        &self,
        username: &str,
        input: &RejectInput,
    ) -> Result<RegistrationRequest, LifecycleError> {
        let rejected = decide(
            self.registrations.as_ref(),
            &self.registration_decisions,
            KIND,
            username,
            |request: &mut RegistrationRequest| {
                request
                    .lifecycle
                    .reject(&input.processed_by, input.reason.clone(), self.clock.now())
                    .map_err(|e| transition_error(KIND, &request.id, e))
            },
        )?;

        tracing::info!(
            "[pg-04] registration {} for {} rejected by {}",
            rejected.id,
            rejected.username,
            rejected.lifecycle.processed_by.as_deref().unwrap_or_default()
        );
        Ok(rejected)
    }

    fn get_registration(&self, id: &str) -> Result<RegistrationRequest, LifecycleError> {
        Ok(self.registrations.get(id)?)
    }

    fn registration_for(&self, username: &str) -> Result<RegistrationRequest, LifecycleError> {
        Ok(self.registrations.get_by_subject(username)?)
    }

    fn list_registrations(
        &self,
        status: Option<RequestStatus>,
    ) -> Result<Vec<RegistrationRequest>, LifecycleError> {
        Ok(self.registrations.list(status)?)
    }

    fn registration_pending_for(&self, username: &str) -> Result<bool, LifecycleError> {
        Ok(self.registrations.exists_subject(username)?)
    }

    fn registration_pending_for_email(&self, email: &str) -> Result<bool, LifecycleError> {
        Ok(self.registrations.exists_email(email)?)
    }
}
