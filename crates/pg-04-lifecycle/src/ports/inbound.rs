//! # Inbound Ports
//!
//! The request collection as seen by the outer layer. Decisions address a
//! request by its subject; reads also accept the request id.

use crate::domain::errors::LifecycleError;
use shared_types::{
    ApproveInput, KeyChangeInput, KeyChangeRequest, RegisterInput, RegistrationRequest,
    RejectInput, RequestStatus,
};

/// Registration requests: new accounts.
pub trait RegistrationApi: Send + Sync {
    /// Validate and record a new Pending registration.
    fn submit_registration(&self, input: &RegisterInput)
        -> Result<RegistrationRequest, LifecycleError>;

    /// Provision the account, then close the request as Approved.
    fn approve_registration(
        &self,
        username: &str,
        input: &ApproveInput,
    ) -> Result<RegistrationRequest, LifecycleError>;

    /// Close the request as Rejected. Nothing is provisioned.
    fn reject_registration(
        &self,
        username: &str,
        input: &RejectInput,
    ) -> Result<RegistrationRequest, LifecycleError>;

    fn get_registration(&self, id: &str) -> Result<RegistrationRequest, LifecycleError>;

    /// The Pending registration for `username`, else its newest one.
    fn registration_for(&self, username: &str) -> Result<RegistrationRequest, LifecycleError>;

    /// Newest first, optionally narrowed to one status.
    fn list_registrations(
        &self,
        status: Option<RequestStatus>,
    ) -> Result<Vec<RegistrationRequest>, LifecycleError>;

    /// Whether a Pending registration holds `username`.
    fn registration_pending_for(&self, username: &str) -> Result<bool, LifecycleError>;

    /// Whether a Pending registration holds `email`.
    fn registration_pending_for_email(&self, email: &str) -> Result<bool, LifecycleError>;
}

/// Key-change requests: SSH key rotation for existing accounts.
pub trait KeyChangeApi: Send + Sync {
    /// Validate and record a new Pending key change.
    fn submit_key_change(&self, input: &KeyChangeInput) -> Result<KeyChangeRequest, LifecycleError>;

    /// Install the new key, then close the request as Approved.
    fn approve_key_change(
        &self,
        username: &str,
        input: &ApproveInput,
    ) -> Result<KeyChangeRequest, LifecycleError>;

    fn reject_key_change(
        &self,
        username: &str,
        input: &RejectInput,
    ) -> Result<KeyChangeRequest, LifecycleError>;

    fn get_key_change(&self, id: &str) -> Result<KeyChangeRequest, LifecycleError>;

    /// The Pending key change for `username`. Closed ones are not returned.
    fn key_change_for(&self, username: &str) -> Result<KeyChangeRequest, LifecycleError>;

    fn list_key_changes(
        &self,
        status: Option<RequestStatus>,
    ) -> Result<Vec<KeyChangeRequest>, LifecycleError>;

    fn key_change_pending_for(&self, username: &str) -> Result<bool, LifecycleError>;
}
