//! # Error Types
//!
//! Errors raised by the shared entities themselves.

use crate::entities::RequestStatus;
use thiserror::Error;

/// A status change refused by `RequestLifecycle`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// Only Pending requests can be decided.
    #[error("Request is {status}, cannot move to {attempted}")]
    NotPending {
        status: RequestStatus,
        attempted: RequestStatus,
    },
}
