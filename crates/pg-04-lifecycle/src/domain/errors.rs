//! # Lifecycle Errors
//!
//! One error type for every coordinator operation. Lower-layer errors are
//! folded into it so callers match on a single taxonomy.

use pg_01_validation::ValidationErrors;
use pg_02_ledger::LedgerError;
use pg_03_provisioner::ProvisionerError;
use shared_types::RequestStatus;
use std::fmt;
use thiserror::Error;

/// Machine-checkable error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Conflict,
    NotFound,
    InvalidState,
    Storage,
    Provisioner,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Conflict => "conflict",
            ErrorKind::NotFound => "not_found",
            ErrorKind::InvalidState => "invalid_state",
            ErrorKind::Storage => "storage",
            ErrorKind::Provisioner => "provisioner",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum LifecycleError {
    /// One or more submission rules failed; all of them are listed.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// Uniqueness clash, or the subject's external state forbids the
    /// operation.
    #[error("{message}")]
    Conflict {
        field: &'static str,
        value: String,
        message: String,
    },

    #[error("{what} not found: {key}")]
    NotFound { what: &'static str, key: String },

    /// Decision attempted on a request that is no longer Pending.
    #[error("{kind} request {id} is already {status}")]
    InvalidState {
        kind: &'static str,
        id: String,
        status: RequestStatus,
    },

    #[error("storage error: {0}")]
    Storage(String),

    /// Passed through as the backend reported it.
    #[error(transparent)]
    Provisioner(#[from] ProvisionerError),
}

impl LifecycleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LifecycleError::Validation(_) => ErrorKind::Validation,
            LifecycleError::Conflict { .. } => ErrorKind::Conflict,
            LifecycleError::NotFound { .. } => ErrorKind::NotFound,
            LifecycleError::InvalidState { .. } => ErrorKind::InvalidState,
            LifecycleError::Storage(_) => ErrorKind::Storage,
            LifecycleError::Provisioner(_) => ErrorKind::Provisioner,
        }
    }

    /// Human-readable messages; one per violation for validation failures.
    pub fn messages(&self) -> Vec<String> {
        match self {
            LifecycleError::Validation(errors) => errors.messages(),
            other => vec![other.to_string()],
        }
    }

    pub(crate) fn already_provisioned(username: &str) -> Self {
        LifecycleError::Conflict {
            field: "username",
            value: username.to_string(),
            message: format!("user '{}' is already provisioned", username),
        }
    }

    pub(crate) fn email_mismatch(username: &str, email: &str) -> Self {
        LifecycleError::Conflict {
            field: "email",
            value: email.to_string(),
            message: format!("email does not match the registered email for '{}'", username),
        }
    }
}

impl From<LedgerError> for LifecycleError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Conflict { field, ref value, .. } => LifecycleError::Conflict {
                field: field.as_str(),
                value: value.clone(),
                message: err.to_string(),
            },
            LedgerError::NotFound { ledger, key } => LifecycleError::NotFound { what: ledger, key },
            LedgerError::DecisionImmutable { ledger, id, status } => LifecycleError::InvalidState {
                kind: ledger,
                id,
                status,
            },
            LedgerError::Storage { .. } => LifecycleError::Storage(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pg_01_validation::Violation;
    use pg_02_ledger::ConflictField;

    #[test]
    fn test_ledger_errors_map_onto_taxonomy() {
        let err: LifecycleError = LedgerError::Conflict {
            ledger: "registration",
            field: ConflictField::Subject,
            value: "alice".into(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(matches!(err, LifecycleError::Conflict { field: "username", .. }));

        let err: LifecycleError = LedgerError::NotFound {
            ledger: "key change",
            key: "bob".into(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "key change not found: bob");

        let err: LifecycleError = LedgerError::DecisionImmutable {
            ledger: "registration",
            id: "req-1".into(),
            status: RequestStatus::Approved,
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn test_validation_messages_listed_individually() {
        let violations = ValidationErrors::check(vec![
            Violation::Missing { field: "username" },
            Violation::InvalidEmail,
        ])
        .unwrap_err();
        let err = LifecycleError::from(violations);

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(
            err.messages(),
            vec!["username is required", "invalid email format"]
        );
    }

    #[test]
    fn test_provisioner_message_passes_through() {
        let err = LifecycleError::from(ProvisionerError::CommandFailed {
            action: "create user",
            detail: "exit status: 2".into(),
            stdout: String::new(),
            stderr: "useradd: group missing".into(),
        });
        assert_eq!(err.kind(), ErrorKind::Provisioner);
        assert_eq!(err.to_string(), "failed to create user: exit status: 2");
    }
}
