//! # Validation Errors

use thiserror::Error;

/// One violated rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    /// Required field left empty.
    #[error("{field} is required")]
    Missing { field: &'static str },

    #[error("{field} must be 3-20 characters, lowercase letters, numbers, and hyphens only")]
    InvalidSubjectName { field: &'static str },

    #[error("invalid email format")]
    InvalidEmail,

    #[error("invalid SSH public key format")]
    InvalidPublicKey { field: &'static str },

    /// Domain outside the configured allowlist.
    #[error("email domain '{domain}' is not allowed, allowed domains: {allowed}")]
    EmailDomainNotAllowed { domain: String, allowed: String },
}

impl Violation {
    /// Name of the input field the violation is about.
    pub fn field(&self) -> &'static str {
        match self {
            Violation::Missing { field }
            | Violation::InvalidSubjectName { field }
            | Violation::InvalidPublicKey { field } => field,
            Violation::InvalidEmail | Violation::EmailDomainNotAllowed { .. } => "email",
        }
    }
}

/// Every rule a submission violated. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Validation failed: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
pub struct ValidationErrors(Vec<Violation>);

impl ValidationErrors {
    /// `Ok(())` when nothing was violated.
    pub fn check(violations: Vec<Violation>) -> Result<(), ValidationErrors> {
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(violations))
        }
    }

    pub fn violations(&self) -> &[Violation] {
        &self.0
    }

    /// Human-readable message per violation.
    pub fn messages(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
