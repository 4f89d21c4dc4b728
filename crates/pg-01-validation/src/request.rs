//! # Submission Validation
//!
//! Applies the field rules to whole submissions and hands back the cleaned
//! values that get stored.

use crate::errors::{ValidationErrors, Violation};
use crate::rules::{is_valid_email, is_valid_public_key, is_valid_subject_name};
use crate::sanitize::sanitize_public_key;
use shared_types::{KeyChangeInput, RegisterInput};

/// A registration that passed every rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRegistration {
    pub username: String,
    pub email: String,
    pub team: Option<String>,
    /// Sanitized key material.
    pub public_key: String,
}

/// A key change that passed every rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidKeyChange {
    pub username: String,
    pub email: String,
    /// Sanitized key material.
    pub new_public_key: String,
    pub reason: Option<String>,
}

/// Validate a registration submission.
///
/// `allowed_domains` restricts the email domain; an empty slice allows all.
pub fn validate_registration(
    input: &RegisterInput,
    allowed_domains: &[String],
) -> Result<ValidRegistration, ValidationErrors> {
    let mut violations = Vec::new();

    check_subject(&input.username, "username", &mut violations);
    check_email(&input.email, allowed_domains, &mut violations);
    let public_key = check_key(&input.public_key, "public_key", &mut violations);

    ValidationErrors::check(violations)?;

    Ok(ValidRegistration {
        username: input.username.clone(),
        email: input.email.clone(),
        team: input
            .team
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string),
        public_key,
    })
}

/// Validate a key-change submission.
pub fn validate_key_change(input: &KeyChangeInput) -> Result<ValidKeyChange, ValidationErrors> {
    let mut violations = Vec::new();

    check_subject(&input.username, "username", &mut violations);
    check_email(&input.email, &[], &mut violations);
    let new_public_key = check_key(&input.new_public_key, "new_public_key", &mut violations);

    ValidationErrors::check(violations)?;

    Ok(ValidKeyChange {
        username: input.username.clone(),
        email: input.email.clone(),
        new_public_key,
        reason: input
            .reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string),
    })
}

/// Check the email domain against an allowlist, ignoring case.
pub fn validate_email_domain(email: &str, allowed_domains: &[String]) -> Result<(), Violation> {
    if allowed_domains.is_empty() {
        return Ok(());
    }

    let domain = match email.split_once('@') {
        Some((_, domain)) if !domain.contains('@') => domain.to_ascii_lowercase(),
        _ => return Err(Violation::InvalidEmail),
    };

    if allowed_domains
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(&domain))
    {
        Ok(())
    } else {
        Err(Violation::EmailDomainNotAllowed {
            domain,
            allowed: allowed_domains.join(", "),
        })
    }
}

fn check_subject(name: &str, field: &'static str, violations: &mut Vec<Violation>) {
    if name.is_empty() {
        violations.push(Violation::Missing { field });
    } else if !is_valid_subject_name(name) {
        violations.push(Violation::InvalidSubjectName { field });
    }
}

fn check_email(email: &str, allowed_domains: &[String], violations: &mut Vec<Violation>) {
    if email.is_empty() {
        violations.push(Violation::Missing { field: "email" });
    } else if !is_valid_email(email) {
        violations.push(Violation::InvalidEmail);
    } else if let Err(violation) = validate_email_domain(email, allowed_domains) {
        violations.push(violation);
    }
}

fn check_key(raw: &str, field: &'static str, violations: &mut Vec<Violation>) -> String {
    let key = sanitize_public_key(raw);
    if key.is_empty() {
        violations.push(Violation::Missing { field });
    } else if !is_valid_public_key(&key) {
        violations.push(Violation::InvalidPublicKey { field });
    }
    key
}
