//! # Request Validation (pg-01)
//!
//! Pure, side-effect free checks applied to every submission before it
//! reaches a ledger.
//!
//! ## Rules
//!
//! | Field | Rule |
//! |-------|------|
//! | username | 3-20 chars, `[a-z0-9-]`, no leading or trailing hyphen |
//! | email | one `@`, non-empty local part, a `.` somewhere after the domain's first char |
//! | public key | known algorithm prefix, a space, a non-empty body |
//! | email domain | member of the configured allowlist, when one is set |
//!
//! ## Reporting
//!
//! Validation never stops at the first problem: every violated rule is
//! collected into `ValidationErrors`, in field order.

pub mod errors;
pub mod request;
pub mod rules;
pub mod sanitize;

pub use errors::{ValidationErrors, Violation};
pub use request::{
    validate_email_domain, validate_key_change, validate_registration, ValidKeyChange,
    ValidRegistration,
};
pub use rules::{
    is_valid_email, is_valid_public_key, is_valid_subject_name, SUPPORTED_KEY_ALGORITHMS,
};
pub use sanitize::sanitize_public_key;
