//! # Domain Layer
//!
//! Pure ledger rules: what a record must expose, how each ledger kind
//! behaves, and which errors can surface.

pub mod errors;
pub mod keys;
pub mod policy;
pub mod record;
