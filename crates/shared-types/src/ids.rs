//! # Request Identifiers
//!
//! Ids are opaque strings made of a kind prefix and a v4 UUID in simple
//! form, so they are unique for the lifetime of a ledger and safe to use as
//! file names.

use uuid::Uuid;

/// Prefix of registration request ids.
pub const REGISTRATION_ID_PREFIX: &str = "req";

/// Prefix of key-change request ids.
pub const KEY_CHANGE_ID_PREFIX: &str = "keychange";

/// Generate a fresh registration request id.
pub fn new_registration_id() -> String {
    prefixed_id(REGISTRATION_ID_PREFIX)
}

/// Generate a fresh key-change request id.
pub fn new_key_change_id() -> String {
    prefixed_id(KEY_CHANGE_ID_PREFIX)
}

fn prefixed_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_prefixed_and_distinct() {
        let a = new_registration_id();
        let b = new_registration_id();

        assert!(a.starts_with("req-"));
        assert_ne!(a, b);
        assert!(new_key_change_id().starts_with("keychange-"));
    }

    #[test]
    fn test_ids_are_filename_safe() {
        let id = new_key_change_id();
        assert!(id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-'));
    }
}
