//! # Record Keys
//!
//! Record ids double as storage keys (file names for the file backend).

/// Maximum accepted record key length.
pub const MAX_RECORD_KEY_LEN: usize = 128;

/// Check that a record id is a safe storage key.
///
/// # Security
///
/// Only ASCII letters, digits, `-` and `_` are accepted, so a key can never
/// contain a path separator, `..`, or a file extension.
pub fn is_valid_record_key(key: &str) -> bool {
    !key.is_empty()
        && key.len() <= MAX_RECORD_KEY_LEN
        && key
            .bytes()
            .all(|c| c.is_ascii_alphanumeric() || c == b'-' || c == b'_')
}
