//! # Key Sanitization
//!
//! Keys pasted from browsers and Windows editors carry stray whitespace and
//! CR characters. They are cleaned before any pattern check so a failure
//! always points at a real format problem.

/// Trim surrounding whitespace and normalize line endings to LF.
pub fn sanitize_public_key(key: &str) -> String {
    key.trim().replace("\r\n", "\n").replace('\r', "")
}
