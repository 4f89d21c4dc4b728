//! # Field Rules
//!
//! Format predicates. Callers sanitize key material first, see
//! `crate::sanitize`.

/// Minimum username length.
pub const MIN_SUBJECT_LEN: usize = 3;

/// Maximum username length.
pub const MAX_SUBJECT_LEN: usize = 20;

/// Key algorithms accepted in `authorized_keys` entries.
pub const SUPPORTED_KEY_ALGORITHMS: &[&str] = &[
    "ssh-rsa",
    "ssh-ed25519",
    "ecdsa-sha2-nistp256",
    "ecdsa-sha2-nistp384",
    "ecdsa-sha2-nistp521",
    "ssh-dss",
];

/// Check a username against the account naming rule.
///
/// # Security
///
/// The name ends up as an OS account name and a ledger lookup key, so the
/// character set is kept to lowercase ASCII letters, digits and inner
/// hyphens.
pub fn is_valid_subject_name(name: &str) -> bool {
    let len = name.len();
    if !(MIN_SUBJECT_LEN..=MAX_SUBJECT_LEN).contains(&len) {
        return false;
    }

    name.bytes().enumerate().all(|(i, c)| match c {
        b'a'..=b'z' | b'0'..=b'9' => true,
        b'-' => i > 0 && i < len - 1,
        _ => false,
    })
}

/// Basic email shape check.
///
/// Exactly one `@` with something before it, and a `.` after the `@` that
/// does not sit directly behind it.
pub fn is_valid_email(email: &str) -> bool {
    let mut at_index = None;
    let mut has_dot = false;

    for (i, c) in email.char_indices() {
        match c {
            '@' if at_index.is_some() => return false,
            '@' => at_index = Some(i),
            '.' => {
                if let Some(at) = at_index {
                    if i > at + 1 {
                        has_dot = true;
                    }
                }
            }
            _ => {}
        }
    }

    matches!(at_index, Some(at) if at > 0) && has_dot
}

/// Check an OpenSSH public key line.
///
/// Accepts `<algorithm> <body>[ <comment>]` where the algorithm is one of
/// `SUPPORTED_KEY_ALGORITHMS` and the body is non-empty.
pub fn is_valid_public_key(key: &str) -> bool {
    let mut parts = key.splitn(2, ' ');
    let algorithm = parts.next().unwrap_or_default();
    let body = parts.next().map(str::trim_start).unwrap_or_default();

    SUPPORTED_KEY_ALGORITHMS.contains(&algorithm) && !body.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_names() {
        for ok in ["alice", "bob-2", "a1b", "abcdefghijklmnopqrst"] {
            assert!(is_valid_subject_name(ok), "{ok} should be valid");
        }
        for bad in [
            "",
            "al",
            "-alice",
            "alice-",
            "Alice",
            "al_ice",
            "abcdefghijklmnopqrstu",
            "ali ce",
            "älice",
        ] {
            assert!(!is_valid_subject_name(bad), "{bad} should be invalid");
        }
    }

    #[test]
    fn test_emails() {
        for ok in ["alice@example.com", "a.b@c.io", "x@dom.a.b"] {
            assert!(is_valid_email(ok), "{ok} should be valid");
        }
        for bad in [
            "",
            "alice",
            "@example.com",
            "alice@@example.com",
            "a@b@c.com",
            "alice@example",
            "alice@.com",
            "alice.smith@example",
        ] {
            assert!(!is_valid_email(bad), "{bad} should be invalid");
        }
    }

    #[test]
    fn test_public_keys() {
        assert!(is_valid_public_key("ssh-ed25519 AAAAC3NzaC1lZDI1NTE5"));
        assert!(is_valid_public_key("ssh-rsa AAAAB3NzaC1yc2E alice@laptop"));
        assert!(is_valid_public_key("ecdsa-sha2-nistp256 AAAAE2VjZHNh"));

        assert!(!is_valid_public_key("ssh-ed25519"));
        assert!(!is_valid_public_key("ssh-ed25519 "));
        assert!(!is_valid_public_key("ssh-ed25519X AAAA"));
        assert!(!is_valid_public_key("sk-ssh-ed25519@openssh.com AAAA"));
        assert!(!is_valid_public_key("-----BEGIN PUBLIC KEY-----"));
    }
}
