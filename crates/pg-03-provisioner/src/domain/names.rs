//! Naming rule shared by VMs, clusters and the path segments built from
//! owner names.

/// Longest VM or cluster name.
pub const MAX_RESOURCE_NAME_LEN: usize = 30;

/// 1-30 characters of `[a-z0-9-]`, hyphen never first or last.
pub fn is_valid_resource_name(name: &str) -> bool {
    if name.is_empty() || name.len() > MAX_RESOURCE_NAME_LEN {
        return false;
    }
    let last = name.len() - 1;
    name.bytes().enumerate().all(|(i, b)| match b {
        b'a'..=b'z' | b'0'..=b'9' => true,
        b'-' => i > 0 && i < last,
        _ => false,
    })
}

/// Case-insensitive membership in a fixed option list.
pub(crate) fn is_one_of(value: &str, options: &[&str]) -> bool {
    options.iter().any(|o| o.eq_ignore_ascii_case(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_names() {
        assert!(is_valid_resource_name("a"));
        assert!(is_valid_resource_name("web-01"));
        assert!(is_valid_resource_name(&"x".repeat(30)));

        assert!(!is_valid_resource_name(""));
        assert!(!is_valid_resource_name(&"x".repeat(31)));
        assert!(!is_valid_resource_name("-web"));
        assert!(!is_valid_resource_name("web-"));
        assert!(!is_valid_resource_name("Web"));
        assert!(!is_valid_resource_name("../etc"));
        assert!(!is_valid_resource_name("web_01"));
    }

    #[test]
    fn test_option_match_ignores_case() {
        assert!(is_one_of("Ubuntu-24.04", &["ubuntu-24.04"]));
        assert!(!is_one_of("debian", &["ubuntu-24.04"]));
    }
}
