//! Provisioner error types.

use thiserror::Error;

/// Errors raised by a provisioning backend.
#[derive(Debug, Error)]
pub enum ProvisionerError {
    /// An external command exited unsuccessfully or could not start.
    #[error("failed to {action}: {detail}")]
    CommandFailed {
        action: &'static str,
        detail: String,
        stdout: String,
        stderr: String,
    },

    #[error("{resource} not found: {name}")]
    NotFound { resource: &'static str, name: String },

    #[error("{resource} already exists: {name}")]
    AlreadyExists { resource: &'static str, name: String },

    /// Input rejected before anything ran. Every problem is listed.
    #[error("invalid input: {}", .messages.join("; "))]
    InvalidInput { messages: Vec<String> },

    #[error("{resource} quota exceeded: used {used}, requested {requested}, max {max}")]
    QuotaExceeded {
        resource: &'static str,
        used: u32,
        requested: u32,
        max: u32,
    },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {what}: {message}")]
    Parse { what: String, message: String },
}

impl ProvisionerError {
    pub(crate) fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        ProvisionerError::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        ProvisionerError::InvalidInput {
            messages: vec![message.into()],
        }
    }

    /// Captured stdout and stderr of a failed command, if any.
    pub fn captured_output(&self) -> Option<(&str, &str)> {
        match self {
            ProvisionerError::CommandFailed { stdout, stderr, .. } => {
                Some((stdout.as_str(), stderr.as_str()))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = ProvisionerError::InvalidInput {
            messages: vec!["name is required".into(), "os is required".into()],
        };
        assert_eq!(
            err.to_string(),
            "invalid input: name is required; os is required"
        );

        let err = ProvisionerError::QuotaExceeded {
            resource: "VM",
            used: 9,
            requested: 2,
            max: 10,
        };
        assert_eq!(
            err.to_string(),
            "VM quota exceeded: used 9, requested 2, max 10"
        );
    }

    #[test]
    fn test_captured_output_only_on_command_failure() {
        let err = ProvisionerError::CommandFailed {
            action: "create user",
            detail: "exit status: 1".into(),
            stdout: "partial".into(),
            stderr: "boom".into(),
        };
        assert_eq!(err.captured_output(), Some(("partial", "boom")));
        assert_eq!(err.to_string(), "failed to create user: exit status: 1");

        let err = ProvisionerError::NotFound {
            resource: "user",
            name: "alice".into(),
        };
        assert!(err.captured_output().is_none());
    }
}
