//! # Caller Inputs
//!
//! Raw data handed to the lifecycle coordinator by the outer layer (HTTP
//! handler, CLI). Nothing here is validated yet.

use crate::entities::DEFAULT_OPERATOR;
use serde::{Deserialize, Serialize};

/// Registration submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterInput {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub public_key: String,
}

/// Key-change submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyChangeInput {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub new_public_key: String,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Operator approval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApproveInput {
    #[serde(default = "default_operator")]
    pub processed_by: String,
}

impl Default for ApproveInput {
    fn default() -> Self {
        Self {
            processed_by: default_operator(),
        }
    }
}

/// Operator rejection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectInput {
    #[serde(default = "default_operator")]
    pub processed_by: String,
    #[serde(default)]
    pub reason: Option<String>,
}

impl Default for RejectInput {
    fn default() -> Self {
        Self {
            processed_by: default_operator(),
            reason: None,
        }
    }
}

fn default_operator() -> String {
    DEFAULT_OPERATOR.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_decision_body_defaults_operator() {
        let approve: ApproveInput = serde_json::from_str("{}").unwrap();
        assert_eq!(approve.processed_by, "admin");

        let reject: RejectInput = serde_json::from_str(r#"{"reason":"spam"}"#).unwrap();
        assert_eq!(reject.processed_by, "admin");
        assert_eq!(reject.reason.as_deref(), Some("spam"));
    }
}
