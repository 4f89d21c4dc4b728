//! # Gate Configuration
//!
//! Defaults match the standard deployment. Environment variables override
//! the defaults; command-line flags override both.
//!
//! | Variable | Field |
//! |----------|-------|
//! | `PG_DATA_DIR` | `storage.data_dir` |
//! | `PG_PROVISIONER` | `provisioner.backend` (`script` or `memory`) |
//! | `PG_ADMIN_SCRIPT` | `provisioner.script.admin_script` |
//! | `PG_RESOURCE_DIR` | `provisioner.script.data_dir` |
//! | `PG_USE_SUDO` | `provisioner.script.use_sudo` |
//! | `PG_ALLOWED_EMAIL_DOMAINS` | `validation.allowed_email_domains` (comma separated) |

use pg_03_provisioner::ScriptConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

/// Complete gate configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateConfig {
    pub storage: StorageConfig,
    pub provisioner: ProvisionerConfig,
    pub validation: ValidationConfig,
}

/// Where request records live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Registration records; key changes go in a sub-directory.
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("/var/lib/basphere/pending"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProvisionerBackend {
    /// Real accounts and resources through the admin scripts.
    #[default]
    Script,
    /// Nothing leaves the process.
    Memory,
}

impl FromStr for ProvisionerBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "script" => Ok(ProvisionerBackend::Script),
            "memory" => Ok(ProvisionerBackend::Memory),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionerConfig {
    pub backend: ProvisionerBackend,
    pub script: ScriptConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Registration email domains accepted; empty accepts all.
    pub allowed_email_domains: Vec<String>,
}

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("data directory must not be empty")]
    EmptyDataDir,

    #[error("admin script not found: {0}")]
    MissingAdminScript(PathBuf),

    #[error("unknown provisioner backend '{0}', expected 'script' or 'memory'")]
    UnknownBackend(String),
}

impl GateConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Apply overrides from `lookup`. Unparsable values are logged and
    /// ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(dir) = get("PG_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(dir);
        }
        if let Some(backend) = get("PG_PROVISIONER") {
            match backend.parse() {
                Ok(backend) => self.provisioner.backend = backend,
                Err(e) => warn!("[pg-runtime] ignoring PG_PROVISIONER: {}", e),
            }
        }
        if let Some(script) = get("PG_ADMIN_SCRIPT") {
            self.provisioner.script.admin_script = PathBuf::from(script);
        }
        if let Some(dir) = get("PG_RESOURCE_DIR") {
            self.provisioner.script.data_dir = PathBuf::from(dir);
        }
        if let Some(flag) = get("PG_USE_SUDO") {
            match flag.trim().parse::<bool>() {
                Ok(use_sudo) => self.provisioner.script.use_sudo = use_sudo,
                Err(_) => warn!("[pg-runtime] ignoring PG_USE_SUDO: '{}' is not a boolean", flag),
            }
        }
        if let Some(domains) = get("PG_ALLOWED_EMAIL_DOMAINS") {
            self.validation.allowed_email_domains = parse_domain_list(&domains);
        }
    }

    /// Check the configuration can start a gate.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::EmptyDataDir);
        }
        if self.provisioner.backend == ProvisionerBackend::Script
            && !self.provisioner.script.admin_script.is_file()
        {
            return Err(ConfigError::MissingAdminScript(
                self.provisioner.script.admin_script.clone(),
            ));
        }
        Ok(())
    }
}

/// Split a comma separated domain list, dropping blanks.
pub fn parse_domain_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|d| d.trim().to_ascii_lowercase())
        .filter(|d| !d.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = GateConfig::default();
        assert_eq!(config.storage.data_dir, PathBuf::from("/var/lib/basphere/pending"));
        assert_eq!(config.provisioner.backend, ProvisionerBackend::Script);
        assert_eq!(
            config.provisioner.script.admin_script,
            PathBuf::from("/usr/local/bin/basphere-admin")
        );
        assert!(config.validation.allowed_email_domains.is_empty());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = GateConfig::default();
        config.apply_env(lookup(&[
            ("PG_DATA_DIR", "/srv/gate"),
            ("PG_PROVISIONER", "Memory"),
            ("PG_USE_SUDO", "false"),
            ("PG_ALLOWED_EMAIL_DOMAINS", " Corp.example, ,lab.example "),
        ]));

        assert_eq!(config.storage.data_dir, PathBuf::from("/srv/gate"));
        assert_eq!(config.provisioner.backend, ProvisionerBackend::Memory);
        assert!(!config.provisioner.script.use_sudo);
        assert_eq!(
            config.validation.allowed_email_domains,
            vec!["corp.example", "lab.example"]
        );
    }

    #[test]
    fn test_bad_env_values_ignored() {
        let mut config = GateConfig::default();
        config.apply_env(lookup(&[("PG_PROVISIONER", "ansible"), ("PG_USE_SUDO", "maybe"), ("PG_DATA_DIR", "  ")]));
        assert_eq!(config, GateConfig::default());
    }

    #[test]
    fn test_validate() {
        let mut config = GateConfig::default();
        config.provisioner.backend = ProvisionerBackend::Memory;
        assert!(config.validate().is_ok());

        config.storage.data_dir = PathBuf::new();
        assert_eq!(config.validate(), Err(ConfigError::EmptyDataDir));

        let mut config = GateConfig::default();
        config.provisioner.script.admin_script = PathBuf::from("/nonexistent/admin");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingAdminScript(_))
        ));
    }
}
