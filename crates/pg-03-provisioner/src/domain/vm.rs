//! Virtual machine model and creation rules.

use super::errors::ProvisionerError;
use super::limits::ResourceLimits;
use super::names::{is_one_of, is_valid_resource_name};
use serde::{Deserialize, Serialize};
use shared_types::Timestamp;

/// Operating system images a VM may be built from.
pub const SUPPORTED_OS: &[&str] = &["ubuntu-24.04", "rocky-10.1", "rocky-10"];

/// VM size classes, smallest first.
pub const VM_SPECS: &[&str] = &["tiny", "small", "medium", "large", "huge"];

/// Most VMs a single request may create.
pub const MAX_BATCH: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VmStatus {
    Creating,
    #[default]
    Running,
    Deleting,
    Failed,
}

/// A VM as reported by its metadata file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Vm {
    pub name: String,
    pub vsphere_vm_name: String,
    pub owner: String,
    pub os: String,
    pub login_user: String,
    pub spec: String,
    pub ip_address: String,
    pub status: VmStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
}

/// A request for one VM, or `count` numbered VMs sharing a base name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CreateVmInput {
    pub name: String,
    pub os: String,
    pub spec: String,
    /// 0 means 1.
    #[serde(skip_serializing_if = "is_zero")]
    pub count: u32,
}

fn is_zero(n: &u32) -> bool {
    *n == 0
}

impl CreateVmInput {
    pub fn new(name: impl Into<String>, os: impl Into<String>, spec: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            os: os.into(),
            spec: spec.into(),
            count: 0,
        }
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    /// Check every field, reporting all problems at once.
    pub fn validate(&self) -> Result<(), ProvisionerError> {
        let mut messages = Vec::new();

        if self.name.is_empty() {
            messages.push("name is required".to_string());
        } else if !is_valid_resource_name(&self.name) {
            messages.push(
                "name must be 1-30 characters, lowercase letters, numbers, and hyphens only"
                    .to_string(),
            );
        }

        if self.os.is_empty() {
            messages.push("os is required".to_string());
        } else if !is_one_of(&self.os, SUPPORTED_OS) {
            messages.push(format!("os must be one of: {}", SUPPORTED_OS.join(", ")));
        }

        if self.spec.is_empty() {
            messages.push("spec is required".to_string());
        } else if !is_one_of(&self.spec, VM_SPECS) {
            messages.push(format!("spec must be one of: {}", VM_SPECS.join(", ")));
        }

        if self.count > MAX_BATCH {
            messages.push(format!("count must be between 1 and {}", MAX_BATCH));
        }

        if messages.is_empty() {
            Ok(())
        } else {
            Err(ProvisionerError::InvalidInput { messages })
        }
    }

    /// How many VMs the request creates.
    pub fn effective_count(&self) -> u32 {
        self.count.max(1)
    }

    /// Names of the VMs the request creates: the base name alone, or
    /// `name-0 .. name-(count-1)` for a batch.
    pub fn expanded_names(&self) -> Vec<String> {
        match self.effective_count() {
            1 => vec![self.name.clone()],
            n => (0..n).map(|i| format!("{}-{}", self.name, i)).collect(),
        }
    }

    /// The single-VM request for one expanded name.
    pub fn single(&self, name: &str) -> CreateVmInput {
        CreateVmInput {
            name: name.to_string(),
            os: self.os.clone(),
            spec: self.spec.clone(),
            count: 0,
        }
    }
}

/// VM and IP usage against the owner's limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quota {
    pub max_vms: u32,
    pub used_vms: u32,
    pub max_ips: u32,
    pub used_ips: u32,
}

impl Quota {
    /// Every VM holds one IP.
    pub fn for_usage(limits: &ResourceLimits, vms: usize) -> Self {
        let used = u32::try_from(vms).unwrap_or(u32::MAX);
        Self {
            max_vms: limits.max_vms,
            used_vms: used,
            max_ips: limits.max_ips,
            used_ips: used,
        }
    }

    /// Refuse a request that would push usage past either ceiling.
    pub fn admit(&self, requested: u32) -> Result<(), ProvisionerError> {
        let over_vms = self.used_vms.saturating_add(requested) > self.max_vms;
        let over_ips = self.used_ips.saturating_add(requested) > self.max_ips;
        if over_vms || over_ips {
            return Err(ProvisionerError::QuotaExceeded {
                resource: "VM",
                used: self.used_vms,
                requested,
                max: self.max_vms,
            });
        }
        Ok(())
    }
}

/// Outcome of a batch request: what was created and what failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct VmBatch {
    pub vms: Vec<Vm>,
    pub created: u32,
    pub failed: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_input() {
        let input = CreateVmInput::new("web", "ubuntu-24.04", "small");
        assert!(input.validate().is_ok());
        assert_eq!(input.effective_count(), 1);
        assert_eq!(input.expanded_names(), vec!["web"]);
    }

    #[test]
    fn test_all_problems_reported() {
        let input = CreateVmInput::new("", "windows", "").with_count(11);
        let err = input.validate().unwrap_err();

        let ProvisionerError::InvalidInput { messages } = err else {
            panic!("expected InvalidInput");
        };
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0], "name is required");
        assert!(messages[1].starts_with("os must be one of"));
        assert_eq!(messages[2], "spec is required");
    }

    #[test]
    fn test_batch_names() {
        let input = CreateVmInput::new("node", "rocky-10", "tiny").with_count(3);
        assert_eq!(input.expanded_names(), vec!["node-0", "node-1", "node-2"]);
        assert_eq!(input.single("node-1").count, 0);
    }

    #[test]
    fn test_quota_admission() {
        let quota = Quota::for_usage(&ResourceLimits::default(), 8);
        assert!(quota.admit(2).is_ok());
        assert!(matches!(
            quota.admit(3),
            Err(ProvisionerError::QuotaExceeded { used: 8, requested: 3, max: 10, .. })
        ));

        let tight_ips = ResourceLimits {
            max_ips: 4,
            ..ResourceLimits::default()
        };
        assert!(Quota::for_usage(&tight_ips, 4).admit(1).is_err());
    }

    #[test]
    fn test_metadata_tolerates_missing_fields() {
        let vm: Vm = serde_json::from_str(r#"{"name":"web","status":"creating","extra":1}"#)
            .unwrap();
        assert_eq!(vm.status, VmStatus::Creating);
        assert_eq!(vm.created_at, None);
        assert!(vm.ip_address.is_empty());
    }
}
