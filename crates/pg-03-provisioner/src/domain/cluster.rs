//! Kubernetes cluster model and creation rules.

use super::errors::ProvisionerError;
use super::limits::ResourceLimits;
use super::names::{is_one_of, is_valid_resource_name};
use serde::{Deserialize, Serialize};
use shared_types::Timestamp;

/// Cluster shapes: `dev` is a single small cluster, `standard` a full one.
pub const CLUSTER_TYPES: &[&str] = &["dev", "standard"];

/// Worker node sizes.
pub const WORKER_SPECS: &[&str] = &["small", "medium", "large"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClusterStatus {
    #[default]
    Pending,
    Provisioning,
    Ready,
    Deleting,
    Failed,
}

/// A cluster as reported by its metadata file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Cluster {
    pub name: String,
    pub owner: String,
    #[serde(rename = "type")]
    pub cluster_type: String,
    pub k8s_version: String,
    pub control_plane_count: u32,
    pub worker_count: u32,
    pub worker_spec: String,
    pub control_plane_ip: String,
    pub worker_ips: Vec<String>,
    pub status: ClusterStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ready_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kubeconfig_path: Option<String>,
}

impl Cluster {
    pub fn node_count(&self) -> u32 {
        self.control_plane_count.saturating_add(self.worker_count)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CreateClusterInput {
    pub name: String,
    #[serde(rename = "type")]
    pub cluster_type: String,
    pub worker_spec: String,
}

impl CreateClusterInput {
    pub fn new(
        name: impl Into<String>,
        cluster_type: impl Into<String>,
        worker_spec: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            cluster_type: cluster_type.into(),
            worker_spec: worker_spec.into(),
        }
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

        if self.cluster_type.is_empty() {
            messages.push("type is required".to_string());
        } else if !is_one_of(&self.cluster_type, CLUSTER_TYPES) {
            messages.push(format!("type must be one of: {}", CLUSTER_TYPES.join(", ")));
        }

        if self.worker_spec.is_empty() {
            messages.push("worker_spec is required".to_string());
        } else if !is_one_of(&self.worker_spec, WORKER_SPECS) {
            messages.push(format!(
                "worker_spec must be one of: {}",
                WORKER_SPECS.join(", ")
            ));
        }

        if messages.is_empty() {
            Ok(())
        } else {
            Err(ProvisionerError::InvalidInput { messages })
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterQuota {
    pub max_clusters: u32,
    pub used_clusters: u32,
    pub max_nodes_per_cluster: u32,
}

impl ClusterQuota {
    pub fn for_usage(limits: &ResourceLimits, clusters: usize) -> Self {
        Self {
            max_clusters: limits.max_clusters,
            used_clusters: u32::try_from(clusters).unwrap_or(u32::MAX),
            max_nodes_per_cluster: limits.max_nodes_per_cluster,
        }
    }

    /// Refuse one more cluster once the ceiling is reached.
    pub fn admit_one(&self) -> Result<(), ProvisionerError> {
        if self.used_clusters >= self.max_clusters {
            return Err(ProvisionerError::QuotaExceeded {
                resource: "cluster",
                used: self.used_clusters,
                requested: 1,
                max: self.max_clusters,
            });
        }
        Ok(())
    }
}
