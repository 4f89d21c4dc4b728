//! Per-owner resource limits.

use serde::{Deserialize, Serialize};

/// Ceilings applied to every owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceLimits {
    pub max_vms: u32,
    pub max_ips: u32,
    pub max_clusters: u32,
    pub max_nodes_per_cluster: u32,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            max_vms: 10,
            max_ips: 32,
            max_clusters: 3,
            max_nodes_per_cluster: 10,
        }
    }
}
