//! # Resource Service
//!
//! Admission checks for VM and cluster requests, run in front of any
//! provisioner:
//!
//! 1. The owner must already have an account
//! 2. The input must validate
//! 3. The owner's quota must have room for the whole request
//! 4. A single VM or cluster name must not be taken
//!
//! A VM batch creates what it can and reports the rest.

use crate::domain::cluster::{Cluster, ClusterQuota, CreateClusterInput};
use crate::domain::errors::ProvisionerError;
use crate::domain::vm::{CreateVmInput, Quota, Vm, VmBatch};
use crate::ports::Provisioner;
use serde::Serialize;
use std::sync::Arc;

/// An owner's VMs with their quota.
#[derive(Debug, Clone, Serialize)]
pub struct VmListing {
    pub vms: Vec<Vm>,
    pub total: usize,
    pub quota: Quota,
}

/// An owner's clusters with their quota.
#[derive(Debug, Clone, Serialize)]
pub struct ClusterListing {
    pub clusters: Vec<Cluster>,
    pub total: usize,
    pub quota: ClusterQuota,
}

pub struct ResourceService<P: Provisioner + ?Sized> {
    provisioner: Arc<P>,
}

impl<P: Provisioner + ?Sized> ResourceService<P> {
    pub fn new(provisioner: Arc<P>) -> Self {
        Self { provisioner }
    }

    fn ensure_owner(&self, owner: &str) -> Result<(), ProvisionerError> {
        if self.provisioner.subject_exists(owner)? {
            Ok(())
        } else {
            Err(ProvisionerError::NotFound {
                resource: "user",
                name: owner.to_string(),
            })
        }
    }

    /// Create one VM or a numbered batch.
    ///
    /// Fails outright only when admission fails or nothing was created.
    pub fn create_vms(&self, owner: &str, input: &CreateVmInput) -> Result<VmBatch, ProvisionerError> {
        self.ensure_owner(owner)?;
        input.validate()?;

        let count = input.effective_count();
        self.provisioner.quota(owner)?.admit(count)?;

        if count == 1 && self.provisioner.vm_exists(owner, &input.name)? {
            return Err(ProvisionerError::AlreadyExists {
                resource: "VM",
                name: input.name.clone(),
            });
        }

        let mut batch = VmBatch::default();
        for name in input.expanded_names() {
            match self.provisioner.create_vm(owner, &input.single(&name)) {
                Ok(vm) => {
                    batch.vms.push(vm);
                    batch.created += 1;
                }
                Err(e) => {
                    batch.failed += 1;
                    batch.errors.push(format!("failed to create {}: {}", name, e));
                }
            }
        }

        if batch.created == 0 {
            return Err(ProvisionerError::CommandFailed {
                action: "create VMs",
                detail: batch.errors.join("; "),
                stdout: String::new(),
                stderr: String::new(),
            });
        }

        tracing::info!(
            "[pg-03] {} created {} VM(s), {} failed",
            owner,
            batch.created,
            batch.failed
        );
        Ok(batch)
    }

    pub fn delete_vm(&self, owner: &str, name: &str) -> Result<(), ProvisionerError> {
        if !self.provisioner.vm_exists(owner, name)? {
            return Err(ProvisionerError::NotFound {
                resource: "VM",
                name: name.to_string(),
            });
        }
        self.provisioner.delete_vm(owner, name)
    }

    pub fn get_vm(&self, owner: &str, name: &str) -> Result<Vm, ProvisionerError> {
        self.provisioner.get_vm(owner, name)
    }

    pub fn list_vms(&self, owner: &str) -> Result<VmListing, ProvisionerError> {
        let vms = self.provisioner.list_vms(owner)?;
        let quota = self.provisioner.quota(owner)?;
        Ok(VmListing {
            total: vms.len(),
            vms,
            quota,
        })
    }

    pub fn create_cluster(
        &self,
        owner: &str,
        input: &CreateClusterInput,
    ) -> Result<Cluster, ProvisionerError> {
        self.ensure_owner(owner)?;
        input.validate()?;
        self.provisioner.cluster_quota(owner)?.admit_one()?;

        if self.provisioner.cluster_exists(owner, &input.name)? {
            return Err(ProvisionerError::AlreadyExists {
                resource: "cluster",
                name: input.name.clone(),
            });
        }

        let cluster = self.provisioner.create_cluster(owner, input)?;
        tracing::info!("[pg-03] cluster creation started: {}/{}", owner, cluster.name);
        Ok(cluster)
    }

    pub fn delete_cluster(&self, owner: &str, name: &str) -> Result<(), ProvisionerError> {
        if !self.provisioner.cluster_exists(owner, name)? {
            return Err(ProvisionerError::NotFound {
                resource: "cluster",
                name: name.to_string(),
            });
        }
        self.provisioner.delete_cluster(owner, name)
    }

    pub fn get_cluster(&self, owner: &str, name: &str) -> Result<Cluster, ProvisionerError> {
        self.provisioner.get_cluster(owner, name)
    }

    pub fn list_clusters(&self, owner: &str) -> Result<ClusterListing, ProvisionerError> {
        let clusters = self.provisioner.list_clusters(owner)?;
        let quota = self.provisioner.cluster_quota(owner)?;
        Ok(ClusterListing {
            total: clusters.len(),
            clusters,
            quota,
        })
    }

    pub fn kubeconfig(&self, owner: &str, name: &str) -> Result<Vec<u8>, ProvisionerError> {
        self.provisioner.kubeconfig(owner, name)
    }
}
