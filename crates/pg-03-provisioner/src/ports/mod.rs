//! # Provisioner Port
//!
//! The single outbound capability the gate depends on. Implementations
//! must be safe to share across threads; no timeouts are imposed here.

use crate::domain::cluster::{Cluster, ClusterQuota, CreateClusterInput};
use crate::domain::errors::ProvisionerError;
use crate::domain::vm::{CreateVmInput, Quota, Vm};
use shared_types::RegistrationRequest;

/// Provisioning backend for accounts and the resources they own.
pub trait Provisioner: Send + Sync {
    // ---- Subjects ----

    /// Whether an account already exists for `username`.
    fn subject_exists(&self, username: &str) -> Result<bool, ProvisionerError>;

    /// Create the account for an approved registration.
    fn create_subject(&self, request: &RegistrationRequest) -> Result<(), ProvisionerError>;

    /// Replace the account's authorized SSH key.
    fn update_credential(&self, username: &str, new_public_key: &str)
        -> Result<(), ProvisionerError>;

    /// Contact email recorded for the account; `None` when nothing was
    /// recorded.
    fn contact_email(&self, username: &str) -> Result<Option<String>, ProvisionerError>;

    // ---- VMs ----

    /// Create one VM. Callers expand batches first.
    fn create_vm(&self, owner: &str, input: &CreateVmInput) -> Result<Vm, ProvisionerError>;

    fn delete_vm(&self, owner: &str, name: &str) -> Result<(), ProvisionerError>;

    fn list_vms(&self, owner: &str) -> Result<Vec<Vm>, ProvisionerError>;

    fn get_vm(&self, owner: &str, name: &str) -> Result<Vm, ProvisionerError>;

    fn vm_exists(&self, owner: &str, name: &str) -> Result<bool, ProvisionerError>;

    fn quota(&self, owner: &str) -> Result<Quota, ProvisionerError>;

    // ---- Clusters ----

    fn create_cluster(
        &self,
        owner: &str,
        input: &CreateClusterInput,
    ) -> Result<Cluster, ProvisionerError>;

    fn delete_cluster(&self, owner: &str, name: &str) -> Result<(), ProvisionerError>;

    fn list_clusters(&self, owner: &str) -> Result<Vec<Cluster>, ProvisionerError>;

    fn get_cluster(&self, owner: &str, name: &str) -> Result<Cluster, ProvisionerError>;

    fn cluster_exists(&self, owner: &str, name: &str) -> Result<bool, ProvisionerError>;

    /// Raw kubeconfig of a cluster. `NotFound` while it is still provisioning.
    fn kubeconfig(&self, owner: &str, name: &str) -> Result<Vec<u8>, ProvisionerError>;

    fn cluster_quota(&self, owner: &str) -> Result<ClusterQuota, ProvisionerError>;
}
