//! # In-Memory Provisioner
//!
//! Keeps accounts, VMs and clusters in maps behind one mutex. IPs are
//! handed out from a counter so tests see stable addresses. Any operation
//! can be made to fail with [`InMemoryProvisioner::inject_failure`].

use crate::domain::cluster::{Cluster, ClusterQuota, ClusterStatus, CreateClusterInput};
use crate::domain::errors::ProvisionerError;
use crate::domain::limits::ResourceLimits;
use crate::domain::vm::{CreateVmInput, Quota, Vm, VmStatus};
use crate::ports::Provisioner;
use chrono::Utc;
use parking_lot::Mutex;
use shared_types::RegistrationRequest;
use std::collections::HashMap;

const IP_PREFIX: &str = "10.254.0";
const FIRST_VM_HOST: u32 = 10;
const FIRST_CLUSTER_HOST: u32 = 100;
const MOCK_K8S_VERSION: &str = "v1.28.0";

/// Operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailurePoint {
    SubjectExists,
    CreateSubject,
    UpdateCredential,
    ContactEmail,
    CreateVm,
    DeleteVm,
    CreateCluster,
    DeleteCluster,
}

impl FailurePoint {
    fn action(self) -> &'static str {
        match self {
            FailurePoint::SubjectExists => "check user",
            FailurePoint::CreateSubject => "create user",
            FailurePoint::UpdateCredential => "update user key",
            FailurePoint::ContactEmail => "read user metadata",
            FailurePoint::CreateVm => "create VM",
            FailurePoint::DeleteVm => "delete VM",
            FailurePoint::CreateCluster => "create cluster",
            FailurePoint::DeleteCluster => "delete cluster",
        }
    }
}

#[derive(Debug, Clone)]
struct Account {
    email: Option<String>,
    public_key: String,
}

#[derive(Debug, Default)]
struct State {
    accounts: HashMap<String, Account>,
    vms: HashMap<String, Vec<Vm>>,
    clusters: HashMap<String, Vec<Cluster>>,
    failures: HashMap<FailurePoint, String>,
    calls: HashMap<FailurePoint, u32>,
    next_vm_host: u32,
    next_cluster_host: u32,
}

impl State {
    /// Count the call, then fail it if a failure is injected.
    fn enter(&mut self, point: FailurePoint) -> Result<(), ProvisionerError> {
        *self.calls.entry(point).or_insert(0) += 1;
        match self.failures.get(&point) {
            Some(detail) => Err(ProvisionerError::CommandFailed {
                action: point.action(),
                detail: detail.clone(),
                stdout: String::new(),
                stderr: detail.clone(),
            }),
            None => Ok(()),
        }
    }
}

/// Provisioner that touches nothing outside the process.
#[derive(Debug)]
pub struct InMemoryProvisioner {
    state: Mutex<State>,
    limits: ResourceLimits,
}

impl Default for InMemoryProvisioner {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryProvisioner {
    pub fn new() -> Self {
        Self::with_limits(ResourceLimits::default())
    }

    pub fn with_limits(limits: ResourceLimits) -> Self {
        Self {
            state: Mutex::new(State {
                next_vm_host: FIRST_VM_HOST,
                next_cluster_host: FIRST_CLUSTER_HOST,
                ..State::default()
            }),
            limits,
        }
    }

    /// Register an existing account without going through approval.
    pub fn seed_subject(&self, username: &str, email: Option<&str>, public_key: &str) {
        self.state.lock().accounts.insert(
            username.to_string(),
            Account {
                email: email.map(str::to_string),
                public_key: public_key.to_string(),
            },
        );
    }

    /// Authorized key currently installed for `username`.
    pub fn public_key(&self, username: &str) -> Option<String> {
        self.state
            .lock()
            .accounts
            .get(username)
            .map(|a| a.public_key.clone())
    }

    pub fn subject_count(&self) -> usize {
        self.state.lock().accounts.len()
    }

    /// Make every later call at `point` fail with `detail` until cleared.
    pub fn inject_failure(&self, point: FailurePoint, detail: impl Into<String>) {
        self.state.lock().failures.insert(point, detail.into());
    }

    pub fn clear_failure(&self, point: FailurePoint) {
        self.state.lock().failures.remove(&point);
    }

    /// Times `point` was entered, failed calls included.
    pub fn calls(&self, point: FailurePoint) -> u32 {
        self.state.lock().calls.get(&point).copied().unwrap_or(0)
    }
}

fn vm_not_found(name: &str) -> ProvisionerError {
    ProvisionerError::NotFound {
        resource: "VM",
        name: name.to_string(),
    }
}

fn cluster_not_found(name: &str) -> ProvisionerError {
    ProvisionerError::NotFound {
        resource: "cluster",
        name: name.to_string(),
    }
}

fn mock_kubeconfig(cluster: &Cluster) -> String {
    format!(
        "apiVersion: v1\n\
         kind: Config\n\
         clusters:\n\
         - cluster:\n    server: https://{ip}:6443\n  name: {name}\n\
         contexts:\n\
         - context:\n    cluster: {name}\n    user: admin\n  name: {name}\n\
         current-context: {name}\n\
         users:\n\
         - name: admin\n  user:\n    token: mock-token\n",
        ip = cluster.control_plane_ip,
        name = cluster.name,
    )
}

impl Provisioner for InMemoryProvisioner {
    fn subject_exists(&self, username: &str) -> Result<bool, ProvisionerError> {
        let mut state = self.state.lock();
        state.enter(FailurePoint::SubjectExists)?;
        Ok(state.accounts.contains_key(username))
    }

    fn create_subject(&self, request: &RegistrationRequest) -> Result<(), ProvisionerError> {
        let mut state = self.state.lock();
        state.enter(FailurePoint::CreateSubject)?;

        if state.accounts.contains_key(&request.username) {
            return Err(ProvisionerError::AlreadyExists {
                resource: "user",
                name: request.username.clone(),
            });
        }

        state.accounts.insert(
            request.username.clone(),
            Account {
                email: Some(request.email.clone()),
                public_key: request.public_key.clone(),
            },
        );
        tracing::debug!("[pg-03] in-memory account created for {}", request.username);
        Ok(())
    }

    fn update_credential(
        &self,
        username: &str,
        new_public_key: &str,
    ) -> Result<(), ProvisionerError> {
        let mut state = self.state.lock();
        state.enter(FailurePoint::UpdateCredential)?;

        let account = state
            .accounts
            .get_mut(username)
            .ok_or_else(|| ProvisionerError::NotFound {
                resource: "user",
                name: username.to_string(),
            })?;
        account.public_key = new_public_key.to_string();
        Ok(())
    }

    fn contact_email(&self, username: &str) -> Result<Option<String>, ProvisionerError> {
        let mut state = self.state.lock();
        state.enter(FailurePoint::ContactEmail)?;

        state
            .accounts
            .get(username)
            .map(|a| a.email.clone())
            .ok_or_else(|| ProvisionerError::NotFound {
                resource: "user",
                name: username.to_string(),
            })
    }

    fn create_vm(&self, owner: &str, input: &CreateVmInput) -> Result<Vm, ProvisionerError> {
        let mut state = self.state.lock();
        state.enter(FailurePoint::CreateVm)?;

        if state
            .vms
            .get(owner)
            .is_some_and(|vms| vms.iter().any(|vm| vm.name == input.name))
        {
            return Err(ProvisionerError::AlreadyExists {
                resource: "VM",
                name: input.name.clone(),
            });
        }

        let host = state.next_vm_host;
        state.next_vm_host += 1;

        let vm = Vm {
            name: input.name.clone(),
            vsphere_vm_name: format!("{}-{}", owner, input.name),
            owner: owner.to_string(),
            os: input.os.clone(),
            login_user: owner.to_string(),
            spec: input.spec.clone(),
            ip_address: format!("{}.{}", IP_PREFIX, host),
            status: VmStatus::Running,
            created_at: Some(Utc::now()),
        };
        state.vms.entry(owner.to_string()).or_default().push(vm.clone());
        Ok(vm)
    }

    fn delete_vm(&self, owner: &str, name: &str) -> Result<(), ProvisionerError> {
        let mut state = self.state.lock();
        state.enter(FailurePoint::DeleteVm)?;

        let vms = state.vms.get_mut(owner).ok_or_else(|| vm_not_found(name))?;
        let index = vms
            .iter()
            .position(|vm| vm.name == name)
            .ok_or_else(|| vm_not_found(name))?;
        vms.remove(index);
        Ok(())
    }

    fn list_vms(&self, owner: &str) -> Result<Vec<Vm>, ProvisionerError> {
        Ok(self.state.lock().vms.get(owner).cloned().unwrap_or_default())
    }

    fn get_vm(&self, owner: &str, name: &str) -> Result<Vm, ProvisionerError> {
        self.state
            .lock()
            .vms
            .get(owner)
            .and_then(|vms| vms.iter().find(|vm| vm.name == name).cloned())
            .ok_or_else(|| vm_not_found(name))
    }

    fn vm_exists(&self, owner: &str, name: &str) -> Result<bool, ProvisionerError> {
        Ok(self
            .state
            .lock()
            .vms
            .get(owner)
            .is_some_and(|vms| vms.iter().any(|vm| vm.name == name)))
    }

    fn quota(&self, owner: &str) -> Result<Quota, ProvisionerError> {
        let used = self.state.lock().vms.get(owner).map_or(0, Vec::len);
        Ok(Quota::for_usage(&self.limits, used))
    }

    fn create_cluster(
        &self,
        owner: &str,
        input: &CreateClusterInput,
    ) -> Result<Cluster, ProvisionerError> {
        let mut state = self.state.lock();
        state.enter(FailurePoint::CreateCluster)?;

        if state
            .clusters
            .get(owner)
            .is_some_and(|cs| cs.iter().any(|c| c.name == input.name))
        {
            return Err(ProvisionerError::AlreadyExists {
                resource: "cluster",
                name: input.name.clone(),
            });
        }

        let host = state.next_cluster_host;
        state.next_cluster_host += 1;

        let cluster = Cluster {
            name: input.name.clone(),
            owner: owner.to_string(),
            cluster_type: input.cluster_type.clone(),
            k8s_version: MOCK_K8S_VERSION.to_string(),
            control_plane_count: 1,
            worker_count: 2,
            worker_spec: input.worker_spec.clone(),
            control_plane_ip: format!("{}.{}", IP_PREFIX, host),
            worker_ips: Vec::new(),
            status: ClusterStatus::Provisioning,
            created_at: Some(Utc::now()),
            ready_at: None,
            kubeconfig_path: None,
        };
        state
            .clusters
            .entry(owner.to_string())
            .or_default()
            .push(cluster.clone());
        Ok(cluster)
    }

    fn delete_cluster(&self, owner: &str, name: &str) -> Result<(), ProvisionerError> {
        let mut state = self.state.lock();
        state.enter(FailurePoint::DeleteCluster)?;

        let clusters = state
            .clusters
            .get_mut(owner)
            .ok_or_else(|| cluster_not_found(name))?;
        let index = clusters
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| cluster_not_found(name))?;
        clusters.remove(index);
        Ok(())
    }

    fn list_clusters(&self, owner: &str) -> Result<Vec<Cluster>, ProvisionerError> {
        Ok(self
            .state
            .lock()
            .clusters
            .get(owner)
            .cloned()
            .unwrap_or_default())
    }

    fn get_cluster(&self, owner: &str, name: &str) -> Result<Cluster, ProvisionerError> {
        self.state
            .lock()
            .clusters
            .get(owner)
            .and_then(|cs| cs.iter().find(|c| c.name == name).cloned())
            .ok_or_else(|| cluster_not_found(name))
    }

    fn cluster_exists(&self, owner: &str, name: &str) -> Result<bool, ProvisionerError> {
        Ok(self
            .state
            .lock()
            .clusters
            .get(owner)
            .is_some_and(|cs| cs.iter().any(|c| c.name == name)))
    }

    fn kubeconfig(&self, owner: &str, name: &str) -> Result<Vec<u8>, ProvisionerError> {
        let cluster = self.get_cluster(owner, name)?;
        Ok(mock_kubeconfig(&cluster).into_bytes())
    }

    fn cluster_quota(&self, owner: &str) -> Result<ClusterQuota, ProvisionerError> {
        let used = self.state.lock().clusters.get(owner).map_or(0, Vec::len);
        Ok(ClusterQuota::for_usage(&self.limits, used))
    }
}
