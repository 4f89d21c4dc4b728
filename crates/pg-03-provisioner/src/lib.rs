//! # Provisioner Capability (pg-03)
//!
//! Everything the gate does to the outside world goes through the
//! [`Provisioner`] trait: creating the OS account for an approved
//! registration, rotating its SSH key, and managing the VMs and Kubernetes
//! clusters an account owns.
//!
//! ## Backends
//!
//! | Backend | Used for | Behaviour |
//! |---------|----------|-----------|
//! | `ScriptProvisioner` | production | shells out to the admin and resource scripts, reads their metadata JSON |
//! | `InMemoryProvisioner` | tests, dry runs | maps behind a mutex, deterministic IPs, failure injection |
//!
//! The trait is object safe; callers hold an `Arc<dyn Provisioner>` chosen
//! at construction time.
//!
//! ## Resource Requests
//!
//! `ResourceService` wraps any provisioner with the checks a resource
//! request must pass before a script runs: the owner must be provisioned,
//! the input must validate, the quota must have room and the name must be
//! free.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::memory::{FailurePoint, InMemoryProvisioner};
pub use adapters::script::{ScriptConfig, ScriptProvisioner, API_MODE_ENV};
pub use domain::cluster::{
    Cluster, ClusterQuota, ClusterStatus, CreateClusterInput, CLUSTER_TYPES, WORKER_SPECS,
};
pub use domain::errors::ProvisionerError;
pub use domain::limits::ResourceLimits;
pub use domain::names::is_valid_resource_name;
pub use domain::vm::{CreateVmInput, Quota, Vm, VmBatch, VmStatus, SUPPORTED_OS, VM_SPECS};
pub use ports::Provisioner;
pub use service::{ClusterListing, ResourceService, VmListing};
