//! # Command Line
//!
//! Flags override the environment; subcommands address one request kind.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use shared_types::RequestStatus;

use crate::container::config::{parse_domain_list, GateConfig, ProvisionerBackend};

/// provisioning-gate - human-gated account provisioning
#[derive(Parser, Debug)]
#[command(name = "provisioning-gate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Directory holding request records
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Provisioning backend
    #[arg(long, global = true, value_enum)]
    pub provisioner: Option<BackendArg>,

    /// Admin script used to create accounts
    #[arg(long, global = true)]
    pub admin_script: Option<PathBuf>,

    /// Accepted registration email domains (comma separated)
    #[arg(long, global = true)]
    pub allowed_domains: Option<String>,

    /// Log level when RUST_LOG is unset (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendArg {
    Script,
    Memory,
}

impl From<BackendArg> for ProvisionerBackend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Script => ProvisionerBackend::Script,
            BackendArg::Memory => ProvisionerBackend::Memory,
        }
    }
}

/// Which ledger a command addresses.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestKind {
    Registration,
    KeyChange,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    // === Submissions ===
    /// Submit a registration request
    Register {
        username: String,
        email: String,
        #[command(flatten)]
        key: KeySource,
        #[arg(long)]
        team: Option<String>,
    },

    /// Submit an SSH key change for an existing account
    KeyChange {
        username: String,
        email: String,
        #[command(flatten)]
        key: KeySource,
        #[arg(long)]
        reason: Option<String>,
    },

    // === Queries ===
    /// List requests, newest first
    #[command(alias = "ls")]
    List {
        #[arg(value_enum)]
        kind: RequestKind,
        /// Only requests in this status (pending, approved, rejected)
        #[arg(long)]
        status: Option<RequestStatus>,
    },

    /// Show one request by username, or by id with --id
    Show {
        #[arg(value_enum)]
        kind: RequestKind,
        username: String,
        /// Treat the argument as a request id
        #[arg(long)]
        id: bool,
    },

    // === Decisions ===
    /// Approve the pending request for a username
    Approve {
        #[arg(value_enum)]
        kind: RequestKind,
        username: String,
        /// Operator recorded on the request
        #[arg(long, default_value = "admin")]
        by: String,
    },

    /// Reject the pending request for a username
    Reject {
        #[arg(value_enum)]
        kind: RequestKind,
        username: String,
        #[arg(long, default_value = "admin")]
        by: String,
        #[arg(long)]
        reason: Option<String>,
    },

    // === Resources ===
    /// Manage an account's VMs
    #[command(subcommand)]
    Vm(VmCommand),

    /// Manage an account's Kubernetes clusters
    #[command(subcommand)]
    Cluster(ClusterCommand),
}

/// Public key given inline or read from a file.
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct KeySource {
    /// Public key text
    #[arg(long)]
    pub key: Option<String>,
    /// File holding the public key
    #[arg(long)]
    pub key_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum VmCommand {
    /// List VMs with quota usage
    List { owner: String },
    /// Show one VM
    Show { owner: String, name: String },
    /// Create a VM, or a numbered batch with --count
    Create {
        owner: String,
        name: String,
        #[arg(long, default_value = "ubuntu-24.04")]
        os: String,
        #[arg(long, default_value = "small")]
        spec: String,
        #[arg(long, default_value_t = 1)]
        count: u32,
    },
    /// Delete a VM
    Delete { owner: String, name: String },
}

#[derive(Subcommand, Debug)]
pub enum ClusterCommand {
    /// List clusters with quota usage
    List { owner: String },
    /// Show one cluster
    Show { owner: String, name: String },
    /// Create a cluster
    Create {
        owner: String,
        name: String,
        #[arg(long = "type", default_value = "dev")]
        cluster_type: String,
        #[arg(long, default_value = "medium")]
        worker_spec: String,
    },
    /// Delete a cluster
    Delete { owner: String, name: String },
    /// Print a ready cluster's kubeconfig
    Kubeconfig { owner: String, name: String },
}

impl Cli {
    /// Apply command-line overrides on top of `config`.
    pub fn apply_overrides(&self, config: &mut GateConfig) {
        if let Some(dir) = &self.data_dir {
            config.storage.data_dir = dir.clone();
        }
        if let Some(backend) = self.provisioner {
            config.provisioner.backend = backend.into();
        }
        if let Some(script) = &self.admin_script {
            config.provisioner.script.admin_script = script.clone();
        }
        if let Some(domains) = &self.allowed_domains {
            config.validation.allowed_email_domains = parse_domain_list(domains);
        }
    }
}
