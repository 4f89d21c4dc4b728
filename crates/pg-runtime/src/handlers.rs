//! # Command Handlers
//!
//! One function per subcommand. Each returns what the binary prints.

use std::fs;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{json, Value};

use pg_03_provisioner::{CreateClusterInput, CreateVmInput};
use pg_04_lifecycle::{KeyChangeApi, RegistrationApi};
use shared_types::{ApproveInput, KeyChangeInput, RegisterInput, RejectInput};

use crate::cli::{ClusterCommand, Command, KeySource, RequestKind, VmCommand};
use crate::container::GateContainer;

/// Result of a command.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Json(Value),
    /// Printed verbatim (kubeconfig).
    Raw(Vec<u8>),
}

fn to_json<T: Serialize>(value: &T) -> Result<Output> {
    Ok(Output::Json(
        serde_json::to_value(value).context("failed to encode output")?,
    ))
}

/// Run `command` against the gate.
pub fn execute(gate: &GateContainer, command: Command) -> Result<Output> {
    match command {
        Command::Register {
            username,
            email,
            key,
            team,
        } => {
            let input = RegisterInput {
                username,
                email,
                team,
                public_key: read_key(&key)?,
            };
            to_json(&gate.coordinator.submit_registration(&input)?)
        }
        Command::KeyChange {
            username,
            email,
            key,
            reason,
        } => {
            let input = KeyChangeInput {
                username,
                email,
                new_public_key: read_key(&key)?,
                reason,
            };
            to_json(&gate.coordinator.submit_key_change(&input)?)
        }
        Command::List { kind, status } => match kind {
            RequestKind::Registration => {
                let requests = gate.coordinator.list_registrations(status)?;
                Ok(Output::Json(json!({ "total": requests.len(), "requests": requests })))
            }
            RequestKind::KeyChange => {
                let requests = gate.coordinator.list_key_changes(status)?;
                Ok(Output::Json(json!({ "total": requests.len(), "requests": requests })))
            }
        },
        Command::Show { kind, username, id } => match (kind, id) {
            (RequestKind::Registration, true) => to_json(&gate.coordinator.get_registration(&username)?),
            (RequestKind::Registration, false) => {
                to_json(&gate.coordinator.registration_for(&username)?)
            }
            (RequestKind::KeyChange, true) => to_json(&gate.coordinator.get_key_change(&username)?),
            (RequestKind::KeyChange, false) => to_json(&gate.coordinator.key_change_for(&username)?),
        },
        Command::Approve { kind, username, by } => {
            let input = ApproveInput { processed_by: by };
            match kind {
                RequestKind::Registration => {
                    to_json(&gate.coordinator.approve_registration(&username, &input)?)
                }
                RequestKind::KeyChange => {
                    to_json(&gate.coordinator.approve_key_change(&username, &input)?)
                }
            }
        }
        Command::Reject {
            kind,
            username,
            by,
            reason,
        } => {
            let input = RejectInput {
                processed_by: by,
                reason,
            };
            match kind {
                RequestKind::Registration => {
                    to_json(&gate.coordinator.reject_registration(&username, &input)?)
                }
                RequestKind::KeyChange => {
                    to_json(&gate.coordinator.reject_key_change(&username, &input)?)
                }
            }
        }
        Command::Vm(command) => vm(gate, command),
        Command::Cluster(command) => cluster(gate, command),
    }
}

fn vm(gate: &GateContainer, command: VmCommand) -> Result<Output> {
    match command {
        VmCommand::List { owner } => to_json(&gate.resources.list_vms(&owner)?),
        VmCommand::Show { owner, name } => to_json(&gate.resources.get_vm(&owner, &name)?),
        VmCommand::Create {
            owner,
            name,
            os,
            spec,
            count,
        } => {
            let input = CreateVmInput::new(name, os, spec).with_count(count);
            to_json(&gate.resources.create_vms(&owner, &input)?)
        }
        VmCommand::Delete { owner, name } => {
            gate.resources.delete_vm(&owner, &name)?;
            Ok(Output::Json(json!({ "deleted": name })))
        }
    }
}

fn cluster(gate: &GateContainer, command: ClusterCommand) -> Result<Output> {
    match command {
        ClusterCommand::List { owner } => to_json(&gate.resources.list_clusters(&owner)?),
        ClusterCommand::Show { owner, name } => {
            to_json(&gate.resources.get_cluster(&owner, &name)?)
        }
        ClusterCommand::Create {
            owner,
            name,
            cluster_type,
            worker_spec,
        } => {
            let input = CreateClusterInput::new(name, cluster_type, worker_spec);
            to_json(&gate.resources.create_cluster(&owner, &input)?)
        }
        ClusterCommand::Delete { owner, name } => {
            gate.resources.delete_cluster(&owner, &name)?;
            Ok(Output::Json(json!({ "deleted": name })))
        }
        ClusterCommand::Kubeconfig { owner, name } => {
            Ok(Output::Raw(gate.resources.kubeconfig(&owner, &name)?))
        }
    }
}

fn read_key(source: &KeySource) -> Result<String> {
    match (&source.key, &source.key_file) {
        (Some(key), _) => Ok(key.clone()),
        (None, Some(path)) => fs::read_to_string(path)
            .with_context(|| format!("failed to read public key from {}", path.display())),
        (None, None) => anyhow::bail!("either --key or --key-file is required"),
    }
}
