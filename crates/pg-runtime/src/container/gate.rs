//! # Gate Wiring
//!
//! ```text
//! GateConfig ──→ registration ledger   (data_dir)
//!            ──→ key-change ledger     (data_dir/key-changes)
//!            ──→ provisioner           (script | memory)
//!                      │
//!                      ├──→ LifecycleCoordinator  (requests)
//!                      └──→ ResourceService       (VMs, clusters)
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use pg_02_ledger::{open_key_change_ledger, open_registration_ledger};
use pg_03_provisioner::{InMemoryProvisioner, Provisioner, ResourceService, ScriptProvisioner};
use pg_04_lifecycle::{FileCoordinator, LifecycleCoordinator};

use crate::container::config::{GateConfig, ProvisionerBackend};

/// Everything a command needs, built once from configuration.
pub struct GateContainer {
    pub config: GateConfig,
    pub coordinator: FileCoordinator,
    pub resources: ResourceService<dyn Provisioner>,
}

impl GateContainer {
    /// Open the ledgers and the configured provisioner.
    pub fn build(config: GateConfig) -> Result<Self> {
        let provisioner = build_provisioner(&config)?;
        Self::with_provisioner(config, provisioner)
    }

    /// Wire around an already built provisioner.
    pub fn with_provisioner(config: GateConfig, provisioner: Arc<dyn Provisioner>) -> Result<Self> {
        let data_dir = &config.storage.data_dir;

        let registrations = open_registration_ledger(data_dir).with_context(|| {
            format!("failed to open registration ledger at {}", data_dir.display())
        })?;
        let key_changes = open_key_change_ledger(data_dir).with_context(|| {
            format!("failed to open key-change ledger under {}", data_dir.display())
        })?;

        let coordinator = LifecycleCoordinator::new(
            Arc::new(registrations),
            Arc::new(key_changes),
            Arc::clone(&provisioner),
        )
        .with_allowed_domains(config.validation.allowed_email_domains.clone());

        let resources = ResourceService::new(provisioner);

        info!(
            "[pg-runtime] gate ready (data: {}, provisioner: {:?})",
            data_dir.display(),
            config.provisioner.backend
        );

        Ok(Self {
            config,
            coordinator,
            resources,
        })
    }
}

fn build_provisioner(config: &GateConfig) -> Result<Arc<dyn Provisioner>> {
    match config.provisioner.backend {
        ProvisionerBackend::Script => {
            let script = ScriptProvisioner::new(config.provisioner.script.clone())
                .context("failed to initialize script provisioner")?;
            Ok(Arc::new(script))
        }
        ProvisionerBackend::Memory => Ok(Arc::new(InMemoryProvisioner::with_limits(
            config.provisioner.script.limits,
        ))),
    }
}
