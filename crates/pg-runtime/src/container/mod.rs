//! # Gate Container
//!
//! Holds the configured ledgers, provisioner and services for one process.

pub mod config;
pub mod gate;

pub use config::{ConfigError, GateConfig, ProvisionerBackend};
pub use gate::GateContainer;
