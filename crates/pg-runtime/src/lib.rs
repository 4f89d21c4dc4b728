//! # Provisioning Gate Runtime
//!
//! Library half of the `provisioning-gate` binary, exposed for tests.
//!
//! ## Startup
//!
//! 1. `GateConfig::default()`
//! 2. `PG_*` environment overrides
//! 3. command-line flag overrides
//! 4. `validate()`, then `GateContainer::build`
//! 5. run one subcommand and print its JSON result

pub mod cli;
pub mod container;
pub mod handlers;

pub use cli::{Cli, Command, RequestKind};
pub use container::{ConfigError, GateConfig, GateContainer, ProvisionerBackend};
pub use handlers::{execute, Output};
