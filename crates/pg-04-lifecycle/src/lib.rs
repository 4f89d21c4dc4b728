//! # Lifecycle Coordinator (pg-04)
//!
//! The request state machine. Every request starts Pending and is closed
//! exactly once by an operator:
//!
//! ```text
//! submit ──→ [PENDING] ──approve──→ [APPROVED]  provisioner called first
//!                │
//!                └──────reject───→ [REJECTED]  no external call
//! ```
//!
//! ## Guarantees
//!
//! | Guarantee | Enforcement |
//! |-----------|-------------|
//! | Every rule violation reported | validator collects, coordinator passes the list through |
//! | One Pending request per subject | pre-check, then the ledger's atomic re-check |
//! | Provisioned subjects cannot re-register | provisioner probe on submit and approve |
//! | Approval hands off exactly once | per-kind decision lock, Pending re-checked under it |
//! | Failed provisioning leaves no trace | record written only after the provisioner succeeds |
//!
//! ## Usage
//!
//! ```ignore
//! let coordinator = LifecycleCoordinator::new(registrations, key_changes, provisioner);
//! let request = coordinator.submit_registration(&input)?;
//! coordinator.approve_registration("alice", &ApproveInput::default())?;
//! ```

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::errors::{ErrorKind, LifecycleError};
pub use ports::inbound::{KeyChangeApi, RegistrationApi};
pub use ports::outbound::{ManualTimeSource, SystemTimeSource, TimeSource};
pub use service::{FileCoordinator, LifecycleCoordinator};
