//! # Shared Types Crate
//!
//! Domain entities and inputs shared by every Provisioning Gate subsystem.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: the durable record shape of both request
//!   kinds is defined here and nowhere else.
//! - **Terminal Decisions**: `RequestLifecycle` is the only place a request
//!   changes status, and it refuses to leave a terminal state.
//! - **Plain Inputs**: submission inputs carry raw caller data; validation
//!   lives in `pg-01-validation`.

pub mod entities;
pub mod errors;
pub mod ids;
pub mod inputs;

pub use entities::*;
pub use errors::*;
pub use ids::*;
pub use inputs::*;
