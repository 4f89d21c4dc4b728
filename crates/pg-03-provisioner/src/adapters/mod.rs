//! # Adapters Module
//!
//! Provisioner implementations.
//!
//! ## Modules
//!
//! - `script`: production backend driving the admin and resource scripts
//! - `memory`: in-process backend for tests and dry runs

pub mod memory;
pub mod script;
