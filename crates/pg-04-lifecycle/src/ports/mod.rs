//! Ports for the lifecycle coordinator.

pub mod inbound;
pub mod outbound;
