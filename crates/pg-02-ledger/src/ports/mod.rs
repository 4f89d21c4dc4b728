//! # Ports Layer
//!
//! ## Hexagonal Architecture
//!
//! - `inbound.rs` - Driving port (the ledger API used by the coordinator)
//! - `outbound.rs` - Driven port (record persistence)

pub mod inbound;
pub mod outbound;
