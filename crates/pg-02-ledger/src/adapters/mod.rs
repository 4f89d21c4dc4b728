//! # Adapters Module
//!
//! Adapter implementations for the ledger's outbound ports.
//!
//! ## Modules
//!
//! - `storage`: `RecordBackend` implementations (file, in-memory)

pub mod storage;

pub use storage::{FileRecordBackend, InMemoryRecordBackend};
