//! Storage Adapters
//!
//! Implementations of the `RecordBackend` trait.

mod file;
mod memory;

pub use file::FileRecordBackend;
pub use memory::InMemoryRecordBackend;
