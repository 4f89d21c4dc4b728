//! Domain layer: the coordinator's error taxonomy.

pub mod errors;
