//! Domain layer: resource models, input rules, limits and errors.

pub mod cluster;
pub mod errors;
pub mod limits;
pub mod names;
pub mod vm;
