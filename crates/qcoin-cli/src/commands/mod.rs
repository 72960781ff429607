//! CLI command implementations.

pub mod common;
pub mod devices;
pub mod flip;
pub mod play;
pub mod version;
