//! Shared helpers for the comparison integration tests

mod fixtures;
mod logging;

pub use fixtures::*;
pub use logging::*;
