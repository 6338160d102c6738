//! CLI command implementations.

pub mod preview;
pub mod process;
pub mod strategies;
