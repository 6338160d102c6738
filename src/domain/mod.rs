//! Domain layer for the Modbridge compromise engine
//!
//! This module contains the feature and compromise models, error types, and
//! the strategy port that concrete strategies implement.

pub mod error;
pub mod models;
pub mod ports;

// Re-export error types for convenient access
pub use error::{EngineError, StrategyError, StrategyResult};
