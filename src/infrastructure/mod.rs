//! Infrastructure layer module
//!
//! Adapters around the engine that deal with the outside world:
//! - Configuration management (figment, YAML, environment)
//! - Logging infrastructure (tracing)

pub mod config;
pub mod logging;
