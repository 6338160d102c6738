//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines the async trait interface that compromise strategies
//! implement:
//! - CompromiseStrategy: applicability, impact estimation, and application
//!
//! The registry, selector, and engine depend only on this contract, so
//! strategies supplied by callers are interchangeable with the built-in ones.

pub mod compromise_strategy;

pub use compromise_strategy::CompromiseStrategy;
