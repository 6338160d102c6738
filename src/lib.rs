//! Modbridge - compromise strategy engine
//!
//! Decides how to adapt mod features that have no direct equivalent on the
//! target platform: custom screens, shaders and rendering, custom dimensions.
//! Competing strategies are scored against weighted criteria, the winner is
//! applied, and failures fall back to the next candidate.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Feature and compromise models, errors, and the strategy port
//! - **Service Layer** (`services`): Registry, selector, engine, feedback log, and built-in strategies
//! - **Infrastructure Layer** (`infrastructure`): Configuration loading and logging
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```no_run
//! use modbridge::{CompatibilityTier, CompromiseEngine, CompromiseOptions, ConversionContext,
//!     EngineConfig, Feature, FeatureType};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let engine = CompromiseEngine::new(EngineConfig::default())?;
//!     let feature = Feature::new("furnace_screen", "Alloy Furnace", FeatureType::Gui,
//!         CompatibilityTier::NoEquivalent);
//!     let context = ConversionContext::new("industrial_plus", "1.4.0");
//!
//!     let result = engine
//!         .process_feature(&feature, &context, &CompromiseOptions::default())
//!         .await;
//!     println!("{} via {:?}", result.status.as_str(), result.strategy_used());
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    BatchReport, BatchStatistics, CompatibilityTier, CompromiseOptions, CompromiseResult, Config,
    ConversionContext, EngineConfig, Feature, FeatureProcessingResult, FeatureType, ImpactLevel,
    ProcessingStatus, SelectionCriteria, StrategyFeedback, StrategyPerformanceReport,
    UserPreferences,
};
pub use domain::ports::CompromiseStrategy;
pub use domain::{EngineError, StrategyError, StrategyResult};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{CompromiseEngine, PreferencesAdapter, StrategyRegistry, StrategySelector};
