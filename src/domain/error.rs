use thiserror::Error;

use super::models::compromise::ImpactLevel;
use super::models::feature::FeatureType;

/// Errors a compromise strategy reports from estimation or application.
///
/// These never cross the engine boundary: the selector drops the candidate
/// and the engine falls back to the next one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StrategyError {
    #[error("Feature type {0} is not supported by this strategy")]
    UnsupportedFeature(FeatureType),

    #[error("Invalid feature properties: {0}")]
    InvalidProperties(String),

    #[error("Impact estimation failed: {0}")]
    EstimationFailed(String),

    #[error("Compromise application failed: {0}")]
    ApplyFailed(String),

    #[error("Impact level {actual} exceeds the tolerated maximum {max}")]
    ImpactLimitExceeded { actual: ImpactLevel, max: ImpactLevel },

    #[error("Strategy timed out after {0} ms")]
    TimedOut(u64),
}

/// Engine construction and feedback errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid engine configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid feedback: {0}")]
    InvalidFeedback(String),
}

pub type StrategyResult<T> = Result<T, StrategyError>;
