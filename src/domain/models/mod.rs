pub mod compromise;
pub mod config;
pub mod feature;
pub mod feedback;
pub mod processing;
pub mod replacement;
pub mod selection;

pub use compromise::{
    CompromiseMetadata, CompromiseOptions, CompromiseResult, ImpactEstimate, ImpactLevel,
    UserPreferences,
};
pub use config::{
    Config, DimensionSettings, EngineConfig, LoggingConfig, RenderingSettings,
    StrategyPreferences, UiFallbackSettings,
};
pub use feature::{
    CompatibilityTier, ConversionContext, DimensionTraits, Feature, FeatureProperties,
    FeatureType, InteractionTrigger, RenderingTraits, ShaderEffect, SourceLocation, UiTraits,
};
pub use feedback::{
    FeedbackOutcome, StrategyFeedback, StrategyPerformance, StrategyPerformanceReport,
};
pub use processing::{
    BatchReport, BatchStatistics, FeatureProcessingResult, ProcessingMetadata, ProcessingStatus,
    NO_APPLICABLE_STRATEGY,
};
pub use replacement::Replacement;
pub use selection::{NormalizedWeights, SelectionCriteria};
