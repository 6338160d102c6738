use async_trait::async_trait;

use crate::domain::error::StrategyResult;
use crate::domain::models::compromise::{
    CompromiseOptions, CompromiseResult, ImpactEstimate, ImpactLevel,
};
use crate::domain::models::feature::{ConversionContext, Feature, FeatureType};

/// Port for adapting a feature that has no direct equivalent on the target
/// platform following hexagonal architecture
///
/// A strategy is consulted in three steps:
/// - `is_applicable`: cheap synchronous gate
/// - `estimate_impact`: read-only projection used for ranking
/// - `apply`: produces the modified feature
///
/// Implementations must leave the input feature untouched and report
/// failures through [`StrategyError`](crate::domain::error::StrategyError);
/// the engine turns those into fallbacks.
///
/// # Examples
///
/// ```no_run
/// use modbridge::domain::ports::CompromiseStrategy;
/// use modbridge::domain::models::{CompromiseOptions, ConversionContext, Feature};
///
/// async fn example(strategy: &dyn CompromiseStrategy, feature: &Feature, ctx: &ConversionContext) {
///     if strategy.is_applicable(feature, ctx) {
///         let estimate = strategy.estimate_impact(feature, ctx).await;
///         let result = strategy.apply(feature, ctx, &CompromiseOptions::default()).await;
///     }
/// }
/// ```
#[async_trait]
pub trait CompromiseStrategy: Send + Sync {
    /// Stable name, recorded as `strategy_used` in results
    fn name(&self) -> &str;

    /// Feature types this strategy can adapt
    fn supported_types(&self) -> &[FeatureType];

    /// Coarse impact level before looking at a concrete feature
    fn base_impact(&self) -> ImpactLevel;

    /// Whether `feature_type` is in the supported set
    fn supports(&self, feature_type: FeatureType) -> bool {
        self.supported_types().contains(&feature_type)
    }

    /// Side-effect-free applicability gate
    ///
    /// Must return `false` for any feature whose type is not supported.
    fn is_applicable(&self, feature: &Feature, context: &ConversionContext) -> bool;

    /// Estimate the impact of applying this strategy without applying it
    ///
    /// # Returns
    ///
    /// * `Ok(ImpactEstimate)` - Impact level, UX impact and confidence
    /// * `Err` - The candidate is unusable for this feature right now
    async fn estimate_impact(
        &self,
        feature: &Feature,
        context: &ConversionContext,
    ) -> StrategyResult<ImpactEstimate>;

    /// Apply the compromise, producing a modified copy of `feature`
    async fn apply(
        &self,
        feature: &Feature,
        context: &ConversionContext,
        options: &CompromiseOptions,
    ) -> StrategyResult<CompromiseResult>;
}
