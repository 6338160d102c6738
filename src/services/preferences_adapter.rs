//! Translates user-facing strategy preferences into registry entries.
//!
//! Each enabled strategy family is registered with its typed settings. When
//! features are excluded by id or name, every strategy is wrapped in a
//! [`GatedStrategy`] so the exclusion is enforced at the applicability gate
//! and excluded features end up with no strategy at all.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::error::StrategyResult;
use crate::domain::models::compromise::{
    CompromiseOptions, CompromiseResult, ImpactEstimate, ImpactLevel,
};
use crate::domain::models::config::StrategyPreferences;
use crate::domain::models::feature::{ConversionContext, Feature, FeatureType};
use crate::domain::models::selection::SelectionCriteria;
use crate::domain::ports::CompromiseStrategy;
use crate::services::strategies::{
    DimensionApproximationStrategy, RenderingSimplificationStrategy, UiFallbackStrategy,
};
use crate::services::strategy_registry::StrategyRegistry;

/// Wraps a strategy with an extra applicability predicate that rejects
/// excluded features.
pub struct GatedStrategy {
    inner: Arc<dyn CompromiseStrategy>,
    excluded: Arc<HashSet<String>>,
}

impl GatedStrategy {
    pub fn new(inner: Arc<dyn CompromiseStrategy>, excluded: Arc<HashSet<String>>) -> Self {
        Self { inner, excluded }
    }

    fn is_excluded(&self, feature: &Feature) -> bool {
        self.excluded.contains(&feature.id) || self.excluded.contains(&feature.name)
    }
}

impl std::fmt::Debug for GatedStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatedStrategy")
            .field("inner", &self.inner.name())
            .field("excluded", &self.excluded.len())
            .finish()
    }
}

#[async_trait]
impl CompromiseStrategy for GatedStrategy {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn supported_types(&self) -> &[FeatureType] {
        self.inner.supported_types()
    }

    fn base_impact(&self) -> ImpactLevel {
        self.inner.base_impact()
    }

    fn is_applicable(&self, feature: &Feature, context: &ConversionContext) -> bool {
        !self.is_excluded(feature) && self.inner.is_applicable(feature, context)
    }

    async fn estimate_impact(
        &self,
        feature: &Feature,
        context: &ConversionContext,
    ) -> StrategyResult<ImpactEstimate> {
        self.inner.estimate_impact(feature, context).await
    }

    async fn apply(
        &self,
        feature: &Feature,
        context: &ConversionContext,
        options: &CompromiseOptions,
    ) -> StrategyResult<CompromiseResult> {
        self.inner.apply(feature, context, options).await
    }
}

/// Builds registries and selection criteria from configuration.
#[derive(Debug, Clone, Default)]
pub struct PreferencesAdapter {
    preferences: StrategyPreferences,
    criteria: SelectionCriteria,
}

impl PreferencesAdapter {
    pub fn new(preferences: StrategyPreferences) -> Self {
        Self {
            preferences,
            criteria: SelectionCriteria::default(),
        }
    }

    pub fn with_criteria(mut self, criteria: SelectionCriteria) -> Self {
        self.criteria = criteria;
        self
    }

    pub fn preferences(&self) -> &StrategyPreferences {
        &self.preferences
    }

    /// Selection weights to pass to the engine.
    pub fn criteria(&self) -> SelectionCriteria {
        self.criteria
    }

    /// The enabled built-in strategies, ungated, in registration order.
    pub fn strategies(&self) -> Vec<Arc<dyn CompromiseStrategy>> {
        let mut strategies: Vec<Arc<dyn CompromiseStrategy>> = Vec::with_capacity(3);
        if self.preferences.ui.enabled {
            strategies.push(Arc::new(UiFallbackStrategy::new(self.preferences.ui.clone())));
        }
        if self.preferences.rendering.enabled {
            strategies.push(Arc::new(RenderingSimplificationStrategy::new(
                self.preferences.rendering.clone(),
            )));
        }
        if self.preferences.dimension.enabled {
            strategies.push(Arc::new(DimensionApproximationStrategy::new(
                self.preferences.dimension.clone(),
            )));
        }
        strategies
    }

    /// Wrap `strategy` in the exclusion gate when any feature is excluded.
    pub fn gate(&self, strategy: Arc<dyn CompromiseStrategy>) -> Arc<dyn CompromiseStrategy> {
        if self.preferences.excluded_features.is_empty() {
            return strategy;
        }
        let excluded: HashSet<String> = self.preferences.excluded_features.iter().cloned().collect();
        Arc::new(GatedStrategy::new(strategy, Arc::new(excluded)))
    }

    /// Register every enabled family under the types it supports.
    pub fn build_registry(&self) -> StrategyRegistry {
        let mut registry = StrategyRegistry::new();
        self.register_into(&mut registry);
        registry
    }

    pub fn register_into(&self, registry: &mut StrategyRegistry) {
        for strategy in self.strategies() {
            registry.register_for_supported(self.gate(strategy));
        }
    }
}
