//! Strategy registry.
//!
//! The [`StrategyRegistry`] maps each feature type to the ordered list of
//! strategies registered for it. Registration order is the deterministic
//! tie-break for scoring and the fallback order for first-fit selection.
//! The registry is built during setup and then shared read-only behind an
//! `Arc`, so readers need no locking.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::domain::models::feature::{ConversionContext, Feature, FeatureType};
use crate::domain::ports::CompromiseStrategy;

/// A registered strategy together with its position in the type's list.
#[derive(Clone)]
pub struct Candidate {
    pub strategy: Arc<dyn CompromiseStrategy>,
    /// Zero-based registration position for the feature type.
    pub order: usize,
}

impl std::fmt::Debug for Candidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Candidate")
            .field("strategy", &self.strategy.name())
            .field("order", &self.order)
            .finish()
    }
}

/// Multi-map from feature type to registered strategies.
#[derive(Default, Clone)]
pub struct StrategyRegistry {
    strategies: HashMap<FeatureType, Vec<Arc<dyn CompromiseStrategy>>>,
}

impl std::fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<_> = self.strategies.iter().collect();
        types.sort_by_key(|(feature_type, _)| **feature_type);
        let mut map = f.debug_map();
        for (feature_type, strategies) in types {
            let names: Vec<_> = strategies.iter().map(|s| s.name()).collect();
            map.entry(&feature_type.as_str(), &names);
        }
        map.finish()
    }
}

impl StrategyRegistry {
    /// Returns an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `strategy` to the list for `feature_type`.
    ///
    /// Duplicates are tolerated; a second registration under the same name is
    /// simply another candidate.
    pub fn register(&mut self, feature_type: FeatureType, strategy: Arc<dyn CompromiseStrategy>) {
        debug!(
            feature_type = %feature_type,
            strategy = strategy.name(),
            "registering compromise strategy"
        );
        self.strategies.entry(feature_type).or_default().push(strategy);
    }

    /// Register `strategy` under every type it declares support for.
    pub fn register_for_supported(&mut self, strategy: Arc<dyn CompromiseStrategy>) {
        let types = strategy.supported_types().to_vec();
        for feature_type in types {
            self.register(feature_type, Arc::clone(&strategy));
        }
    }

    /// Strategies registered for `feature_type`, in registration order.
    pub fn get_strategies(&self, feature_type: FeatureType) -> &[Arc<dyn CompromiseStrategy>] {
        self.strategies
            .get(&feature_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Registered strategies whose own gate accepts the feature, in
    /// registration order.
    pub fn applicable(&self, feature: &Feature, context: &ConversionContext) -> Vec<Candidate> {
        self.get_strategies(feature.feature_type)
            .iter()
            .enumerate()
            .filter(|(_, strategy)| strategy.is_applicable(feature, context))
            .map(|(order, strategy)| Candidate {
                strategy: Arc::clone(strategy),
                order,
            })
            .collect()
    }

    /// Feature types with at least one strategy, in declaration order.
    pub fn feature_types(&self) -> Vec<FeatureType> {
        let mut types: Vec<_> = self
            .strategies
            .iter()
            .filter(|(_, list)| !list.is_empty())
            .map(|(feature_type, _)| *feature_type)
            .collect();
        types.sort();
        types
    }

    /// Total number of registrations across all types.
    pub fn len(&self) -> usize {
        self.strategies.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::{StrategyError, StrategyResult};
    use crate::domain::models::compromise::{
        CompromiseOptions, CompromiseResult, ImpactEstimate, ImpactLevel,
    };
    use crate::domain::models::feature::CompatibilityTier;
    use async_trait::async_trait;

    struct Named {
        name: &'static str,
        types: Vec<FeatureType>,
        applicable: bool,
    }

    #[async_trait]
    impl CompromiseStrategy for Named {
        fn name(&self) -> &str {
            self.name
        }

        fn supported_types(&self) -> &[FeatureType] {
            &self.types
        }

        fn base_impact(&self) -> ImpactLevel {
            ImpactLevel::Low
        }

        fn is_applicable(&self, feature: &Feature, _context: &ConversionContext) -> bool {
            self.applicable && self.supports(feature.feature_type)
        }

        async fn estimate_impact(
            &self,
            _feature: &Feature,
            _context: &ConversionContext,
        ) -> StrategyResult<ImpactEstimate> {
            Ok(ImpactEstimate::new(ImpactLevel::Low, 10, 90))
        }

        async fn apply(
            &self,
            _feature: &Feature,
            _context: &ConversionContext,
            _options: &CompromiseOptions,
        ) -> StrategyResult<CompromiseResult> {
            Err(StrategyError::ApplyFailed("not used".to_string()))
        }
    }

    fn named(name: &'static str, applicable: bool) -> Arc<dyn CompromiseStrategy> {
        Arc::new(Named {
            name,
            types: vec![FeatureType::Gui, FeatureType::Hud],
            applicable,
        })
    }

    #[test]
    fn test_registration_order_preserved() {
        let mut registry = StrategyRegistry::new();
        registry.register(FeatureType::Gui, named("first", true));
        registry.register(FeatureType::Gui, named("second", true));
        registry.register(FeatureType::Gui, named("first", true));

        let names: Vec<_> = registry
            .get_strategies(FeatureType::Gui)
            .iter()
            .map(|s| s.name().to_string())
            .collect();
        assert_eq!(names, vec!["first", "second", "first"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_unregistered_type_is_empty() {
        let registry = StrategyRegistry::new();
        assert!(registry.get_strategies(FeatureType::Dimension).is_empty());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_for_supported_covers_all_types() {
        let mut registry = StrategyRegistry::new();
        registry.register_for_supported(named("ui", true));
        assert_eq!(registry.feature_types(), vec![FeatureType::Gui, FeatureType::Hud]);
    }

    #[test]
    fn test_applicable_filters_and_keeps_order() {
        let mut registry = StrategyRegistry::new();
        registry.register(FeatureType::Gui, named("skip", false));
        registry.register(FeatureType::Gui, named("keep", true));

        let feature = Feature::new("f", "F", FeatureType::Gui, CompatibilityTier::NoEquivalent);
        let context = ConversionContext::new("mod", "1.0");
        let candidates = registry.applicable(&feature, &context);

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].strategy.name(), "keep");
        assert_eq!(candidates[0].order, 1);
    }
}
