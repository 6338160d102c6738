//! Common test utilities for integration tests
//!
//! Provides scripted strategies and feature fixtures shared across the
//! engine and selector test files.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use modbridge::domain::models::{
    CompatibilityTier, CompromiseMetadata, CompromiseOptions, CompromiseResult, ConversionContext,
    Feature, FeatureType, ImpactEstimate, ImpactLevel, Replacement,
};
use modbridge::domain::models::replacement::DocumentationStub;
use modbridge::{CompromiseStrategy, StrategyError, StrategyResult};

/// Strategy with a fixed estimate and scripted failure points.
pub struct FixedStrategy {
    pub name: String,
    pub types: Vec<FeatureType>,
    pub impact: ImpactLevel,
    pub user_experience_impact: u8,
    pub confidence: u8,
    pub fail_estimate: bool,
    pub fail_apply: bool,
    applies: AtomicUsize,
}

impl FixedStrategy {
    pub fn new(name: &str, impact: ImpactLevel, confidence: u8) -> Self {
        Self {
            name: name.to_string(),
            types: vec![FeatureType::Gui],
            impact,
            user_experience_impact: *impact.score_band().start(),
            confidence,
            fail_estimate: false,
            fail_apply: false,
            applies: AtomicUsize::new(0),
        }
    }

    pub fn failing_estimate(mut self) -> Self {
        self.fail_estimate = true;
        self
    }

    pub fn failing_apply(mut self) -> Self {
        self.fail_apply = true;
        self
    }

    pub fn for_types(mut self, types: &[FeatureType]) -> Self {
        self.types = types.to_vec();
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Number of times `apply` was called.
    pub fn apply_calls(&self) -> usize {
        self.applies.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompromiseStrategy for FixedStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn supported_types(&self) -> &[FeatureType] {
        &self.types
    }

    fn base_impact(&self) -> ImpactLevel {
        self.impact
    }

    fn is_applicable(&self, feature: &Feature, _context: &ConversionContext) -> bool {
        self.supports(feature.feature_type)
    }

    async fn estimate_impact(
        &self,
        _feature: &Feature,
        _context: &ConversionContext,
    ) -> StrategyResult<ImpactEstimate> {
        if self.fail_estimate {
            return Err(StrategyError::EstimationFailed(format!("{} cannot estimate", self.name)));
        }
        Ok(ImpactEstimate::new(self.impact, self.user_experience_impact, self.confidence))
    }

    async fn apply(
        &self,
        feature: &Feature,
        _context: &ConversionContext,
        _options: &CompromiseOptions,
    ) -> StrategyResult<CompromiseResult> {
        self.applies.fetch_add(1, Ordering::SeqCst);
        if self.fail_apply {
            return Err(StrategyError::ApplyFailed(format!("{} exploded", self.name)));
        }

        let replacement = Replacement::Documentation(DocumentationStub {
            summary: format!("{} handled by {}", feature.name, self.name),
            manual_steps: Vec::new(),
            original_type: feature.feature_type,
        });
        let modified = feature.derive_replacement(&self.name, FeatureType::Other, "fixture", replacement);
        let metadata = CompromiseMetadata::new(self.name.clone(), "fixture", self.confidence, true);

        Ok(CompromiseResult::applied(
            modified,
            format!("{} applied", self.name),
            self.impact,
            self.user_experience_impact,
            metadata,
        ))
    }
}

pub fn gui_feature(id: &str) -> Feature {
    Feature::new(id, id, FeatureType::Gui, CompatibilityTier::NoEquivalent)
}

pub fn block_feature(id: &str) -> Feature {
    Feature::new(id, id, FeatureType::Block, CompatibilityTier::Direct)
}

pub fn context() -> ConversionContext {
    ConversionContext::new("fixture_mod", "1.0.0")
}
