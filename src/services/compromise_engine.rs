//! Compromise engine.
//!
//! Drives one feature at a time through
//! `need check -> candidate gathering -> apply with fallback`, ending in one of
//! the terminal states of [`ProcessingStatus`]. Strategy failures are absorbed
//! here: every call returns a structured [`FeatureProcessingResult`] or
//! [`BatchReport`] and never an error.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::domain::error::{EngineError, StrategyError, StrategyResult};
use crate::domain::models::compromise::{CompromiseOptions, CompromiseResult};
use crate::domain::models::config::{Config, EngineConfig};
use crate::domain::models::feature::{ConversionContext, Feature, FeatureType};
use crate::domain::models::feedback::{StrategyFeedback, StrategyPerformanceReport};
use crate::domain::models::processing::{
    BatchReport, BatchStatistics, FeatureProcessingResult, ProcessingStatus,
    NO_APPLICABLE_STRATEGY,
};
use crate::domain::models::selection::SelectionCriteria;
use crate::domain::ports::CompromiseStrategy;
use crate::services::feedback_log::FeedbackLog;
use crate::services::guide::render_guide;
use crate::services::preferences_adapter::PreferencesAdapter;
use crate::services::strategy_registry::StrategyRegistry;
use crate::services::strategy_selector::{
    CandidateRejection, RejectionReason, SelectionResult, StrategySelector,
};

/// Builder for [`CompromiseEngine`].
///
/// Registration order in the final registry is: the explicit registry (or the
/// default strategy set when auto-registration is on), then every strategy
/// added with [`with_strategy`](Self::with_strategy) in call order.
#[derive(Default)]
pub struct CompromiseEngineBuilder {
    config: EngineConfig,
    registry: Option<StrategyRegistry>,
    preferences: Option<PreferencesAdapter>,
    custom: Vec<(Option<FeatureType>, Arc<dyn CompromiseStrategy>)>,
    criteria: Option<SelectionCriteria>,
    feedback: Option<FeedbackLog>,
}

impl CompromiseEngineBuilder {
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Start from an explicit registry instead of the default strategy set.
    pub fn with_registry(mut self, registry: StrategyRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Preferences used for the default strategy set.
    pub fn with_preferences(mut self, preferences: PreferencesAdapter) -> Self {
        self.preferences = Some(preferences);
        self
    }

    /// Add a strategy under every type it supports.
    pub fn with_strategy(mut self, strategy: Arc<dyn CompromiseStrategy>) -> Self {
        self.custom.push((None, strategy));
        self
    }

    /// Add a strategy under one feature type only.
    pub fn with_strategy_for(
        mut self,
        feature_type: FeatureType,
        strategy: Arc<dyn CompromiseStrategy>,
    ) -> Self {
        self.custom.push((Some(feature_type), strategy));
        self
    }

    pub fn with_criteria(mut self, criteria: SelectionCriteria) -> Self {
        self.criteria = Some(criteria);
        self
    }

    /// Share an existing feedback log with the engine.
    pub fn with_feedback_log(mut self, feedback: FeedbackLog) -> Self {
        self.feedback = Some(feedback);
        self
    }

    pub fn build(self) -> Result<CompromiseEngine, EngineError> {
        validate_engine_config(&self.config)?;

        let preferences = self.preferences.unwrap_or_default();
        let mut registry = match self.registry {
            Some(registry) => registry,
            None if self.config.auto_register_strategies => preferences.build_registry(),
            None => StrategyRegistry::new(),
        };
        for (feature_type, strategy) in self.custom {
            match feature_type {
                Some(feature_type) => registry.register(feature_type, strategy),
                None => registry.register_for_supported(strategy),
            }
        }

        let criteria = self.criteria.unwrap_or_else(|| preferences.criteria());
        let registry = Arc::new(registry);

        debug!(
            registrations = registry.len(),
            max_attempts = self.config.max_attempts,
            scored_selection = self.config.scored_selection,
            "compromise engine built"
        );

        Ok(CompromiseEngine {
            selector: StrategySelector::new(Arc::clone(&registry)),
            registry,
            criteria,
            config: self.config,
            feedback: self.feedback.unwrap_or_default(),
        })
    }
}

fn validate_engine_config(config: &EngineConfig) -> Result<(), EngineError> {
    if config.max_attempts == 0 {
        return Err(EngineError::InvalidConfiguration(
            "max_attempts must be at least 1".to_string(),
        ));
    }
    if config.batch_concurrency == 0 {
        return Err(EngineError::InvalidConfiguration(
            "batch_concurrency must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Orchestrates selection, application and fallback for incompatible
/// features.
#[derive(Debug, Clone)]
pub struct CompromiseEngine {
    config: EngineConfig,
    registry: Arc<StrategyRegistry>,
    selector: StrategySelector,
    criteria: SelectionCriteria,
    feedback: FeedbackLog,
}

/// Candidates to try, in order, plus what was dropped before application.
struct CandidatePlan {
    chain: Vec<Arc<dyn CompromiseStrategy>>,
    considered: usize,
    rejected: Vec<CandidateRejection>,
}

impl CompromiseEngine {
    pub fn builder() -> CompromiseEngineBuilder {
        CompromiseEngineBuilder::default()
    }

    /// Engine with the default strategy set (when enabled) and default criteria.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        Self::builder().config(config).build()
    }

    /// Engine configured from a loaded [`Config`].
    pub fn from_config(config: &Config) -> Result<Self, EngineError> {
        let preferences =
            PreferencesAdapter::new(config.strategies.clone()).with_criteria(config.selection);
        Self::builder()
            .config(config.engine.clone())
            .with_preferences(preferences)
            .build()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    pub fn selector(&self) -> &StrategySelector {
        &self.selector
    }

    pub fn criteria(&self) -> &SelectionCriteria {
        &self.criteria
    }

    pub fn feedback_log(&self) -> &FeedbackLog {
        &self.feedback
    }

    /// Process one feature with the engine's default criteria.
    pub async fn process_feature(
        &self,
        feature: &Feature,
        context: &ConversionContext,
        options: &CompromiseOptions,
    ) -> FeatureProcessingResult {
        self.process_feature_with(feature, context, options, &self.criteria)
            .await
    }

    /// Process one feature with caller-supplied criteria.
    #[instrument(skip_all, fields(feature_id = %feature.id, feature_type = %feature.feature_type))]
    pub async fn process_feature_with(
        &self,
        feature: &Feature,
        context: &ConversionContext,
        options: &CompromiseOptions,
        criteria: &SelectionCriteria,
    ) -> FeatureProcessingResult {
        let started = Instant::now();

        if !feature.needs_compromise() {
            debug!("feature does not need a compromise");
            let mut result = FeatureProcessingResult::new(&feature.id, ProcessingStatus::NotNeeded);
            result.metadata.processing_time_ms = elapsed_ms(started);
            return result;
        }

        let plan = self.plan(feature, context, options, criteria).await;
        let mut result = if plan.chain.is_empty() {
            no_strategy_result(feature, &plan)
        } else {
            self.apply_with_fallback(feature, context, options, &plan).await
        };
        result.metadata.strategies_considered = plan.considered;
        result.metadata.processing_time_ms = elapsed_ms(started);

        info!(
            status = result.status.as_str(),
            strategy = result.strategy_used(),
            attempts = result.metadata.attempts,
            fallback_used = result.metadata.fallback_used,
            "feature processed"
        );
        result
    }

    /// Gather candidates, ranked by the selector or in registration order.
    async fn plan(
        &self,
        feature: &Feature,
        context: &ConversionContext,
        options: &CompromiseOptions,
        criteria: &SelectionCriteria,
    ) -> CandidatePlan {
        if self.config.scored_selection {
            let ranking = self.selector.rank(feature, context, options, criteria).await;
            CandidatePlan {
                chain: ranking.ranked.into_iter().map(|c| c.strategy).collect(),
                considered: ranking.evaluated,
                rejected: ranking.rejected,
            }
        } else {
            let chain: Vec<_> = self
                .registry
                .applicable(feature, context)
                .into_iter()
                .map(|c| c.strategy)
                .collect();
            CandidatePlan {
                considered: chain.len(),
                chain,
                rejected: Vec::new(),
            }
        }
    }

    async fn apply_with_fallback(
        &self,
        feature: &Feature,
        context: &ConversionContext,
        options: &CompromiseOptions,
        plan: &CandidatePlan,
    ) -> FeatureProcessingResult {
        let mut failures: Vec<String> = Vec::new();
        let mut attempts = 0;

        for strategy in plan.chain.iter().take(self.config.max_attempts) {
            attempts += 1;
            let name = strategy.name();

            match self.apply_once(strategy.as_ref(), feature, context, options).await {
                Ok(compromise) if compromise.success => {
                    self.feedback
                        .record_attempt(name, Some(compromise.metadata.confidence))
                        .await;
                    return compromised_result(feature, plan, compromise, name, attempts, failures);
                }
                Ok(declined) => {
                    warn!(strategy = name, reason = %declined.description, "strategy declined the feature; falling back");
                    self.feedback.record_attempt(name, None).await;
                    failures.push(format!("Strategy '{name}' failed: {}", declined.description));
                }
                Err(err) => {
                    warn!(strategy = name, error = %err, "strategy application failed; falling back");
                    self.feedback.record_attempt(name, None).await;
                    failures.push(format!("Strategy '{name}' failed: {err}"));
                }
            }
        }

        let mut result = FeatureProcessingResult::new(&feature.id, ProcessingStatus::Failed);
        result.metadata.attempts = attempts;
        result.metadata.fallback_used = attempts > 1;
        result.errors = failures;

        let untried = plan.chain.len().saturating_sub(attempts);
        if untried > 0 {
            result.warnings.push(format!(
                "Fallback chain stopped after {attempts} attempt(s); {untried} candidate(s) were not tried"
            ));
            result
                .suggestions
                .push("Raise max_attempts to let more strategies try this feature".to_string());
        }
        result.suggestions.push(format!(
            "Convert {} '{}' manually; every applicable strategy failed",
            feature.feature_type, feature.name
        ));
        result
    }

    async fn apply_once(
        &self,
        strategy: &dyn CompromiseStrategy,
        feature: &Feature,
        context: &ConversionContext,
        options: &CompromiseOptions,
    ) -> StrategyResult<CompromiseResult> {
        let attempt = strategy.apply(feature, context, options);
        match self.config.apply_timeout_ms {
            Some(ms) => tokio::time::timeout(Duration::from_millis(ms), attempt)
                .await
                .unwrap_or_else(|_| Err(StrategyError::TimedOut(ms))),
            None => attempt.await,
        }
    }

    /// Process every feature in input order, one at a time.
    pub async fn process_batch(
        &self,
        features: &[Feature],
        context: &ConversionContext,
        options: &CompromiseOptions,
    ) -> BatchReport {
        let mut results = Vec::with_capacity(features.len());
        for feature in features {
            results.push(self.process_feature(feature, context, options).await);
        }
        self.finish_batch(context, results)
    }

    /// Process up to `batch_concurrency` features at once. Results keep input
    /// order.
    pub async fn process_batch_concurrent(
        &self,
        features: &[Feature],
        context: &ConversionContext,
        options: &CompromiseOptions,
    ) -> BatchReport {
        let results: Vec<FeatureProcessingResult> = stream::iter(features)
            .map(|feature| self.process_feature(feature, context, options))
            .buffered(self.config.batch_concurrency)
            .collect()
            .await;
        self.finish_batch(context, results)
    }

    fn finish_batch(
        &self,
        context: &ConversionContext,
        results: Vec<FeatureProcessingResult>,
    ) -> BatchReport {
        let statistics = batch_statistics(&results);
        let guide = self
            .config
            .generate_reports
            .then(|| render_guide(context, &results, &statistics));

        info!(
            mod_id = %context.mod_id,
            total = statistics.total_features,
            applied = statistics.compromises_applied,
            failed = statistics.failed,
            success_rate = statistics.success_rate,
            "batch processed"
        );

        BatchReport {
            id: Uuid::new_v4(),
            results,
            statistics,
            guide,
        }
    }

    /// Which strategy would be chosen, without applying anything.
    pub async fn preview(
        &self,
        feature: &Feature,
        context: &ConversionContext,
        options: &CompromiseOptions,
        criteria: Option<&SelectionCriteria>,
    ) -> Option<SelectionResult> {
        self.selector
            .select_strategy(feature, context, options, criteria.unwrap_or(&self.criteria))
            .await
    }

    pub async fn collect_feedback(&self, feedback: StrategyFeedback) -> Result<(), EngineError> {
        self.feedback.record_feedback(feedback).await
    }

    pub async fn performance_report(&self) -> StrategyPerformanceReport {
        self.feedback.report().await
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn no_strategy_result(feature: &Feature, plan: &CandidatePlan) -> FeatureProcessingResult {
    let mut result = FeatureProcessingResult::new(&feature.id, ProcessingStatus::NoStrategy);
    result.errors.push(NO_APPLICABLE_STRATEGY.to_string());

    let mut too_impactful = Vec::new();
    for rejection in &plan.rejected {
        match &rejection.reason {
            RejectionReason::ImpactExceeded { actual, max } => too_impactful.push(format!(
                "{} ({actual} > {max})",
                rejection.strategy_name
            )),
            RejectionReason::EstimationFailed(err) => result.warnings.push(format!(
                "Strategy '{}' could not estimate impact: {err}",
                rejection.strategy_name
            )),
        }
    }

    if !too_impactful.is_empty() {
        result.suggestions.push(format!(
            "Raise max_impact_level to allow: {}",
            too_impactful.join(", ")
        ));
    }
    if plan.considered == 0 {
        result.suggestions.push(format!(
            "Register or enable a strategy for feature type '{}', or convert '{}' manually",
            feature.feature_type, feature.name
        ));
    }
    result
}

fn compromised_result(
    feature: &Feature,
    plan: &CandidatePlan,
    mut compromise: CompromiseResult,
    strategy_name: &str,
    attempts: usize,
    failures: Vec<String>,
) -> FeatureProcessingResult {
    compromise.metadata.strategy_used = strategy_name.to_string();
    let winner = attempts.saturating_sub(1);
    compromise.metadata.alternatives_considered = plan
        .chain
        .iter()
        .enumerate()
        .filter(|(index, _)| *index != winner)
        .map(|(_, s)| s.name().to_string())
        .collect();

    let mut result = FeatureProcessingResult::new(&feature.id, ProcessingStatus::Compromised);
    result.compromise_applied = true;
    result.metadata.attempts = attempts;
    result.metadata.fallback_used = attempts > 1;
    result.warnings = failures;
    result.warnings.extend(compromise.warnings.iter().cloned());
    result.suggestions.clone_from(&compromise.suggestions);
    result.compromise_result = Some(compromise);
    result
}

/// Aggregate counts for a finished batch.
pub fn batch_statistics(results: &[FeatureProcessingResult]) -> BatchStatistics {
    let total_features = results.len();
    let compromises_applied = results.iter().filter(|r| r.compromise_applied).count();
    let success_rate = if total_features > 0 {
        compromises_applied as f64 / total_features as f64 * 100.0
    } else {
        0.0
    };

    let mut strategy_usage = std::collections::BTreeMap::new();
    for name in results.iter().filter_map(FeatureProcessingResult::strategy_used) {
        *strategy_usage.entry(name.to_string()).or_insert(0) += 1;
    }

    BatchStatistics {
        total_features,
        compromises_applied,
        success_rate,
        not_needed: results
            .iter()
            .filter(|r| r.status == ProcessingStatus::NotNeeded)
            .count(),
        failed: results
            .iter()
            .filter(|r| matches!(r.status, ProcessingStatus::Failed | ProcessingStatus::NoStrategy))
            .count(),
        strategy_usage,
        common_issues: common_issues(results),
    }
}

/// Error messages seen in more than one feature, most frequent first.
fn common_issues(results: &[FeatureProcessingResult]) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for result in results {
        let mut seen: Vec<&str> = result.errors.iter().map(String::as_str).collect();
        seen.sort_unstable();
        seen.dedup();
        for message in seen {
            *counts.entry(message).or_insert(0) += 1;
        }
    }

    let mut recurring: Vec<(&str, usize)> = counts.into_iter().filter(|(_, n)| *n > 1).collect();
    recurring.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    recurring
        .into_iter()
        .map(|(message, n)| format!("{message} ({n} features)"))
        .collect()
}
