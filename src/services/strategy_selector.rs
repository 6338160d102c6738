//! Weighted strategy selection.
//!
//! Ranks the applicable strategies for a feature:
//! 1. **Gather**: strategies registered for the feature type whose own gate
//!    accepts the feature, in registration order.
//! 2. **Estimate**: each candidate projects its impact. A failing estimate
//!    drops only that candidate.
//! 3. **Filter**: candidates above `options.max_impact_level` are dropped.
//! 4. **Score**: `score = Σ normalized_weight_i × criterion_i` over the impact,
//!    confidence and preference-alignment criteria, each in `[0, 1]`.
//! 5. **Rank**: stable sort by descending score, so equal scores keep
//!    registration order.
//!
//! Selection performs no mutation and is safe for repeated preview calls.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::domain::error::StrategyError;
use crate::domain::models::compromise::{
    CompromiseOptions, ImpactEstimate, ImpactLevel, UserPreferences,
};
use crate::domain::models::feature::{ConversionContext, Feature};
use crate::domain::models::selection::{NormalizedWeights, SelectionCriteria};
use crate::domain::ports::CompromiseStrategy;
use crate::services::strategy_registry::StrategyRegistry;

/// Weighted contribution of each criterion to a candidate's score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub impact: f64,
    pub confidence: f64,
    pub preference: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.impact + self.confidence + self.preference
    }
}

/// A candidate that survived estimation and the impact filter.
#[derive(Clone)]
pub struct ScoredCandidate {
    pub strategy: Arc<dyn CompromiseStrategy>,
    /// Registration position for the feature type.
    pub order: usize,
    pub estimate: ImpactEstimate,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
}

impl std::fmt::Debug for ScoredCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoredCandidate")
            .field("strategy", &self.strategy.name())
            .field("order", &self.order)
            .field("estimate", &self.estimate)
            .field("score", &self.score)
            .finish()
    }
}

/// Why a candidate was dropped before scoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    EstimationFailed(StrategyError),
    ImpactExceeded { actual: ImpactLevel, max: ImpactLevel },
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectionReason::EstimationFailed(err) => write!(f, "{err}"),
            RejectionReason::ImpactExceeded { actual, max } => {
                write!(f, "estimated impact {actual} exceeds maximum {max}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRejection {
    pub strategy_name: String,
    pub reason: RejectionReason,
}

/// Full ranking for one feature, including what was dropped.
#[derive(Debug, Clone, Default)]
pub struct Ranking {
    /// Sorted by descending score, ties in registration order.
    pub ranked: Vec<ScoredCandidate>,
    pub rejected: Vec<CandidateRejection>,
    /// Applicable candidates that were estimated.
    pub evaluated: usize,
}

/// A lower-ranked candidate and why it lost.
#[derive(Clone)]
pub struct ScoredAlternative {
    pub strategy: Arc<dyn CompromiseStrategy>,
    pub score: f64,
    pub reason: String,
}

impl std::fmt::Debug for ScoredAlternative {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoredAlternative")
            .field("strategy", &self.strategy.name())
            .field("score", &self.score)
            .field("reason", &self.reason)
            .finish()
    }
}

/// Winner of a selection plus the ranked alternatives.
#[derive(Clone)]
pub struct SelectionResult {
    pub strategy: Arc<dyn CompromiseStrategy>,
    pub score: f64,
    /// Names the deciding factor.
    pub reasoning: String,
    /// Excludes the winner; sorted by descending score.
    pub alternatives: Vec<ScoredAlternative>,
    pub estimated_impact: ImpactEstimate,
}

impl std::fmt::Debug for SelectionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionResult")
            .field("strategy", &self.strategy.name())
            .field("score", &self.score)
            .field("reasoning", &self.reasoning)
            .field("alternatives", &self.alternatives)
            .field("estimated_impact", &self.estimated_impact)
            .finish()
    }
}

/// Serializable view of a [`SelectionResult`] for preview consumers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionSummary {
    pub strategy: String,
    pub score: f64,
    pub reasoning: String,
    pub estimated_impact: ImpactEstimate,
    pub alternatives: Vec<AlternativeSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlternativeSummary {
    pub strategy: String,
    pub score: f64,
    pub reason: String,
}

impl SelectionResult {
    pub fn strategy_name(&self) -> &str {
        self.strategy.name()
    }

    pub fn summary(&self) -> SelectionSummary {
        SelectionSummary {
            strategy: self.strategy.name().to_string(),
            score: self.score,
            reasoning: self.reasoning.clone(),
            estimated_impact: self.estimated_impact,
            alternatives: self
                .alternatives
                .iter()
                .map(|alt| AlternativeSummary {
                    strategy: alt.strategy.name().to_string(),
                    score: alt.score,
                    reason: alt.reason.clone(),
                })
                .collect(),
        }
    }
}

/// Ranks applicable strategies against weighted criteria.
#[derive(Debug, Clone)]
pub struct StrategySelector {
    registry: Arc<StrategyRegistry>,
}

impl StrategySelector {
    pub fn new(registry: Arc<StrategyRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<StrategyRegistry> {
        &self.registry
    }

    /// Select the best strategy for `feature`, or `None` when no candidate
    /// survives estimation and the impact filter.
    pub async fn select_strategy(
        &self,
        feature: &Feature,
        context: &ConversionContext,
        options: &CompromiseOptions,
        criteria: &SelectionCriteria,
    ) -> Option<SelectionResult> {
        let ranking = self.rank(feature, context, options, criteria).await;
        build_selection(ranking.ranked)
    }

    /// Estimate, filter, score and sort every applicable candidate.
    #[instrument(skip_all, fields(feature_id = %feature.id, feature_type = %feature.feature_type))]
    pub async fn rank(
        &self,
        feature: &Feature,
        context: &ConversionContext,
        options: &CompromiseOptions,
        criteria: &SelectionCriteria,
    ) -> Ranking {
        let candidates = self.registry.applicable(feature, context);
        let weights = criteria.normalized();
        let mut ranking = Ranking {
            evaluated: candidates.len(),
            ..Ranking::default()
        };

        for candidate in candidates {
            let name = candidate.strategy.name().to_string();

            let estimate = match candidate.strategy.estimate_impact(feature, context).await {
                Ok(estimate) => estimate,
                Err(err) => {
                    warn!(strategy = %name, error = %err, "impact estimation failed; dropping candidate");
                    ranking.rejected.push(CandidateRejection {
                        strategy_name: name,
                        reason: RejectionReason::EstimationFailed(err),
                    });
                    continue;
                }
            };

            if !options.tolerates(estimate.impact_level) {
                debug!(
                    strategy = %name,
                    impact = %estimate.impact_level,
                    max = %options.max_impact_level,
                    "candidate exceeds tolerated impact"
                );
                ranking.rejected.push(CandidateRejection {
                    strategy_name: name,
                    reason: RejectionReason::ImpactExceeded {
                        actual: estimate.impact_level,
                        max: options.max_impact_level,
                    },
                });
                continue;
            }

            let breakdown = score_estimate(&estimate, &options.preferences, &weights);
            ranking.ranked.push(ScoredCandidate {
                strategy: candidate.strategy,
                order: candidate.order,
                estimate,
                score: breakdown.total(),
                breakdown,
            });
        }

        // Stable: equal scores keep registration order.
        ranking.ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

        debug!(
            evaluated = ranking.evaluated,
            ranked = ranking.ranked.len(),
            rejected = ranking.rejected.len(),
            winner = ranking.ranked.first().map(|c| c.strategy.name()),
            "ranked compromise candidates"
        );

        ranking
    }
}

/// Turn a sorted ranking into a selection result.
pub(crate) fn build_selection(ranked: Vec<ScoredCandidate>) -> Option<SelectionResult> {
    let mut ranked = ranked.into_iter();
    let winner = ranked.next()?;
    let rest: Vec<ScoredCandidate> = ranked.collect();

    let reasoning = describe_winner(&winner, rest.first());
    let alternatives = rest
        .iter()
        .map(|alt| ScoredAlternative {
            strategy: Arc::clone(&alt.strategy),
            score: alt.score,
            reason: describe_loser(alt, &winner),
        })
        .collect();

    Some(SelectionResult {
        strategy: winner.strategy,
        score: winner.score,
        reasoning,
        alternatives,
        estimated_impact: winner.estimate,
    })
}

/// Impact criterion: 1.0 for `Low` down to 0.0 for `Critical`.
pub fn impact_value(level: ImpactLevel) -> f64 {
    1.0 - f64::from(level.ordinal()) / 3.0
}

/// Preference-alignment criterion in `[0, 1]`.
///
/// Averages one component per active preference flag; with no flags set
/// every candidate gets the same neutral 0.5.
pub fn preference_value(estimate: &ImpactEstimate, preferences: &UserPreferences) -> f64 {
    let ux_retained = 1.0 - f64::from(estimate.user_experience_impact) / 100.0;
    let confidence = f64::from(estimate.confidence) / 100.0;

    let mut components = Vec::with_capacity(4);
    if preferences.prefer_performance {
        components.push(ux_retained);
    }
    if preferences.prefer_visual_fidelity {
        components.push(impact_value(estimate.impact_level));
    }
    if preferences.prefer_compatibility {
        components.push((confidence + ux_retained) / 2.0);
    }
    if preferences.accept_functionality_loss {
        components.push(1.0);
    }

    if components.is_empty() {
        0.5
    } else {
        components.iter().sum::<f64>() / components.len() as f64
    }
}

pub(crate) fn score_estimate(
    estimate: &ImpactEstimate,
    preferences: &UserPreferences,
    weights: &NormalizedWeights,
) -> ScoreBreakdown {
    ScoreBreakdown {
        impact: weights.impact * impact_value(estimate.impact_level),
        confidence: weights.confidence * f64::from(estimate.confidence) / 100.0,
        preference: weights.preference * preference_value(estimate, preferences),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Factor {
    Impact,
    Confidence,
    Preference,
}

/// Criterion with the largest weighted margin of `a` over `b`, if any is positive.
fn largest_margin(a: &ScoreBreakdown, b: &ScoreBreakdown) -> Option<Factor> {
    [
        (Factor::Impact, a.impact - b.impact),
        (Factor::Confidence, a.confidence - b.confidence),
        (Factor::Preference, a.preference - b.preference),
    ]
    .into_iter()
    .filter(|(_, margin)| *margin > 1e-9)
    .max_by(|x, y| x.1.total_cmp(&y.1))
    .map(|(factor, _)| factor)
}

fn confidence_word(confidence: u8) -> &'static str {
    match confidence {
        80..=100 => "high",
        50..=79 => "moderate",
        _ => "low",
    }
}

fn capitalized(level: ImpactLevel) -> &'static str {
    match level {
        ImpactLevel::Low => "Low",
        ImpactLevel::Medium => "Medium",
        ImpactLevel::High => "High",
        ImpactLevel::Critical => "Critical",
    }
}

fn describe_winner(winner: &ScoredCandidate, runner_up: Option<&ScoredCandidate>) -> String {
    let profile = format!(
        "{} impact, {} confidence",
        capitalized(winner.estimate.impact_level),
        confidence_word(winner.estimate.confidence)
    );

    let Some(runner_up) = runner_up else {
        return format!("{profile}; only viable candidate");
    };

    let decided_by = match largest_margin(&winner.breakdown, &runner_up.breakdown) {
        Some(Factor::Impact) => "lower impact",
        Some(Factor::Confidence) => "higher confidence",
        Some(Factor::Preference) => "better preference alignment",
        None => "earlier registration on equal score",
    };

    format!(
        "{profile}; decided by {decided_by} over {}",
        runner_up.strategy.name()
    )
}

fn describe_loser(alt: &ScoredCandidate, winner: &ScoredCandidate) -> String {
    match largest_margin(&winner.breakdown, &alt.breakdown) {
        Some(Factor::Impact) => format!(
            "Higher impact ({} vs {})",
            alt.estimate.impact_level, winner.estimate.impact_level
        ),
        Some(Factor::Confidence) => format!(
            "Lower confidence ({} vs {})",
            alt.estimate.confidence, winner.estimate.confidence
        ),
        Some(Factor::Preference) => "Weaker alignment with user preferences".to_string(),
        None => "Equal score; registered later".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::StrategyResult;
    use crate::domain::models::compromise::CompromiseResult;
    use crate::domain::models::feature::{CompatibilityTier, FeatureType};
    use async_trait::async_trait;

    struct Fixed {
        name: &'static str,
        estimate: Option<ImpactEstimate>,
    }

    #[async_trait]
    impl CompromiseStrategy for Fixed {
        fn name(&self) -> &str {
            self.name
        }

        fn supported_types(&self) -> &[FeatureType] {
            &[FeatureType::Gui]
        }

        fn base_impact(&self) -> ImpactLevel {
            ImpactLevel::Medium
        }

        fn is_applicable(&self, feature: &Feature, _context: &ConversionContext) -> bool {
            self.supports(feature.feature_type)
        }

        async fn estimate_impact(
            &self,
            _feature: &Feature,
            _context: &ConversionContext,
        ) -> StrategyResult<ImpactEstimate> {
            self.estimate
                .ok_or_else(|| StrategyError::EstimationFailed("boom".to_string()))
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

    fn selector(strategies: Vec<Fixed>) -> StrategySelector {
        let mut registry = StrategyRegistry::new();
        for strategy in strategies {
            registry.register(FeatureType::Gui, Arc::new(strategy));
        }
        StrategySelector::new(Arc::new(registry))
    }

    fn gui_feature() -> Feature {
        Feature::new("screen", "Screen", FeatureType::Gui, CompatibilityTier::NoEquivalent)
    }

    fn low() -> Fixed {
        Fixed {
            name: "low",
            estimate: Some(ImpactEstimate::new(ImpactLevel::Low, 20, 90)),
        }
    }

    fn high() -> Fixed {
        Fixed {
            name: "high",
            estimate: Some(ImpactEstimate::new(ImpactLevel::High, 70, 70)),
        }
    }

    #[test]
    fn test_impact_value_monotonic() {
        assert!(impact_value(ImpactLevel::Low) > impact_value(ImpactLevel::Medium));
        assert!(impact_value(ImpactLevel::Medium) > impact_value(ImpactLevel::High));
        assert!(impact_value(ImpactLevel::High) > impact_value(ImpactLevel::Critical));
        assert!(impact_value(ImpactLevel::Critical).abs() < f64::EPSILON);
    }

    #[test]
    fn test_preference_value_rewards_low_ux_impact_for_performance() {
        let prefs = UserPreferences {
            prefer_performance: true,
            ..UserPreferences::default()
        };
        let light = ImpactEstimate::new(ImpactLevel::Medium, 35, 60);
        let heavy = ImpactEstimate::new(ImpactLevel::Medium, 60, 60);
        assert!(preference_value(&light, &prefs) > preference_value(&heavy, &prefs));
        assert!((preference_value(&light, &UserPreferences::default()) - 0.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_low_impact_wins() {
        let selector = selector(vec![high(), low()]);
        let options = CompromiseOptions::default().with_max_impact(ImpactLevel::High);
        let result = selector
            .select_strategy(&gui_feature(), &ConversionContext::new("m", "1"), &options, &SelectionCriteria::default())
            .await
            .expect("a candidate should be selected");

        assert_eq!(result.strategy_name(), "low");
        assert_eq!(result.alternatives.len(), 1);
        assert_eq!(result.alternatives[0].strategy.name(), "high");
        assert!(result.score > result.alternatives[0].score);
        assert!(result.reasoning.starts_with("Low impact, high confidence"));
        assert!(result.alternatives[0].reason.starts_with("Higher impact"));
    }

    #[tokio::test]
    async fn test_impact_filter_excludes_candidates() {
        let selector = selector(vec![low(), high()]);
        let options = CompromiseOptions::default().with_max_impact(ImpactLevel::Medium);
        let ranking = selector
            .rank(&gui_feature(), &ConversionContext::new("m", "1"), &options, &SelectionCriteria::default())
            .await;

        assert_eq!(ranking.evaluated, 2);
        assert_eq!(ranking.ranked.len(), 1);
        assert_eq!(ranking.rejected[0].strategy_name, "high");
        assert!(matches!(
            ranking.rejected[0].reason,
            RejectionReason::ImpactExceeded { actual: ImpactLevel::High, max: ImpactLevel::Medium }
        ));
    }

    #[tokio::test]
    async fn test_failing_estimate_yields_none() {
        let selector = selector(vec![Fixed { name: "failing", estimate: None }]);
        let result = selector
            .select_strategy(
                &gui_feature(),
                &ConversionContext::new("m", "1"),
                &CompromiseOptions::default(),
                &SelectionCriteria::default(),
            )
            .await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_equal_scores_keep_registration_order() {
        let twin = |name| Fixed {
            name,
            estimate: Some(ImpactEstimate::new(ImpactLevel::Medium, 40, 75)),
        };
        let selector = selector(vec![twin("first"), twin("second")]);
        let result = selector
            .select_strategy(
                &gui_feature(),
                &ConversionContext::new("m", "1"),
                &CompromiseOptions::default(),
                &SelectionCriteria::default(),
            )
            .await
            .expect("selection");

        assert_eq!(result.strategy_name(), "first");
        assert!(result.reasoning.contains("earlier registration"));
        assert_eq!(result.alternatives[0].reason, "Equal score; registered later");
    }

    #[tokio::test]
    async fn test_unnormalized_weights_rank_like_normalized() {
        let selector = selector(vec![high(), low()]);
        let context = ConversionContext::new("m", "1");
        let options = CompromiseOptions::default();

        let scaled = selector
            .select_strategy(&gui_feature(), &context, &options, &SelectionCriteria::new(4.0, 3.5, 2.5))
            .await
            .expect("selection");
        let unit = selector
            .select_strategy(&gui_feature(), &context, &options, &SelectionCriteria::default())
            .await
            .expect("selection");

        assert_eq!(scaled.strategy_name(), unit.strategy_name());
        assert!((scaled.score - unit.score).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_confidence_only_weights_prefer_confident_candidate() {
        let confident_high = Fixed {
            name: "confident",
            estimate: Some(ImpactEstimate::new(ImpactLevel::High, 65, 95)),
        };
        let unsure_low = Fixed {
            name: "unsure",
            estimate: Some(ImpactEstimate::new(ImpactLevel::Low, 10, 40)),
        };
        let selector = selector(vec![unsure_low, confident_high]);
        let result = selector
            .select_strategy(
                &gui_feature(),
                &ConversionContext::new("m", "1"),
                &CompromiseOptions::default(),
                &SelectionCriteria::new(0.0, 1.0, 0.0),
            )
            .await
            .expect("selection");

        assert_eq!(result.strategy_name(), "confident");
        assert!(result.reasoning.contains("higher confidence"));
    }
}
