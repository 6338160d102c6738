//! Outcome feedback and per-strategy performance aggregates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Verdict of a downstream reviewer on an applied compromise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackOutcome {
    Accepted,
    NeedsRevision,
    Rejected,
}

/// Feedback on one strategy's result for one feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyFeedback {
    /// Name of the strategy the feedback is about.
    pub strategy_id: String,
    pub feature_id: String,
    pub outcome: FeedbackOutcome,
    /// Optional 1-5 rating.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default = "Utc::now")]
    pub submitted_at: DateTime<Utc>,
}

impl StrategyFeedback {
    pub fn new(
        strategy_id: impl Into<String>,
        feature_id: impl Into<String>,
        outcome: FeedbackOutcome,
    ) -> Self {
        Self {
            strategy_id: strategy_id.into(),
            feature_id: feature_id.into(),
            outcome,
            rating: None,
            comment: None,
            submitted_at: Utc::now(),
        }
    }

    pub fn with_rating(mut self, rating: u8) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// Aggregate usage and feedback for one strategy name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyPerformance {
    pub strategy_name: String,
    /// Apply attempts, successful or not.
    pub uses: usize,
    pub successes: usize,
    pub failures: usize,
    /// Successful applications over total attempts, 0-100.
    pub success_rate: f64,
    /// Mean confidence of successful applications, 0-100.
    pub average_confidence: f64,
    pub feedback_count: usize,
    /// Mean 1-5 rating over feedback entries that carry one.
    pub average_rating: Option<f64>,
    /// Accepted feedback over all feedback, 0-100.
    pub acceptance_rate: Option<f64>,
}

/// Read-only snapshot of all strategy aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyPerformanceReport {
    pub generated_at: DateTime<Utc>,
    /// Sorted by strategy name.
    pub strategies: Vec<StrategyPerformance>,
}

impl StrategyPerformanceReport {
    pub fn get(&self, strategy_name: &str) -> Option<&StrategyPerformance> {
        self.strategies
            .iter()
            .find(|s| s.strategy_name == strategy_name)
    }
}
