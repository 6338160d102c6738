//! In-memory outcome log for compromise strategies.
//!
//! Records every apply attempt the engine makes and any feedback submitted by
//! downstream reviewers, and derives per-strategy performance on demand. The
//! log is append-only and never feeds back into ranking.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::error::EngineError;
use crate::domain::models::feedback::{
    FeedbackOutcome, StrategyFeedback, StrategyPerformance, StrategyPerformanceReport,
};

const MIN_RATING: u8 = 1;
const MAX_RATING: u8 = 5;

/// Running aggregates for one strategy name.
#[derive(Debug, Clone, Default)]
struct StrategyStats {
    uses: usize,
    successes: usize,
    failures: usize,
    avg_confidence: f64,
    feedback_count: usize,
    accepted: usize,
    rating_count: usize,
    avg_rating: f64,
}

impl StrategyStats {
    fn record_success(&mut self, confidence: u8) {
        self.uses += 1;
        self.successes += 1;

        let n = self.successes as f64;
        self.avg_confidence = (self.avg_confidence * (n - 1.0) + f64::from(confidence)) / n;
    }

    fn record_failure(&mut self) {
        self.uses += 1;
        self.failures += 1;
    }

    fn record_feedback(&mut self, feedback: &StrategyFeedback) {
        self.feedback_count += 1;
        if feedback.outcome == FeedbackOutcome::Accepted {
            self.accepted += 1;
        }
        if let Some(rating) = feedback.rating {
            self.rating_count += 1;
            let n = self.rating_count as f64;
            self.avg_rating = (self.avg_rating * (n - 1.0) + f64::from(rating)) / n;
        }
    }

    fn snapshot(&self, strategy_name: &str) -> StrategyPerformance {
        let success_rate = if self.uses > 0 {
            self.successes as f64 / self.uses as f64 * 100.0
        } else {
            0.0
        };
        let acceptance_rate = (self.feedback_count > 0)
            .then(|| self.accepted as f64 / self.feedback_count as f64 * 100.0);

        StrategyPerformance {
            strategy_name: strategy_name.to_string(),
            uses: self.uses,
            successes: self.successes,
            failures: self.failures,
            success_rate,
            average_confidence: self.avg_confidence,
            feedback_count: self.feedback_count,
            average_rating: (self.rating_count > 0).then_some(self.avg_rating),
            acceptance_rate,
        }
    }
}

#[derive(Debug, Default)]
struct LogState {
    stats: HashMap<String, StrategyStats>,
    entries: Vec<StrategyFeedback>,
}

/// Shared outcome log. Cloning yields a handle to the same log.
#[derive(Debug, Clone, Default)]
pub struct FeedbackLog {
    state: Arc<RwLock<LogState>>,
}

impl FeedbackLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one apply attempt. `confidence` is `Some` for a successful
    /// application and `None` for a failed one.
    pub async fn record_attempt(&self, strategy_name: &str, confidence: Option<u8>) {
        let mut state = self.state.write().await;
        let stats = state.stats.entry(strategy_name.to_string()).or_default();
        match confidence {
            Some(confidence) => stats.record_success(confidence),
            None => stats.record_failure(),
        }
    }

    /// Append reviewer feedback after validating it.
    pub async fn record_feedback(&self, feedback: StrategyFeedback) -> Result<(), EngineError> {
        validate_feedback(&feedback)?;

        let mut state = self.state.write().await;
        state
            .stats
            .entry(feedback.strategy_id.clone())
            .or_default()
            .record_feedback(&feedback);

        debug!(
            strategy = %feedback.strategy_id,
            feature_id = %feedback.feature_id,
            outcome = ?feedback.outcome,
            "recorded strategy feedback"
        );
        state.entries.push(feedback);
        Ok(())
    }

    /// All feedback entries in submission order.
    pub async fn entries(&self) -> Vec<StrategyFeedback> {
        self.state.read().await.entries.clone()
    }

    pub async fn report(&self) -> StrategyPerformanceReport {
        let state = self.state.read().await;
        let mut strategies: Vec<StrategyPerformance> = state
            .stats
            .iter()
            .map(|(name, stats)| stats.snapshot(name))
            .collect();
        strategies.sort_by(|a, b| a.strategy_name.cmp(&b.strategy_name));

        StrategyPerformanceReport {
            generated_at: Utc::now(),
            strategies,
        }
    }
}

fn validate_feedback(feedback: &StrategyFeedback) -> Result<(), EngineError> {
    if feedback.strategy_id.trim().is_empty() {
        return Err(EngineError::InvalidFeedback(
            "strategy_id cannot be empty".to_string(),
        ));
    }
    if feedback.feature_id.trim().is_empty() {
        return Err(EngineError::InvalidFeedback(
            "feature_id cannot be empty".to_string(),
        ));
    }
    if let Some(rating) = feedback.rating {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(EngineError::InvalidFeedback(format!(
                "rating must be between {MIN_RATING} and {MAX_RATING}, got {rating}"
            )));
        }
    }
    Ok(())
}
