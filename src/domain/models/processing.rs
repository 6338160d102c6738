//! Per-feature and per-batch processing outcomes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::compromise::CompromiseResult;

/// Error reported when no registered strategy can handle a feature.
pub const NO_APPLICABLE_STRATEGY: &str = "No applicable compromise strategy found";

/// Terminal state of one feature's pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    Compromised,
    NotNeeded,
    NoStrategy,
    Failed,
}

impl ProcessingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingStatus::Compromised => "compromised",
            ProcessingStatus::NotNeeded => "not-needed",
            ProcessingStatus::NoStrategy => "no-strategy",
            ProcessingStatus::Failed => "failed",
        }
    }
}

/// Timing and fallback bookkeeping for one feature.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingMetadata {
    /// Applicable candidates evaluated for the feature.
    pub strategies_considered: usize,
    /// Apply attempts made.
    pub attempts: usize,
    pub fallback_used: bool,
    pub processing_time_ms: u64,
}

/// Structured outcome of processing one feature. The engine always returns one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureProcessingResult {
    pub feature_id: String,
    pub status: ProcessingStatus,
    pub compromise_applied: bool,
    pub compromise_result: Option<CompromiseResult>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub suggestions: Vec<String>,
    pub metadata: ProcessingMetadata,
}

impl FeatureProcessingResult {
    pub(crate) fn new(feature_id: impl Into<String>, status: ProcessingStatus) -> Self {
        Self {
            feature_id: feature_id.into(),
            status,
            compromise_applied: false,
            compromise_result: None,
            errors: Vec::new(),
            warnings: Vec::new(),
            suggestions: Vec::new(),
            metadata: ProcessingMetadata::default(),
        }
    }

    /// Name of the strategy whose result was kept, if any.
    pub fn strategy_used(&self) -> Option<&str> {
        self.compromise_result
            .as_ref()
            .map(|r| r.metadata.strategy_used.as_str())
    }
}

/// Aggregate counts over one batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchStatistics {
    pub total_features: usize,
    pub compromises_applied: usize,
    /// `compromises_applied / total_features * 100`; 0 for an empty batch.
    pub success_rate: f64,
    pub not_needed: usize,
    pub failed: usize,
    /// Strategy name to number of features it was used for.
    pub strategy_usage: BTreeMap<String, usize>,
    /// Error messages seen in more than one feature, most frequent first.
    pub common_issues: Vec<String>,
}

/// Everything produced by one batch call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub id: Uuid,
    /// In input order.
    pub results: Vec<FeatureProcessingResult>,
    pub statistics: BatchStatistics,
    /// Markdown post-processing guide, when report generation is enabled.
    pub guide: Option<String>,
}
