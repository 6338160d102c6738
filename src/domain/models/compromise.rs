//! Compromise options, impact estimates, and results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

use super::feature::Feature;

/// Ordinal severity of a compromise: `Low < Medium < High < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl ImpactLevel {
    /// Position on the ordinal scale, 0 for `Low` through 3 for `Critical`.
    pub const fn ordinal(self) -> u8 {
        match self {
            ImpactLevel::Low => 0,
            ImpactLevel::Medium => 1,
            ImpactLevel::High => 2,
            ImpactLevel::Critical => 3,
        }
    }

    /// User-experience-impact scores belonging to this level.
    pub const fn score_band(self) -> RangeInclusive<u8> {
        match self {
            ImpactLevel::Low => 0..=30,
            ImpactLevel::Medium => 31..=60,
            ImpactLevel::High => 61..=85,
            ImpactLevel::Critical => 86..=100,
        }
    }

    /// Clamp a 0-100 score into this level's band.
    pub fn clamp_score(self, score: u8) -> u8 {
        let band = self.score_band();
        score.clamp(*band.start(), *band.end())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImpactLevel::Low => "low",
            ImpactLevel::Medium => "medium",
            ImpactLevel::High => "high",
            ImpactLevel::Critical => "critical",
        }
    }
}

impl fmt::Display for ImpactLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User-facing preference flags that steer strategy ranking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPreferences {
    pub prefer_performance: bool,
    pub prefer_compatibility: bool,
    pub prefer_visual_fidelity: bool,
    pub accept_functionality_loss: bool,
}

impl UserPreferences {
    /// Whether any preference flag is set.
    pub fn any(&self) -> bool {
        self.prefer_performance
            || self.prefer_compatibility
            || self.prefer_visual_fidelity
            || self.accept_functionality_loss
    }
}

/// Per-call options for compromise selection and application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompromiseOptions {
    /// Highest impact level the caller tolerates.
    pub max_impact_level: ImpactLevel,
    pub preferences: UserPreferences,
    pub target_platform: String,
    pub performance_constrained: bool,
    pub compatibility_mode: bool,
}

impl Default for CompromiseOptions {
    fn default() -> Self {
        Self {
            max_impact_level: ImpactLevel::High,
            preferences: UserPreferences::default(),
            target_platform: "bedrock".to_string(),
            performance_constrained: false,
            compatibility_mode: false,
        }
    }
}

impl CompromiseOptions {
    pub fn with_max_impact(mut self, level: ImpactLevel) -> Self {
        self.max_impact_level = level;
        self
    }

    pub fn with_preferences(mut self, preferences: UserPreferences) -> Self {
        self.preferences = preferences;
        self
    }

    /// Whether an impact level is within the tolerated maximum.
    pub fn tolerates(&self, level: ImpactLevel) -> bool {
        level <= self.max_impact_level
    }
}

/// Read-only projection of what applying a strategy would cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactEstimate {
    pub impact_level: ImpactLevel,
    /// 0-100, inside the band of `impact_level`.
    pub user_experience_impact: u8,
    /// 0-100.
    pub confidence: u8,
}

impl ImpactEstimate {
    /// Build an estimate, clamping the scores into their valid ranges.
    pub fn new(impact_level: ImpactLevel, user_experience_impact: u8, confidence: u8) -> Self {
        Self {
            impact_level,
            user_experience_impact: impact_level.clamp_score(user_experience_impact),
            confidence: confidence.min(100),
        }
    }
}

/// Bookkeeping attached to every compromise result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompromiseMetadata {
    pub strategy_used: String,
    /// Strategy-specific sub-case that produced the replacement.
    pub variant: String,
    /// 0-100.
    pub confidence: u8,
    pub alternatives_considered: Vec<String>,
    pub reversible: bool,
    pub applied_at: DateTime<Utc>,
}

impl CompromiseMetadata {
    pub fn new(strategy_used: impl Into<String>, variant: impl Into<String>, confidence: u8, reversible: bool) -> Self {
        Self {
            strategy_used: strategy_used.into(),
            variant: variant.into(),
            confidence: confidence.min(100),
            alternatives_considered: Vec::new(),
            reversible,
            applied_at: Utc::now(),
        }
    }
}

/// Outcome of one apply attempt. Never mutated after it is returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompromiseResult {
    pub success: bool,
    pub modified_feature: Option<Feature>,
    pub description: String,
    pub impact_level: ImpactLevel,
    /// 0-100, inside the band of `impact_level`.
    pub user_experience_impact: u8,
    pub warnings: Vec<String>,
    pub suggestions: Vec<String>,
    pub metadata: CompromiseMetadata,
}

impl CompromiseResult {
    /// A successful compromise carrying the modified feature.
    pub fn applied(
        modified_feature: Feature,
        description: impl Into<String>,
        impact_level: ImpactLevel,
        user_experience_impact: u8,
        metadata: CompromiseMetadata,
    ) -> Self {
        Self {
            success: true,
            modified_feature: Some(modified_feature),
            description: description.into(),
            impact_level,
            user_experience_impact: impact_level.clamp_score(user_experience_impact),
            warnings: Vec::new(),
            suggestions: Vec::new(),
            metadata,
        }
    }

    /// A declined compromise. Carries no modified feature.
    pub fn declined(description: impl Into<String>, impact_level: ImpactLevel, metadata: CompromiseMetadata) -> Self {
        Self {
            success: false,
            modified_feature: None,
            description: description.into(),
            impact_level,
            user_experience_impact: *impact_level.score_band().end(),
            warnings: Vec::new(),
            suggestions: Vec::new(),
            metadata,
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_suggestions<I, S>(mut self, suggestions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.suggestions.extend(suggestions.into_iter().map(Into::into));
        self
    }
}
