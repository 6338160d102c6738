//! Built-in compromise strategies.
//!
//! Each strategy classifies a feature into a closed set of sub-cases. Every
//! sub-case has a fixed [`Profile`] and its own replacement generator, and
//! the classification is matched exhaustively so a new sub-case cannot be
//! added without a generator.

pub mod dimension_approximation;
pub mod rendering_simplification;
pub mod ui_fallback;

pub use dimension_approximation::{DimensionApproximationStrategy, DimensionCompromise};
pub use rendering_simplification::{RenderingCompromise, RenderingSimplificationStrategy};
pub use ui_fallback::{UiCompromise, UiFallbackStrategy};

use crate::domain::models::compromise::{ImpactEstimate, ImpactLevel};
use crate::domain::models::feature::{CompatibilityTier, Feature};
use crate::domain::models::replacement::{DocumentationStub, Replacement};

/// Confidence lost when upstream analysis could not inspect the feature.
const UNANALYZABLE_CONFIDENCE_PENALTY: u8 = 15;

/// Fixed impact profile of a strategy sub-case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Profile {
    pub impact: ImpactLevel,
    pub user_experience_impact: u8,
    pub base_confidence: u8,
    pub reversible: bool,
}

impl Profile {
    pub(crate) const fn new(
        impact: ImpactLevel,
        user_experience_impact: u8,
        base_confidence: u8,
        reversible: bool,
    ) -> Self {
        Self {
            impact,
            user_experience_impact,
            base_confidence,
            reversible,
        }
    }

    /// Confidence for a concrete feature.
    pub fn confidence_for(&self, feature: &Feature) -> u8 {
        match feature.compatibility_tier {
            CompatibilityTier::Unanalyzable => self
                .base_confidence
                .saturating_sub(UNANALYZABLE_CONFIDENCE_PENALTY),
            _ => self.base_confidence,
        }
    }

    pub fn estimate_for(&self, feature: &Feature) -> ImpactEstimate {
        ImpactEstimate::new(
            self.impact,
            self.user_experience_impact,
            self.confidence_for(feature),
        )
    }
}

/// Lowercase identifier safe for generated resource names.
pub(crate) fn slug(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut last_underscore = true;
    for ch in value.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
            last_underscore = false;
        } else if !last_underscore {
            out.push('_');
            last_underscore = true;
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    if out.is_empty() {
        out.push_str("feature");
    }
    out
}

/// Manual-conversion stub shared by every strategy family.
pub(crate) fn documentation_stub(feature: &Feature, manual_steps: Vec<String>) -> Replacement {
    let origin = feature
        .source
        .as_ref()
        .map(|s| format!(" (source: {})", s.file))
        .unwrap_or_default();

    Replacement::Documentation(DocumentationStub {
        summary: format!(
            "{} '{}' has no automatic equivalent and must be rebuilt by hand{}",
            feature.feature_type, feature.name, origin
        ),
        manual_steps,
        original_type: feature.feature_type,
    })
}

pub(crate) fn functionality_loss_warning(feature: &Feature) -> String {
    format!(
        "'{}' was replaced by documentation only; its functionality is unavailable until rebuilt manually",
        feature.name
    )
}
