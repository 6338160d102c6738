//! Weighted criteria used to rank competing strategies.

use serde::{Deserialize, Serialize};

/// Named criterion weights.
///
/// Weights need not sum to 1; [`SelectionCriteria::normalized`] rescales
/// them before scoring. Negative or non-finite weights count as zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionCriteria {
    /// Rewards lower estimated impact levels.
    pub impact_weight: f64,
    /// Rewards higher estimation confidence.
    pub confidence_weight: f64,
    /// Rewards alignment with the caller's user preferences.
    pub preference_weight: f64,
}

impl Default for SelectionCriteria {
    fn default() -> Self {
        Self {
            impact_weight: 0.4,
            confidence_weight: 0.35,
            preference_weight: 0.25,
        }
    }
}

/// Criterion weights rescaled to sum to 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedWeights {
    pub impact: f64,
    pub confidence: f64,
    pub preference: f64,
}

impl SelectionCriteria {
    pub fn new(impact_weight: f64, confidence_weight: f64, preference_weight: f64) -> Self {
        Self {
            impact_weight,
            confidence_weight,
            preference_weight,
        }
    }

    /// Weights rescaled to sum to 1. All-zero weights become uniform.
    pub fn normalized(&self) -> NormalizedWeights {
        let impact = sanitize(self.impact_weight);
        let confidence = sanitize(self.confidence_weight);
        let preference = sanitize(self.preference_weight);
        let total = impact + confidence + preference;

        if total <= f64::EPSILON {
            let third = 1.0 / 3.0;
            return NormalizedWeights {
                impact: third,
                confidence: third,
                preference: third,
            };
        }

        NormalizedWeights {
            impact: impact / total,
            confidence: confidence / total,
            preference: preference / total,
        }
    }

    /// Names of weights that are negative or not finite.
    pub fn invalid_weights(&self) -> Vec<&'static str> {
        [
            ("impact_weight", self.impact_weight),
            ("confidence_weight", self.confidence_weight),
            ("preference_weight", self.preference_weight),
        ]
        .into_iter()
        .filter(|(_, weight)| !weight.is_finite() || *weight < 0.0)
        .map(|(name, _)| name)
        .collect()
    }
}

fn sanitize(weight: f64) -> f64 {
    if weight.is_finite() && weight > 0.0 {
        weight
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_sums_to_one() {
        let weights = SelectionCriteria::new(2.0, 1.0, 1.0).normalized();
        assert!((weights.impact - 0.5).abs() < f64::EPSILON);
        assert!((weights.confidence - 0.25).abs() < f64::EPSILON);
        assert!((weights.impact + weights.confidence + weights.preference - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_weights_become_uniform() {
        let weights = SelectionCriteria::new(0.0, 0.0, 0.0).normalized();
        assert!((weights.impact - weights.preference).abs() < f64::EPSILON);
        assert!((weights.confidence - 1.0 / 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_negative_and_nan_weights_ignored() {
        let criteria = SelectionCriteria::new(-1.0, f64::NAN, 1.0);
        let weights = criteria.normalized();
        assert!((weights.preference - 1.0).abs() < f64::EPSILON);
        assert_eq!(
            criteria.invalid_weights(),
            vec!["impact_weight", "confidence_weight"]
        );
        assert!(SelectionCriteria::default().invalid_weights().is_empty());
    }
}
