//! Markdown post-processing guide for a finished batch.

use crate::domain::models::feature::ConversionContext;
use crate::domain::models::processing::{BatchStatistics, FeatureProcessingResult, ProcessingStatus};
use crate::domain::models::replacement::Replacement;

/// Render the manual post-processing guide.
///
/// Lists every compromised feature with what was changed and what to check,
/// then every unresolved feature with its errors, then recurring issues.
pub fn render_guide(
    context: &ConversionContext,
    results: &[FeatureProcessingResult],
    statistics: &BatchStatistics,
) -> String {
    let mut lines = vec![
        "# Manual Post-Processing Guide".to_string(),
        String::new(),
        format!(
            "Mod `{}` version {} converted from {} to {}.",
            context.mod_id, context.mod_version, context.source_platform, context.target_platform
        ),
        String::new(),
        "## Summary".to_string(),
        String::new(),
        format!("- Features processed: {}", statistics.total_features),
        format!(
            "- Compromises applied: {} ({:.1}%)",
            statistics.compromises_applied, statistics.success_rate
        ),
        format!("- No compromise needed: {}", statistics.not_needed),
        format!("- Unresolved: {}", statistics.failed),
    ];

    let compromised: Vec<_> = results
        .iter()
        .filter(|r| r.status == ProcessingStatus::Compromised)
        .collect();
    if !compromised.is_empty() {
        lines.push(String::new());
        lines.push("## Compromised Features".to_string());
        for result in compromised {
            compromised_section(&mut lines, result);
        }
    }

    let unresolved: Vec<_> = results
        .iter()
        .filter(|r| matches!(r.status, ProcessingStatus::Failed | ProcessingStatus::NoStrategy))
        .collect();
    if !unresolved.is_empty() {
        lines.push(String::new());
        lines.push("## Unresolved Features".to_string());
        for result in unresolved {
            lines.push(String::new());
            lines.push(format!("### {} ({})", result.feature_id, result.status.as_str()));
            lines.push(String::new());
            bullets(&mut lines, "Errors", &result.errors);
            bullets(&mut lines, "Warnings", &result.warnings);
            bullets(&mut lines, "Suggestions", &result.suggestions);
        }
    }

    if !statistics.common_issues.is_empty() {
        lines.push(String::new());
        lines.push("## Common Issues".to_string());
        lines.push(String::new());
        lines.extend(statistics.common_issues.iter().map(|issue| format!("- {issue}")));
    }

    lines.push(String::new());
    lines.join("\n")
}

fn compromised_section(lines: &mut Vec<String>, result: &FeatureProcessingResult) {
    let Some(compromise) = result.compromise_result.as_ref() else {
        return;
    };
    let metadata = &compromise.metadata;

    lines.push(String::new());
    lines.push(format!(
        "### {} via {} ({})",
        result.feature_id, metadata.strategy_used, metadata.variant
    ));
    lines.push(String::new());
    lines.push(compromise.description.clone());
    lines.push(String::new());
    lines.push(format!(
        "- Impact: {} (user experience impact {}/100, confidence {}%)",
        compromise.impact_level, compromise.user_experience_impact, metadata.confidence
    ));
    lines.push(format!(
        "- Reversible: {}",
        if metadata.reversible { "yes" } else { "no" }
    ));
    if result.metadata.fallback_used {
        lines.push(format!(
            "- Applied after {} attempts (fallback used)",
            result.metadata.attempts
        ));
    }

    let replacement = compromise
        .modified_feature
        .as_ref()
        .and_then(|f| f.properties.replacement.as_ref());
    if let Some(replacement) = replacement {
        if !replacement.is_embeddable() {
            lines.push("- Not embedded in the addon; manual work required".to_string());
        }
        if let Replacement::Documentation(stub) = replacement {
            lines.push(String::new());
            lines.push(stub.summary.clone());
            lines.push(String::new());
            lines.push("Manual steps:".to_string());
            lines.extend(
                stub.manual_steps
                    .iter()
                    .enumerate()
                    .map(|(i, step)| format!("{}. {step}", i + 1)),
            );
        }
    }

    lines.push(String::new());
    bullets(lines, "Warnings", &result.warnings);
    bullets(lines, "Suggestions", &result.suggestions);
}

fn bullets(lines: &mut Vec<String>, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    lines.push(format!("**{heading}:**"));
    lines.extend(items.iter().map(|item| format!("- {item}")));
    lines.push(String::new());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolved_features_are_listed_with_errors() {
        let mut failed = FeatureProcessingResult::new("portal", ProcessingStatus::NoStrategy);
        failed.errors.push("No applicable compromise strategy found".to_string());
        let skipped = FeatureProcessingResult::new("ore", ProcessingStatus::NotNeeded);
        let statistics = BatchStatistics {
            total_features: 2,
            failed: 1,
            not_needed: 1,
            ..BatchStatistics::default()
        };

        let guide = render_guide(&ConversionContext::new("aether", "1.2"), &[failed, skipped], &statistics);

        assert!(guide.starts_with("# Manual Post-Processing Guide"));
        assert!(guide.contains("from java to bedrock"));
        assert!(guide.contains("### portal (no-strategy)"));
        assert!(guide.contains("- No applicable compromise strategy found"));
        assert!(!guide.contains("### ore"));
        assert!(!guide.contains("## Compromised Features"));
    }
}
