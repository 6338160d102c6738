//! Implementation of the `modbridge preview` command.

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::input::BatchInput;
use crate::cli::output::{heading, output, styled_impact, CommandOutput};
use crate::domain::models::config::Config;
use crate::services::strategy_selector::{build_selection, SelectionSummary};
use crate::services::CompromiseEngine;

#[derive(Args, Debug)]
pub struct PreviewArgs {
    /// Batch file (YAML or JSON) with `context`, `features` and optional `options`
    pub input: PathBuf,

    /// Only preview the feature with this id
    #[arg(long)]
    pub feature: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RejectedCandidate {
    pub strategy: String,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct FeaturePreview {
    pub feature_id: String,
    pub needs_compromise: bool,
    pub selection: Option<SelectionSummary>,
    pub rejected: Vec<RejectedCandidate>,
}

#[derive(Debug, Serialize)]
pub struct PreviewOutput {
    pub previews: Vec<FeaturePreview>,
}

impl CommandOutput for PreviewOutput {
    fn to_human(&self) -> String {
        if self.previews.is_empty() {
            return "No features found.".to_string();
        }

        let mut lines = Vec::new();
        for preview in &self.previews {
            lines.push(heading(&preview.feature_id));
            if !preview.needs_compromise {
                lines.push("  No compromise needed".to_string());
            }
            match &preview.selection {
                Some(selection) => {
                    lines.push(format!(
                        "  Selected: {} (score {:.3}, {} impact)",
                        selection.strategy,
                        selection.score,
                        styled_impact(selection.estimated_impact.impact_level)
                    ));
                    lines.push(format!("  Reasoning: {}", selection.reasoning));
                    for (rank, alt) in selection.alternatives.iter().enumerate() {
                        lines.push(format!(
                            "  {}. {} (score {:.3}): {}",
                            rank + 2,
                            alt.strategy,
                            alt.score,
                            alt.reason
                        ));
                    }
                }
                None => lines.push("  No applicable compromise strategy".to_string()),
            }
            for rejected in &preview.rejected {
                lines.push(format!("  x {}: {}", rejected.strategy, rejected.reason));
            }
            lines.push(String::new());
        }
        lines.join("\n").trim_end().to_string()
    }
}

pub async fn execute(args: PreviewArgs, config: &Config, json_mode: bool) -> Result<()> {
    let input = BatchInput::load(&args.input).await?;
    let options = input.options_or(&config.defaults);
    let engine = CompromiseEngine::from_config(config).context("Failed to build compromise engine")?;

    let features: Vec<_> = match args.feature.as_deref() {
        Some(id) => {
            let selected: Vec<_> = input.features.iter().filter(|f| f.id == id).collect();
            if selected.is_empty() {
                bail!("Feature '{id}' not found in {}", args.input.display());
            }
            selected
        }
        None => input.features.iter().collect(),
    };

    let mut previews = Vec::with_capacity(features.len());
    for feature in features {
        let ranking = engine
            .selector()
            .rank(feature, &input.context, &options, engine.criteria())
            .await;
        let rejected = ranking
            .rejected
            .iter()
            .map(|r| RejectedCandidate {
                strategy: r.strategy_name.clone(),
                reason: r.reason.to_string(),
            })
            .collect();

        previews.push(FeaturePreview {
            feature_id: feature.id.clone(),
            needs_compromise: feature.needs_compromise(),
            selection: build_selection(ranking.ranked).map(|s| s.summary()),
            rejected,
        });
    }

    output(&PreviewOutput { previews }, json_mode);
    Ok(())
}
