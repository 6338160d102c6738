//! Implementation of the `modbridge process` command.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::input::BatchInput;
use crate::cli::output::{heading, list_table, output, styled_impact, styled_status, truncate, CommandOutput};
use crate::domain::models::config::Config;
use crate::domain::models::processing::BatchReport;
use crate::services::CompromiseEngine;

#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Batch file (YAML or JSON) with `context`, `features` and optional `options`
    pub input: PathBuf,

    /// Write the manual post-processing guide to this path
    #[arg(long)]
    pub guide: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct ProcessOutput {
    pub report: BatchReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guide_path: Option<String>,
}

impl CommandOutput for ProcessOutput {
    fn to_human(&self) -> String {
        let report = &self.report;
        if report.results.is_empty() {
            return "No features found.".to_string();
        }

        let mut table = list_table(&["Feature", "Status", "Strategy", "Impact", "Attempts", "Note"]);
        for result in &report.results {
            let compromise = result.compromise_result.as_ref();
            let note = result
                .errors
                .first()
                .or_else(|| result.warnings.first())
                .map(|n| truncate(n, 60))
                .unwrap_or_default();
            table.add_row(vec![
                result.feature_id.clone(),
                styled_status(result.status),
                result.strategy_used().unwrap_or("-").to_string(),
                compromise.map_or_else(|| "-".to_string(), |c| styled_impact(c.impact_level)),
                if result.metadata.fallback_used {
                    format!("{} (fallback)", result.metadata.attempts)
                } else {
                    result.metadata.attempts.to_string()
                },
                note,
            ]);
        }

        let stats = &report.statistics;
        let mut lines = vec![
            table.to_string(),
            String::new(),
            heading("Statistics"),
            format!("  Features:     {}", stats.total_features),
            format!(
                "  Compromised:  {} ({:.1}%)",
                stats.compromises_applied, stats.success_rate
            ),
            format!("  Not needed:   {}", stats.not_needed),
            format!("  Unresolved:   {}", stats.failed),
        ];
        for (strategy, count) in &stats.strategy_usage {
            lines.push(format!("  {strategy}: {count}"));
        }
        if !stats.common_issues.is_empty() {
            lines.push(String::new());
            lines.push(heading("Common issues"));
            lines.extend(stats.common_issues.iter().map(|issue| format!("  - {issue}")));
        }
        if let Some(ref path) = self.guide_path {
            lines.push(String::new());
            lines.push(format!("Post-processing guide written to {path}"));
        }
        lines.join("\n")
    }
}

pub async fn execute(args: ProcessArgs, config: &Config, json_mode: bool) -> Result<()> {
    let input = BatchInput::load(&args.input).await?;
    let options = input.options_or(&config.defaults);
    let engine = CompromiseEngine::from_config(config).context("Failed to build compromise engine")?;

    let report = if config.engine.batch_concurrency > 1 {
        engine
            .process_batch_concurrent(&input.features, &input.context, &options)
            .await
    } else {
        engine
            .process_batch(&input.features, &input.context, &options)
            .await
    };

    let guide_path = match (&args.guide, &report.guide) {
        (Some(path), Some(guide)) => {
            tokio::fs::write(path, guide)
                .await
                .with_context(|| format!("Failed to write guide to {}", path.display()))?;
            Some(path.display().to_string())
        }
        (Some(_), None) => {
            anyhow::bail!("Guide requested but report generation is disabled (engine.generate_reports)")
        }
        _ => None,
    };

    output(&ProcessOutput { report, guide_path }, json_mode);
    Ok(())
}
