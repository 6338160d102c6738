//! Implementation of the `modbridge strategies` command.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::output::{list_table, output, styled_impact, CommandOutput};
use crate::domain::models::compromise::ImpactLevel;
use crate::domain::models::config::Config;
use crate::services::CompromiseEngine;

#[derive(Debug, Serialize)]
pub struct StrategyEntry {
    pub feature_type: String,
    /// Registration position; lower positions win ties
    pub position: usize,
    pub strategy: String,
    pub base_impact: ImpactLevel,
}

#[derive(Debug, Serialize)]
pub struct StrategiesOutput {
    pub strategies: Vec<StrategyEntry>,
}

impl CommandOutput for StrategiesOutput {
    fn to_human(&self) -> String {
        if self.strategies.is_empty() {
            return "No strategies registered.".to_string();
        }

        let mut table = list_table(&["Feature type", "#", "Strategy", "Base impact"]);
        for entry in &self.strategies {
            table.add_row(vec![
                entry.feature_type.clone(),
                (entry.position + 1).to_string(),
                entry.strategy.clone(),
                styled_impact(entry.base_impact),
            ]);
        }
        table.to_string()
    }
}

pub fn execute(config: &Config, json_mode: bool) -> Result<()> {
    let engine = CompromiseEngine::from_config(config).context("Failed to build compromise engine")?;
    let registry = engine.registry();

    let strategies = registry
        .feature_types()
        .into_iter()
        .flat_map(move |feature_type| {
            registry
                .get_strategies(feature_type)
                .iter()
                .enumerate()
                .map(move |(position, strategy)| StrategyEntry {
                    feature_type: feature_type.to_string(),
                    position,
                    strategy: strategy.name().to_string(),
                    base_impact: strategy.base_impact(),
                })
        })
        .collect();

    output(&StrategiesOutput { strategies }, json_mode);
    Ok(())
}
