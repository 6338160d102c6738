//! Batch input files consumed by the CLI.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::domain::models::compromise::CompromiseOptions;
use crate::domain::models::feature::{ConversionContext, Feature};

/// Features of one mod plus the context they were analyzed in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchInput {
    pub context: ConversionContext,
    #[serde(default)]
    pub features: Vec<Feature>,
    /// Overrides the configured default options when present
    #[serde(default)]
    pub options: Option<CompromiseOptions>,
}

impl BatchInput {
    /// Read a YAML or JSON batch file, chosen by extension
    pub async fn load(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read batch file {}", path.display()))?;
        Self::parse(&raw, path)
    }

    fn parse(raw: &str, path: &Path) -> Result<Self> {
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            serde_json::from_str(raw)
                .with_context(|| format!("Invalid JSON batch file {}", path.display()))
        } else {
            serde_yaml::from_str(raw)
                .with_context(|| format!("Invalid YAML batch file {}", path.display()))
        }
    }

    pub fn options_or(&self, defaults: &CompromiseOptions) -> CompromiseOptions {
        self.options.clone().unwrap_or_else(|| defaults.clone())
    }
}
