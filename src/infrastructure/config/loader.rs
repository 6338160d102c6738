use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use std::path::Path;
use thiserror::Error;

use crate::domain::models::config::{Config, DimensionSettings, MAX_TICKS_PER_FRAME};

/// Project-local configuration directory
pub const CONFIG_DIR: &str = ".modbridge";

/// Environment variable prefix; `__` separates nested keys
pub const ENV_PREFIX: &str = "MODBRIDGE_";

/// Configuration error types
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid max_attempts: {0}. Must be at least 1")]
    InvalidMaxAttempts(usize),

    #[error("Invalid batch_concurrency: {0}. Must be at least 1")]
    InvalidBatchConcurrency(usize),

    #[error("Invalid selection weight {0}: {1}. Must be finite and non-negative")]
    InvalidWeight(&'static str, f64),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid max_inventory_slots: {0}. Must be at least 1")]
    InvalidInventorySlots(u32),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .modbridge/config.yaml (project config)
    /// 3. .modbridge/local.yaml (project local overrides, optional)
    /// 4. Environment variables (MODBRIDGE_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        Self::load_from_dir(".")
    }

    /// Same as [`load`](Self::load), rooted at `root` instead of the working
    /// directory
    pub fn load_from_dir(root: impl AsRef<Path>) -> Result<Config> {
        let dir = root.as_ref().join(CONFIG_DIR);
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(dir.join("config.yaml")))
            .merge(Yaml::file(dir.join("local.yaml")))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honoring environment
    /// overrides
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.engine.max_attempts == 0 {
            return Err(ConfigError::InvalidMaxAttempts(config.engine.max_attempts));
        }

        if config.engine.batch_concurrency == 0 {
            return Err(ConfigError::InvalidBatchConcurrency(
                config.engine.batch_concurrency,
            ));
        }

        if config.engine.apply_timeout_ms == Some(0) {
            return Err(ConfigError::ValidationFailed(
                "apply_timeout_ms must be positive when set".to_string(),
            ));
        }

        let selection = &config.selection;
        for (name, weight) in [
            ("impact_weight", selection.impact_weight),
            ("confidence_weight", selection.confidence_weight),
            ("preference_weight", selection.preference_weight),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ConfigError::InvalidWeight(name, weight));
            }
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let strategies = &config.strategies;
        if strategies.ui.max_inventory_slots == 0 {
            return Err(ConfigError::InvalidInventorySlots(
                strategies.ui.max_inventory_slots,
            ));
        }

        if strategies.ui.command_namespace.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "ui.command_namespace cannot be empty".to_string(),
            ));
        }

        if strategies.rendering.max_particles == 0 {
            return Err(ConfigError::ValidationFailed(
                "rendering.max_particles must be at least 1".to_string(),
            ));
        }

        if strategies.dimension.region_spacing <= 0 {
            return Err(ConfigError::ValidationFailed(format!(
                "dimension.region_spacing must be positive, got {}",
                strategies.dimension.region_spacing
            )));
        }

        let dimension = &strategies.dimension;
        let last_slot = DimensionSettings::REGION_SLOTS - 1;
        if dimension.region_origin(0).is_none() || dimension.region_origin(last_slot).is_none() {
            return Err(ConfigError::ValidationFailed(format!(
                "dimension reserved regions must stay within +/-{} blocks (region_offset {}, region_spacing {})",
                DimensionSettings::WORLD_BORDER,
                dimension.region_offset,
                dimension.region_spacing
            )));
        }

        let ticks = strategies.rendering.ticks_per_frame;
        if ticks == 0 || ticks > MAX_TICKS_PER_FRAME {
            return Err(ConfigError::ValidationFailed(format!(
                "rendering.ticks_per_frame must be between 1 and {MAX_TICKS_PER_FRAME}, got {ticks}"
            )));
        }

        if strategies.excluded_features.iter().any(|f| f.trim().is_empty()) {
            return Err(ConfigError::ValidationFailed(
                "excluded_features cannot contain empty entries".to_string(),
            ));
        }

        Ok(())
    }
}
