use serde::{Deserialize, Serialize};

use super::compromise::CompromiseOptions;
use super::selection::SelectionCriteria;

/// Main configuration structure for Modbridge
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Compromise engine configuration
    #[serde(default)]
    pub engine: EngineConfig,

    /// Default strategy selection weights
    #[serde(default)]
    pub selection: SelectionCriteria,

    /// Default compromise options when a batch file does not supply any
    #[serde(default)]
    pub defaults: CompromiseOptions,

    /// Strategy family toggles and tuning
    #[serde(default)]
    pub strategies: StrategyPreferences,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Compromise engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EngineConfig {
    /// Upper bound on apply attempts per feature (fallback chain length)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,

    /// Whether batch calls produce a post-processing guide
    #[serde(default = "default_true")]
    pub generate_reports: bool,

    /// Whether the default strategy set is registered at construction
    #[serde(default = "default_true")]
    pub auto_register_strategies: bool,

    /// Rank candidates with the selector instead of registration order
    #[serde(default = "default_true")]
    pub scored_selection: bool,

    /// Optional per-attempt timeout for strategy application
    #[serde(default)]
    pub apply_timeout_ms: Option<u64>,

    /// Features processed at once by concurrent batch processing
    #[serde(default = "default_batch_concurrency")]
    pub batch_concurrency: usize,
}

const fn default_max_attempts() -> usize {
    3
}

const fn default_true() -> bool {
    true
}

const fn default_batch_concurrency() -> usize {
    1
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            generate_reports: true,
            auto_register_strategies: true,
            scored_selection: true,
            apply_timeout_ms: None,
            batch_concurrency: default_batch_concurrency(),
        }
    }
}

/// User-facing strategy configuration, translated into registry entries by
/// the preferences adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StrategyPreferences {
    #[serde(default)]
    pub ui: UiFallbackSettings,

    #[serde(default)]
    pub rendering: RenderingSettings,

    #[serde(default)]
    pub dimension: DimensionSettings,

    /// Feature ids or names no strategy may touch
    #[serde(default)]
    pub excluded_features: Vec<String>,
}

/// Tuning for the UI fallback strategy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UiFallbackSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Largest screen (in slots) that still maps onto a container inventory
    #[serde(default = "default_max_inventory_slots")]
    pub max_inventory_slots: u32,

    /// Most buttons that are still usable as chat commands
    #[serde(default = "default_max_chat_commands")]
    pub max_chat_commands: u32,

    /// Namespace prefix for generated chat commands
    #[serde(default = "default_command_namespace")]
    pub command_namespace: String,
}

const fn default_max_inventory_slots() -> u32 {
    54
}

const fn default_max_chat_commands() -> u32 {
    8
}

fn default_command_namespace() -> String {
    "mod".to_string()
}

impl Default for UiFallbackSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_inventory_slots: default_max_inventory_slots(),
            max_chat_commands: default_max_chat_commands(),
            command_namespace: default_command_namespace(),
        }
    }
}

/// Tuning for the rendering simplification strategy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RenderingSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Particle budget for substituted emitters
    #[serde(default = "default_max_particles")]
    pub max_particles: u32,

    /// Whether glow and transparency shaders may become stock materials
    #[serde(default = "default_true")]
    pub allow_material_substitution: bool,

    /// Game ticks each flipbook frame is shown for
    #[serde(default = "default_ticks_per_frame")]
    pub ticks_per_frame: u32,
}

const fn default_max_particles() -> u32 {
    64
}

/// Longest flipbook frame accepted from configuration (one minute of ticks).
pub const MAX_TICKS_PER_FRAME: u32 = 1_200;

const fn default_ticks_per_frame() -> u32 {
    2
}

impl Default for RenderingSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_particles: default_max_particles(),
            allow_material_substitution: true,
            ticks_per_frame: default_ticks_per_frame(),
        }
    }
}

/// Tuning for the dimension approximation strategy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DimensionSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Largest bounded dimension (edge length in blocks) shipped as a structure
    #[serde(default = "default_max_structure_size")]
    pub max_structure_size: u32,

    /// Distance from the world origin at which reserved regions start
    #[serde(default = "default_region_offset")]
    pub region_offset: i64,

    /// Spacing between consecutive reserved regions
    #[serde(default = "default_region_spacing")]
    pub region_spacing: i64,
}

const fn default_max_structure_size() -> u32 {
    64
}

const fn default_region_offset() -> i64 {
    1_000_000
}

const fn default_region_spacing() -> i64 {
    50_000
}

impl DimensionSettings {
    /// Number of distinct reserved-region slots along the x axis.
    pub const REGION_SLOTS: u64 = 64;

    /// Horizontal world border of the target platform, in blocks.
    pub const WORLD_BORDER: i64 = 30_000_000;

    /// Origin of reserved-region `slot`, or `None` when it overflows or lies
    /// outside the world border.
    pub fn region_origin(&self, slot: u64) -> Option<(i64, i64)> {
        let x = i64::try_from(slot)
            .ok()
            .and_then(|slot| slot.checked_mul(self.region_spacing))
            .and_then(|dx| self.region_offset.checked_add(dx))?;
        let within = |v: i64| v.unsigned_abs() <= Self::WORLD_BORDER.unsigned_abs();
        (within(x) && within(self.region_offset)).then_some((x, self.region_offset))
    }
}

impl Default for DimensionSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_structure_size: default_max_structure_size(),
            region_offset: default_region_offset(),
            region_spacing: default_region_spacing(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stdout only when unset
    #[serde(default)]
    pub log_dir: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
        }
    }
}
