//! Source features and the conversion context they are processed in.
//!
//! A [`Feature`] is produced by the upstream analysis stage and is a read-only
//! input to the compromise engine. Strategies never mutate a feature in place;
//! they produce a modified copy via [`Feature::derive_replacement`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use super::replacement::Replacement;

/// Closed set of feature categories detected in a source mod.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureType {
    Block,
    Item,
    Entity,
    Recipe,
    Gui,
    Hud,
    Menu,
    Rendering,
    Shader,
    Particle,
    Dimension,
    WorldGen,
    Biome,
    Sound,
    Networking,
    Keybinding,
    Command,
    Other,
}

impl FeatureType {
    /// Every feature type, in declaration order.
    pub const ALL: [FeatureType; 18] = [
        FeatureType::Block,
        FeatureType::Item,
        FeatureType::Entity,
        FeatureType::Recipe,
        FeatureType::Gui,
        FeatureType::Hud,
        FeatureType::Menu,
        FeatureType::Rendering,
        FeatureType::Shader,
        FeatureType::Particle,
        FeatureType::Dimension,
        FeatureType::WorldGen,
        FeatureType::Biome,
        FeatureType::Sound,
        FeatureType::Networking,
        FeatureType::Keybinding,
        FeatureType::Command,
        FeatureType::Other,
    ];

    /// Stable snake_case name, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureType::Block => "block",
            FeatureType::Item => "item",
            FeatureType::Entity => "entity",
            FeatureType::Recipe => "recipe",
            FeatureType::Gui => "gui",
            FeatureType::Hud => "hud",
            FeatureType::Menu => "menu",
            FeatureType::Rendering => "rendering",
            FeatureType::Shader => "shader",
            FeatureType::Particle => "particle",
            FeatureType::Dimension => "dimension",
            FeatureType::WorldGen => "world_gen",
            FeatureType::Biome => "biome",
            FeatureType::Sound => "sound",
            FeatureType::Networking => "networking",
            FeatureType::Keybinding => "keybinding",
            FeatureType::Command => "command",
            FeatureType::Other => "other",
        }
    }

    /// Whether the type alone means the target platform has no native
    /// equivalent, regardless of the tier assigned upstream.
    pub fn is_inherently_incompatible(&self) -> bool {
        matches!(
            self,
            FeatureType::Gui
                | FeatureType::Hud
                | FeatureType::Menu
                | FeatureType::Rendering
                | FeatureType::Shader
                | FeatureType::Dimension
                | FeatureType::WorldGen
        )
    }
}

impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How directly a feature maps onto the target platform (1-4).
///
/// Serialized as its number. Tiers 3 and 4 are the primary compromise
/// candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum CompatibilityTier {
    /// Tier 1: a direct equivalent exists.
    Direct,
    /// Tier 2: an approximate equivalent exists.
    Approximate,
    /// Tier 3: no native equivalent.
    NoEquivalent,
    /// Tier 4: could not be statically analyzed.
    Unanalyzable,
}

impl CompatibilityTier {
    /// Numeric tier value.
    pub const fn number(self) -> u8 {
        match self {
            CompatibilityTier::Direct => 1,
            CompatibilityTier::Approximate => 2,
            CompatibilityTier::NoEquivalent => 3,
            CompatibilityTier::Unanalyzable => 4,
        }
    }

    /// Tiers 3 and 4 have no direct mapping.
    pub const fn lacks_native_equivalent(self) -> bool {
        matches!(
            self,
            CompatibilityTier::NoEquivalent | CompatibilityTier::Unanalyzable
        )
    }
}

impl TryFrom<u8> for CompatibilityTier {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(CompatibilityTier::Direct),
            2 => Ok(CompatibilityTier::Approximate),
            3 => Ok(CompatibilityTier::NoEquivalent),
            4 => Ok(CompatibilityTier::Unanalyzable),
            other => Err(format!("Invalid compatibility tier: {other} (must be 1-4)")),
        }
    }
}

impl From<CompatibilityTier> for u8 {
    fn from(tier: CompatibilityTier) -> Self {
        tier.number()
    }
}

/// How a UI screen is opened in the source mod.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionTrigger {
    Block,
    Entity,
    Item,
    Keybind,
}

/// Structural signals describing a custom screen, HUD, or menu.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiTraits {
    /// Number of item slots on the screen.
    pub slot_count: u32,
    /// Labels of clickable buttons.
    pub buttons: Vec<String>,
    /// Number of free-text input fields.
    pub text_fields: u32,
    /// Number of progress bars or gauges.
    pub progress_bars: u32,
    /// Whether the screen mainly displays live values.
    pub displays_values: bool,
    /// Number of pages of static text.
    pub text_pages: u32,
    /// What opens the screen.
    pub opened_by: Option<InteractionTrigger>,
}

/// A visual effect implemented by a custom shader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShaderEffect {
    Glow,
    Transparency,
    Distortion,
    Bloom,
    Other,
}

impl ShaderEffect {
    /// Effects expressible with stock materials.
    pub fn has_material_equivalent(&self) -> bool {
        matches!(self, ShaderEffect::Glow | ShaderEffect::Transparency)
    }
}

/// Structural signals describing custom rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderingTraits {
    pub custom_shader: bool,
    pub shader_effects: Vec<ShaderEffect>,
    pub animated: bool,
    pub frame_count: u32,
    pub particle_count: u32,
    pub custom_model: bool,
    pub texture: Option<String>,
}

/// Structural signals describing a custom dimension or world generator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DimensionTraits {
    pub custom_terrain: bool,
    pub biomes: Vec<String>,
    pub custom_sky: bool,
    /// Edge length in blocks when the dimension is bounded.
    pub bounded_size: Option<u32>,
    pub has_portal: bool,
}

/// Typed property bag of a feature.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureProperties {
    /// Explicit upstream hint; overrides tier and type when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_compromise: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ui: Option<UiTraits>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rendering: Option<RenderingTraits>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension: Option<DimensionTraits>,
    /// Replacement content generated by a compromise strategy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replacement: Option<Replacement>,
    /// Unrecognized properties, carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Where a feature was found in the source mod.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

/// A discrete source-mod capability detected by upstream analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub feature_type: FeatureType,
    pub compatibility_tier: CompatibilityTier,
    #[serde(default)]
    pub properties: FeatureProperties,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceLocation>,
}

impl Feature {
    /// Create a feature with empty properties and metadata.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        feature_type: FeatureType,
        compatibility_tier: CompatibilityTier,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            feature_type,
            compatibility_tier,
            properties: FeatureProperties::default(),
            metadata: Map::new(),
            source: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_properties(mut self, properties: FeatureProperties) -> Self {
        self.properties = properties;
        self
    }

    pub fn with_ui(mut self, ui: UiTraits) -> Self {
        self.properties.ui = Some(ui);
        self
    }

    pub fn with_rendering(mut self, rendering: RenderingTraits) -> Self {
        self.properties.rendering = Some(rendering);
        self
    }

    pub fn with_dimension(mut self, dimension: DimensionTraits) -> Self {
        self.properties.dimension = Some(dimension);
        self
    }

    pub fn with_compromise_hint(mut self, requires: bool) -> Self {
        self.properties.requires_compromise = Some(requires);
        self
    }

    pub fn with_source(mut self, file: impl Into<String>, line: Option<u32>) -> Self {
        self.source = Some(SourceLocation {
            file: file.into(),
            line,
        });
        self
    }

    /// Whether this feature is a compromise candidate.
    ///
    /// An explicit `requires_compromise` hint wins. Otherwise tiers 3-4 and
    /// inherently incompatible feature types need one.
    pub fn needs_compromise(&self) -> bool {
        match self.properties.requires_compromise {
            Some(hint) => hint,
            None => {
                self.compatibility_tier.lacks_native_equivalent()
                    || self.feature_type.is_inherently_incompatible()
            }
        }
    }

    /// Build the modified copy produced by a strategy.
    ///
    /// The copy keeps the original tier and provenance, records the original
    /// id in its metadata, and no longer asks for a compromise.
    pub fn derive_replacement(
        &self,
        suffix: &str,
        feature_type: FeatureType,
        description: impl Into<String>,
        replacement: Replacement,
    ) -> Feature {
        let mut metadata = self.metadata.clone();
        metadata.insert("compromise_of".to_string(), Value::String(self.id.clone()));
        metadata.insert(
            "original_type".to_string(),
            Value::String(self.feature_type.as_str().to_string()),
        );

        Feature {
            id: format!("{}_{}", self.id, suffix),
            name: format!("{} ({})", self.name, suffix.replace('_', " ")),
            description: description.into(),
            feature_type,
            compatibility_tier: self.compatibility_tier,
            properties: FeatureProperties {
                requires_compromise: Some(false),
                ui: None,
                rendering: None,
                dimension: None,
                replacement: Some(replacement),
                extra: self.properties.extra.clone(),
            },
            metadata,
            source: self.source.clone(),
        }
    }
}

/// Identity and platform information of the conversion run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionContext {
    pub mod_id: String,
    #[serde(default)]
    pub mod_name: String,
    #[serde(default)]
    pub mod_version: String,
    #[serde(default = "default_source_platform")]
    pub source_platform: String,
    #[serde(default = "default_target_platform")]
    pub target_platform: String,
    /// Conversion-wide settings owned by the orchestration layer.
    #[serde(default)]
    pub settings: Map<String, Value>,
}

fn default_source_platform() -> String {
    "java".to_string()
}

fn default_target_platform() -> String {
    "bedrock".to_string()
}

impl ConversionContext {
    pub fn new(mod_id: impl Into<String>, mod_version: impl Into<String>) -> Self {
        let mod_id = mod_id.into();
        Self {
            mod_name: mod_id.clone(),
            mod_id,
            mod_version: mod_version.into(),
            source_platform: default_source_platform(),
            target_platform: default_target_platform(),
            settings: Map::new(),
        }
    }
}
