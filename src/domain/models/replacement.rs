//! Replacement content generated by compromise strategies.
//!
//! Each variant corresponds to one sub-case of a shipped strategy. The
//! addon-packaging stage decides from the variant whether the content can be
//! embedded or only documented.

use serde::{Deserialize, Serialize};

use super::feature::{FeatureType, InteractionTrigger};

/// Generated replacement for an incompatible feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Replacement {
    Inventory(InventoryLayout),
    ChatCommands(ChatCommandSet),
    Book(BookLayout),
    EntityInteraction(InteractionBinding),
    Scoreboard(ScoreboardLayout),
    ParticleSubstitution(ParticleEmitter),
    MaterialSubstitution(MaterialOverride),
    FlipbookTexture(FlipbookAnimation),
    StaticGeometry(StaticModel),
    StructureInstance(StructurePlacement),
    BiomeOverlay(BiomeOverlay),
    ReservedRegion(ReservedRegion),
    Documentation(DocumentationStub),
}

impl Replacement {
    /// Whether the replacement can be shipped inside the addon, as opposed to
    /// only being described for manual work.
    pub fn is_embeddable(&self) -> bool {
        !matches!(self, Replacement::Documentation(_))
    }
}

/// Screen rebuilt on top of a container inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryLayout {
    pub rows: u32,
    pub columns: u32,
    pub slot_count: u32,
    /// Slots reserved to render progress as item stacks.
    pub progress_slots: u32,
    pub title: String,
}

/// A single chat command standing in for a button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatCommand {
    pub name: String,
    pub arguments: Vec<String>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatCommandSet {
    pub namespace: String,
    pub commands: Vec<ChatCommand>,
}

/// Static text moved into a written book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookLayout {
    pub title: String,
    pub pages: u32,
    pub navigation_buttons: Vec<String>,
}

/// Screen replaced by a direct interaction with a block or entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionBinding {
    pub trigger: InteractionTrigger,
    /// One action per original button, cycled by sneaking.
    pub actions: Vec<String>,
}

/// Values displayed through the scoreboard sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreboardLayout {
    pub objective: String,
    pub display_slot: String,
    pub tracked_values: u32,
}

/// Custom rendering approximated with a stock particle emitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticleEmitter {
    pub identifier: String,
    pub max_particles: u32,
    pub texture: Option<String>,
}

/// Shader effect expressed with a stock material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialOverride {
    pub material: String,
    pub emissive: bool,
    pub translucent: bool,
    /// Effects the material cannot reproduce.
    pub dropped_effects: Vec<String>,
}

/// Animated rendering baked into a texture flipbook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlipbookAnimation {
    pub texture: String,
    pub frames: u32,
    pub ticks_per_frame: u32,
}

/// Dynamic model renderer frozen to static geometry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticModel {
    pub geometry: String,
    pub texture: Option<String>,
}

/// Small dimension shipped as a structure placed in the overworld.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructurePlacement {
    pub structure: String,
    pub size: u32,
    pub entry_mechanism: String,
}

/// Dimension biomes injected into overworld generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BiomeOverlay {
    pub biomes: Vec<String>,
    pub custom_sky_dropped: bool,
}

/// A far-away overworld area standing in for a dimension, reached by teleport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservedRegion {
    pub origin_x: i64,
    pub origin_z: i64,
    pub teleport_function: String,
    pub custom_terrain_dropped: bool,
}

/// Universal fallback: instructions for converting the feature by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentationStub {
    pub summary: String,
    pub manual_steps: Vec<String>,
    pub original_type: FeatureType,
}
