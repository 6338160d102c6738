//! UI fallback strategy.
//!
//! Custom screens, HUDs and menus have no native equivalent on the target
//! platform. This strategy rebuilds them from the closest stock mechanism:
//! a container inventory, chat commands, a written book, a direct
//! block/entity interaction, or the scoreboard sidebar. When no structural
//! signal matches it falls back to a documentation stub.

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::{documentation_stub, functionality_loss_warning, slug, Profile};
use crate::domain::error::{StrategyError, StrategyResult};
use crate::domain::models::compromise::{
    CompromiseMetadata, CompromiseOptions, CompromiseResult, ImpactEstimate, ImpactLevel,
};
use crate::domain::models::config::UiFallbackSettings;
use crate::domain::models::feature::{
    ConversionContext, Feature, FeatureType, InteractionTrigger, UiTraits,
};
use crate::domain::models::replacement::{
    BookLayout, ChatCommand, ChatCommandSet, InteractionBinding, InventoryLayout, Replacement,
    ScoreboardLayout,
};
use crate::domain::ports::CompromiseStrategy;

/// Registered name of the UI fallback strategy.
pub const UI_FALLBACK_STRATEGY: &str = "ui_fallback";

const SUPPORTED: [FeatureType; 3] = [FeatureType::Gui, FeatureType::Hud, FeatureType::Menu];
const INVENTORY_COLUMNS: u32 = 9;
const MAX_INVENTORY_ROWS: u32 = 6;
const MAX_INTERACTION_ACTIONS: usize = 3;

/// Sub-cases of the UI fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiCompromise {
    InventoryAdaptation,
    ChatCommands,
    BookInterface,
    EntityInteraction,
    ScoreboardDisplay,
    DocumentationStub,
}

impl UiCompromise {
    pub const fn profile(self) -> Profile {
        match self {
            UiCompromise::InventoryAdaptation => Profile::new(ImpactLevel::Medium, 40, 85, true),
            UiCompromise::ChatCommands => Profile::new(ImpactLevel::High, 65, 75, true),
            UiCompromise::BookInterface => Profile::new(ImpactLevel::Medium, 50, 80, true),
            UiCompromise::EntityInteraction => Profile::new(ImpactLevel::Medium, 45, 70, true),
            UiCompromise::ScoreboardDisplay => Profile::new(ImpactLevel::Low, 25, 85, true),
            UiCompromise::DocumentationStub => Profile::new(ImpactLevel::High, 85, 50, false),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            UiCompromise::InventoryAdaptation => "inventory",
            UiCompromise::ChatCommands => "chat_commands",
            UiCompromise::BookInterface => "book",
            UiCompromise::EntityInteraction => "entity_interaction",
            UiCompromise::ScoreboardDisplay => "scoreboard",
            UiCompromise::DocumentationStub => "documentation",
        }
    }
}

/// Replacement plus the notes that go with it.
struct Generated {
    replacement: Replacement,
    feature_type: FeatureType,
    description: String,
    warnings: Vec<String>,
    suggestions: Vec<String>,
}

/// Adapts custom UI onto stock UI mechanisms.
#[derive(Debug, Clone, Default)]
pub struct UiFallbackStrategy {
    settings: UiFallbackSettings,
}

impl UiFallbackStrategy {
    pub fn new(settings: UiFallbackSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &UiFallbackSettings {
        &self.settings
    }

    /// Pick the sub-case from the feature's UI traits.
    pub fn classify(&self, feature: &Feature) -> UiCompromise {
        let Some(ui) = feature.properties.ui.as_ref() else {
            return UiCompromise::DocumentationStub;
        };
        let buttons = ui.buttons.len();

        if feature.feature_type == FeatureType::Hud && ui.slot_count == 0 {
            return UiCompromise::ScoreboardDisplay;
        }
        if ui.slot_count > 0 && ui.slot_count <= self.settings.max_inventory_slots {
            return UiCompromise::InventoryAdaptation;
        }
        if ui.text_pages > 0 && ui.text_fields == 0 && buttons <= 2 {
            return UiCompromise::BookInterface;
        }
        if ui.displays_values && buttons == 0 && ui.text_fields == 0 {
            return UiCompromise::ScoreboardDisplay;
        }
        if matches!(
            ui.opened_by,
            Some(InteractionTrigger::Block | InteractionTrigger::Entity)
        ) && (1..=MAX_INTERACTION_ACTIONS).contains(&buttons)
            && ui.text_fields == 0
        {
            return UiCompromise::EntityInteraction;
        }
        if buttons > 0 && buttons <= self.settings.max_chat_commands as usize {
            return UiCompromise::ChatCommands;
        }
        UiCompromise::DocumentationStub
    }

    fn generate(
        &self,
        variant: UiCompromise,
        feature: &Feature,
        context: &ConversionContext,
    ) -> Generated {
        let empty = UiTraits::default();
        let ui = feature.properties.ui.as_ref().unwrap_or(&empty);

        match variant {
            UiCompromise::InventoryAdaptation => inventory(feature, ui),
            UiCompromise::ChatCommands => chat_commands(&self.settings, feature, ui),
            UiCompromise::BookInterface => book(feature, ui),
            UiCompromise::EntityInteraction => interaction(feature, ui),
            UiCompromise::ScoreboardDisplay => scoreboard(feature, ui, context),
            UiCompromise::DocumentationStub => stub(feature, ui),
        }
    }
}

fn inventory(feature: &Feature, ui: &UiTraits) -> Generated {
    let total = ui.slot_count.saturating_add(ui.progress_bars);
    let rows = total.div_ceil(INVENTORY_COLUMNS).max(1);

    let mut warnings = Vec::new();
    if rows > MAX_INVENTORY_ROWS {
        warnings.push(format!(
            "Layout needs {rows} rows; containers show at most {MAX_INVENTORY_ROWS}, so the screen will scroll"
        ));
    }
    if ui.text_fields > 0 {
        warnings.push("Text input fields cannot be represented in an inventory and were dropped".to_string());
    }
    if !ui.buttons.is_empty() {
        warnings.push(format!(
            "{} button(s) are represented as clickable placeholder items",
            ui.buttons.len()
        ));
    }

    Generated {
        replacement: Replacement::Inventory(InventoryLayout {
            rows: rows.min(MAX_INVENTORY_ROWS),
            columns: INVENTORY_COLUMNS,
            slot_count: ui.slot_count,
            progress_slots: ui.progress_bars,
            title: feature.name.clone(),
        }),
        feature_type: FeatureType::Block,
        description: format!(
            "Rebuilt '{}' as a {}-slot container inventory",
            feature.name, ui.slot_count
        ),
        warnings,
        suggestions: vec![
            "Verify slot ordering matches the original screen layout".to_string(),
            "Use item lore to label slots that had on-screen captions".to_string(),
        ],
    }
}

fn chat_commands(settings: &UiFallbackSettings, feature: &Feature, ui: &UiTraits) -> Generated {
    let feature_slug = slug(&feature.name);
    let arguments: Vec<String> = (1..=ui.text_fields).map(|i| format!("<input_{i}>")).collect();

    let commands = ui
        .buttons
        .iter()
        .map(|label| ChatCommand {
            name: format!("{}:{}_{}", settings.command_namespace, feature_slug, slug(label)),
            arguments: arguments.clone(),
            description: format!("Equivalent of the '{label}' button"),
        })
        .collect::<Vec<_>>();

    Generated {
        description: format!(
            "Replaced '{}' with {} chat command(s)",
            feature.name,
            commands.len()
        ),
        replacement: Replacement::ChatCommands(ChatCommandSet {
            namespace: settings.command_namespace.clone(),
            commands,
        }),
        feature_type: FeatureType::Command,
        warnings: vec!["Players must type commands instead of clicking buttons".to_string()],
        suggestions: vec![
            "Document the generated commands in the addon description".to_string(),
            "Consider binding frequent commands to an item use event".to_string(),
        ],
    }
}

fn book(feature: &Feature, ui: &UiTraits) -> Generated {
    Generated {
        replacement: Replacement::Book(BookLayout {
            title: feature.name.clone(),
            pages: ui.text_pages,
            navigation_buttons: ui.buttons.clone(),
        }),
        feature_type: FeatureType::Item,
        description: format!(
            "Moved the {} page(s) of '{}' into a written book",
            ui.text_pages, feature.name
        ),
        warnings: Vec::new(),
        suggestions: vec!["Check page breaks; book pages hold less text than custom screens".to_string()],
    }
}

fn interaction(feature: &Feature, ui: &UiTraits) -> Generated {
    let trigger = ui.opened_by.unwrap_or(InteractionTrigger::Block);
    Generated {
        replacement: Replacement::EntityInteraction(InteractionBinding {
            trigger,
            actions: ui.buttons.clone(),
        }),
        feature_type: FeatureType::Entity,
        description: format!(
            "Bound the {} action(s) of '{}' to direct interaction",
            ui.buttons.len(),
            feature.name
        ),
        warnings: if ui.buttons.len() > 1 {
            vec!["Multiple actions are cycled by sneak-interacting; discoverability is reduced".to_string()]
        } else {
            Vec::new()
        },
        suggestions: vec!["Add an action-bar message naming the selected action".to_string()],
    }
}

fn scoreboard(feature: &Feature, ui: &UiTraits, context: &ConversionContext) -> Generated {
    Generated {
        replacement: Replacement::Scoreboard(ScoreboardLayout {
            objective: format!("{}_{}", slug(&context.mod_id), slug(&feature.name)),
            display_slot: "sidebar".to_string(),
            tracked_values: ui.progress_bars.max(1),
        }),
        feature_type: FeatureType::Command,
        description: format!("Displayed the values of '{}' in the scoreboard sidebar", feature.name),
        warnings: Vec::new(),
        suggestions: vec!["Values are integers only; scale fractional gauges".to_string()],
    }
}

fn stub(feature: &Feature, ui: &UiTraits) -> Generated {
    let mut steps = vec![format!("Recreate '{}' with a server-side form or custom UI", feature.name)];
    if ui.slot_count > 0 {
        steps.push(format!("Split the {} slots across several containers", ui.slot_count));
    }
    if !ui.buttons.is_empty() {
        steps.push(format!("Map the buttons: {}", ui.buttons.join(", ")));
    }
    if ui.text_fields > 0 {
        steps.push("Collect text input through a modal form".to_string());
    }

    Generated {
        replacement: documentation_stub(feature, steps),
        feature_type: FeatureType::Other,
        description: format!("No structural match for '{}'; generated manual conversion notes", feature.name),
        warnings: Vec::new(),
        suggestions: vec!["Review the manual post-processing guide for this feature".to_string()],
    }
}

#[async_trait]
impl CompromiseStrategy for UiFallbackStrategy {
    fn name(&self) -> &str {
        UI_FALLBACK_STRATEGY
    }

    fn supported_types(&self) -> &[FeatureType] {
        &SUPPORTED
    }

    fn base_impact(&self) -> ImpactLevel {
        ImpactLevel::Medium
    }

    fn is_applicable(&self, feature: &Feature, _context: &ConversionContext) -> bool {
        self.settings.enabled && self.supports(feature.feature_type)
    }

    async fn estimate_impact(
        &self,
        feature: &Feature,
        _context: &ConversionContext,
    ) -> StrategyResult<ImpactEstimate> {
        if !self.supports(feature.feature_type) {
            return Err(StrategyError::UnsupportedFeature(feature.feature_type));
        }
        Ok(self.classify(feature).profile().estimate_for(feature))
    }

    #[instrument(skip_all, fields(feature_id = %feature.id, strategy = UI_FALLBACK_STRATEGY))]
    async fn apply(
        &self,
        feature: &Feature,
        context: &ConversionContext,
        options: &CompromiseOptions,
    ) -> StrategyResult<CompromiseResult> {
        if !self.supports(feature.feature_type) {
            return Err(StrategyError::UnsupportedFeature(feature.feature_type));
        }

        let variant = self.classify(feature);
        let profile = variant.profile();
        if !options.tolerates(profile.impact) {
            return Err(StrategyError::ImpactLimitExceeded {
                actual: profile.impact,
                max: options.max_impact_level,
            });
        }

        debug!(variant = variant.as_str(), "applying ui fallback");
        let generated = self.generate(variant, feature, context);
        let modified = feature.derive_replacement(
            variant.as_str(),
            generated.feature_type,
            generated.description.clone(),
            generated.replacement,
        );

        let metadata = CompromiseMetadata::new(
            UI_FALLBACK_STRATEGY,
            variant.as_str(),
            profile.confidence_for(feature),
            profile.reversible,
        );

        let mut result = CompromiseResult::applied(
            modified,
            generated.description,
            profile.impact,
            profile.user_experience_impact,
            metadata,
        )
        .with_suggestions(generated.suggestions);
        result.warnings = generated.warnings;

        if variant == UiCompromise::DocumentationStub && !options.preferences.accept_functionality_loss {
            result = result.with_warning(functionality_loss_warning(feature));
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::feature::CompatibilityTier;

    fn screen(ui: UiTraits) -> Feature {
        Feature::new("screen", "Alloy Furnace", FeatureType::Gui, CompatibilityTier::NoEquivalent)
            .with_ui(ui)
    }

    fn context() -> ConversionContext {
        ConversionContext::new("alloys", "1.2.0")
    }

    #[test]
    fn test_classification() {
        let strategy = UiFallbackStrategy::default();

        let slots = screen(UiTraits { slot_count: 3, progress_bars: 1, ..Default::default() });
        assert_eq!(strategy.classify(&slots), UiCompromise::InventoryAdaptation);

        let too_many = screen(UiTraits {
            slot_count: 200,
            buttons: vec!["Sort".to_string()],
            ..Default::default()
        });
        assert_eq!(strategy.classify(&too_many), UiCompromise::ChatCommands);

        let guide = screen(UiTraits { text_pages: 12, buttons: vec!["Next".into(), "Back".into()], ..Default::default() });
        assert_eq!(strategy.classify(&guide), UiCompromise::BookInterface);

        let gauge = screen(UiTraits { displays_values: true, progress_bars: 2, ..Default::default() });
        assert_eq!(strategy.classify(&gauge), UiCompromise::ScoreboardDisplay);

        let lever = screen(UiTraits {
            buttons: vec!["Toggle".to_string()],
            opened_by: Some(InteractionTrigger::Block),
            ..Default::default()
        });
        assert_eq!(strategy.classify(&lever), UiCompromise::EntityInteraction);

        let hud = Feature::new("hud", "Mana Bar", FeatureType::Hud, CompatibilityTier::NoEquivalent)
            .with_ui(UiTraits::default());
        assert_eq!(strategy.classify(&hud), UiCompromise::ScoreboardDisplay);

        let bare = Feature::new("bare", "Bare", FeatureType::Menu, CompatibilityTier::Unanalyzable);
        assert_eq!(strategy.classify(&bare), UiCompromise::DocumentationStub);
    }

    #[test]
    fn test_unsupported_type_not_applicable() {
        let strategy = UiFallbackStrategy::default();
        let block = Feature::new("b", "Block", FeatureType::Block, CompatibilityTier::NoEquivalent);
        assert!(!strategy.is_applicable(&block, &context()));

        let disabled = UiFallbackStrategy::new(UiFallbackSettings {
            enabled: false,
            ..Default::default()
        });
        assert!(!disabled.is_applicable(&screen(UiTraits::default()), &context()));
    }

    #[tokio::test]
    async fn test_inventory_apply() {
        let strategy = UiFallbackStrategy::default();
        let feature = screen(UiTraits {
            slot_count: 12,
            progress_bars: 1,
            text_fields: 1,
            ..Default::default()
        });
        let original = feature.clone();

        let result = strategy
            .apply(&feature, &context(), &CompromiseOptions::default())
            .await
            .expect("inventory adaptation should apply");

        assert_eq!(feature, original);
        assert!(result.success);
        assert_eq!(result.impact_level, ImpactLevel::Medium);
        assert_eq!(result.user_experience_impact, 40);
        assert_eq!(result.metadata.strategy_used, UI_FALLBACK_STRATEGY);
        assert_eq!(result.metadata.variant, "inventory");
        assert!(result.metadata.reversible);
        assert!(result.warnings.iter().any(|w| w.contains("Text input")));

        let modified = result.modified_feature.expect("modified feature");
        assert_eq!(modified.id, "screen_inventory");
        match modified.properties.replacement {
            Some(Replacement::Inventory(layout)) => {
                assert_eq!(layout.rows, 2);
                assert_eq!(layout.slot_count, 12);
                assert_eq!(layout.progress_slots, 1);
            }
            other => panic!("unexpected replacement: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_inventory_with_extreme_progress_bar_count() {
        let strategy = UiFallbackStrategy::default();
        let feature = screen(UiTraits {
            slot_count: 1,
            progress_bars: u32::MAX,
            ..Default::default()
        });

        let result = strategy
            .apply(&feature, &context(), &CompromiseOptions::default())
            .await
            .expect("inventory adaptation should apply");

        assert!(result.warnings.iter().any(|w| w.contains("rows")));
        match result.modified_feature.and_then(|f| f.properties.replacement) {
            Some(Replacement::Inventory(layout)) => {
                assert_eq!(layout.rows, MAX_INVENTORY_ROWS);
                assert_eq!(layout.progress_slots, u32::MAX);
            }
            other => panic!("unexpected replacement: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_chat_commands_use_namespace() {
        let strategy = UiFallbackStrategy::new(UiFallbackSettings {
            command_namespace: "alloys".to_string(),
            ..Default::default()
        });
        let feature = screen(UiTraits {
            buttons: vec!["Start Smelting".to_string(), "Eject".to_string()],
            text_fields: 1,
            ..Default::default()
        });

        let result = strategy
            .apply(&feature, &context(), &CompromiseOptions::default())
            .await
            .expect("chat commands should apply");

        assert_eq!(result.impact_level, ImpactLevel::High);
        let Some(Replacement::ChatCommands(set)) = result.modified_feature.and_then(|f| f.properties.replacement) else {
            panic!("expected chat commands");
        };
        assert_eq!(set.commands[0].name, "alloys:alloy_furnace_start_smelting");
        assert_eq!(set.commands[1].arguments, vec!["<input_1>".to_string()]);
    }

    #[tokio::test]
    async fn test_stub_is_high_impact_and_irreversible() {
        let strategy = UiFallbackStrategy::default();
        let feature = Feature::new("map", "World Map", FeatureType::Gui, CompatibilityTier::Unanalyzable)
            .with_source("src/WorldMapScreen.java", None);

        let estimate = strategy.estimate_impact(&feature, &context()).await.expect("estimate");
        assert_eq!(estimate.impact_level, ImpactLevel::High);
        assert_eq!(estimate.confidence, 35);

        let result = strategy
            .apply(&feature, &context(), &CompromiseOptions::default())
            .await
            .expect("stub applies");
        assert!(!result.metadata.reversible);
        assert!(result.warnings.iter().any(|w| w.contains("documentation only")));
        assert!(!result
            .modified_feature
            .and_then(|f| f.properties.replacement)
            .is_some_and(|r| r.is_embeddable()));
    }

    #[tokio::test]
    async fn test_apply_respects_impact_limit() {
        let strategy = UiFallbackStrategy::default();
        let feature = Feature::new("map", "World Map", FeatureType::Gui, CompatibilityTier::NoEquivalent);
        let options = CompromiseOptions::default().with_max_impact(ImpactLevel::Medium);

        let err = strategy.apply(&feature, &context(), &options).await.unwrap_err();
        assert_eq!(
            err,
            StrategyError::ImpactLimitExceeded {
                actual: ImpactLevel::High,
                max: ImpactLevel::Medium
            }
        );
    }
}
