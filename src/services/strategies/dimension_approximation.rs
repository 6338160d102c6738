//! Dimension approximation strategy.
//!
//! The target platform cannot register new dimensions. Small bounded
//! dimensions become structures, biome-only dimensions are merged into
//! overworld generation, and everything else gets a reserved overworld region
//! reached by teleport.

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::{documentation_stub, functionality_loss_warning, slug, Profile};
use crate::domain::error::{StrategyError, StrategyResult};
use crate::domain::models::compromise::{
    CompromiseMetadata, CompromiseOptions, CompromiseResult, ImpactEstimate, ImpactLevel,
};
use crate::domain::models::config::DimensionSettings;
use crate::domain::models::feature::{ConversionContext, DimensionTraits, Feature, FeatureType};
use crate::domain::models::replacement::{
    BiomeOverlay, Replacement, ReservedRegion, StructurePlacement,
};
use crate::domain::ports::CompromiseStrategy;

/// Registered name of the dimension approximation strategy.
pub const DIMENSION_APPROXIMATION_STRATEGY: &str = "dimension_approximation";

const SUPPORTED: [FeatureType; 3] = [
    FeatureType::Dimension,
    FeatureType::WorldGen,
    FeatureType::Biome,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DimensionCompromise {
    StructureInstance,
    BiomeOverlay,
    ReservedRegion,
    DocumentationStub,
}

impl DimensionCompromise {
    pub const fn profile(self) -> Profile {
        match self {
            DimensionCompromise::StructureInstance => Profile::new(ImpactLevel::Medium, 55, 70, true),
            DimensionCompromise::BiomeOverlay => Profile::new(ImpactLevel::Medium, 45, 75, true),
            DimensionCompromise::ReservedRegion => Profile::new(ImpactLevel::High, 70, 65, true),
            DimensionCompromise::DocumentationStub => Profile::new(ImpactLevel::High, 85, 50, false),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            DimensionCompromise::StructureInstance => "structure_instance",
            DimensionCompromise::BiomeOverlay => "biome_overlay",
            DimensionCompromise::ReservedRegion => "reserved_region",
            DimensionCompromise::DocumentationStub => "documentation",
        }
    }
}

/// Approximates custom dimensions inside the overworld.
#[derive(Debug, Clone, Default)]
pub struct DimensionApproximationStrategy {
    settings: DimensionSettings,
}

impl DimensionApproximationStrategy {
    pub fn new(settings: DimensionSettings) -> Self {
        Self { settings }
    }

    pub fn classify(&self, feature: &Feature) -> DimensionCompromise {
        let Some(d) = feature.properties.dimension.as_ref() else {
            return if feature.feature_type == FeatureType::Biome {
                DimensionCompromise::BiomeOverlay
            } else {
                DimensionCompromise::DocumentationStub
            };
        };

        if d.bounded_size
            .is_some_and(|size| size > 0 && size <= self.settings.max_structure_size)
        {
            return DimensionCompromise::StructureInstance;
        }
        if feature.feature_type == FeatureType::Biome
            || (!d.custom_terrain && !d.has_portal && !d.biomes.is_empty())
        {
            return DimensionCompromise::BiomeOverlay;
        }
        if d.has_portal || d.custom_terrain {
            return DimensionCompromise::ReservedRegion;
        }
        DimensionCompromise::DocumentationStub
    }

    /// Deterministic region origin for a feature id.
    fn region_origin(&self, feature_id: &str) -> StrategyResult<(i64, i64)> {
        let hash = feature_id
            .bytes()
            .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(u64::from(b)));
        let slot = hash % DimensionSettings::REGION_SLOTS;
        self.settings.region_origin(slot).ok_or_else(|| {
            StrategyError::ApplyFailed(format!(
                "Reserved region slot {slot} for '{feature_id}' lies outside the world border"
            ))
        })
    }
}

struct Generated {
    replacement: Replacement,
    feature_type: FeatureType,
    description: String,
    warnings: Vec<String>,
    suggestions: Vec<String>,
}

fn structure(feature: &Feature, d: &DimensionTraits, context: &ConversionContext) -> Generated {
    let size = d.bounded_size.unwrap_or_default();
    let entry = if d.has_portal {
        "portal frame loads the structure on activation"
    } else {
        "function places the structure on demand"
    };

    Generated {
        replacement: Replacement::StructureInstance(StructurePlacement {
            structure: format!("{}:{}", slug(&context.mod_id), slug(&feature.name)),
            size,
            entry_mechanism: entry.to_string(),
        }),
        feature_type: FeatureType::WorldGen,
        description: format!(
            "Shipped the {size}x{size} dimension '{}' as a placeable structure",
            feature.name
        ),
        warnings: if d.custom_sky {
            vec!["Custom sky rendering is not available inside a structure".to_string()]
        } else {
            Vec::new()
        },
        suggestions: vec!["Place the structure far from spawn to avoid terrain overlap".to_string()],
    }
}

fn biome_overlay(feature: &Feature, d: Option<&DimensionTraits>) -> Generated {
    let biomes = match d {
        Some(d) if !d.biomes.is_empty() => d.biomes.clone(),
        _ => vec![slug(&feature.name)],
    };
    let custom_sky_dropped = d.is_some_and(|d| d.custom_sky);

    Generated {
        description: format!(
            "Merged {} biome(s) of '{}' into overworld generation",
            biomes.len(),
            feature.name
        ),
        replacement: Replacement::BiomeOverlay(BiomeOverlay {
            biomes,
            custom_sky_dropped,
        }),
        feature_type: FeatureType::Biome,
        warnings: if custom_sky_dropped {
            vec!["Custom sky colors are approximated with biome fog settings".to_string()]
        } else {
            Vec::new()
        },
        suggestions: vec!["Lower biome weights so the overlay does not dominate generation".to_string()],
    }
}

fn reserved_region(
    origin: (i64, i64),
    feature: &Feature,
    d: &DimensionTraits,
    context: &ConversionContext,
) -> Generated {
    let mut warnings = vec![format!(
        "'{}' is reached by teleport to ({}, {}) instead of a separate dimension",
        feature.name, origin.0, origin.1
    )];
    if d.custom_terrain {
        warnings.push("Custom terrain generation is approximated with pre-built chunks".to_string());
    }
    if d.custom_sky {
        warnings.push("Custom sky rendering is dropped".to_string());
    }

    Generated {
        replacement: Replacement::ReservedRegion(ReservedRegion {
            origin_x: origin.0,
            origin_z: origin.1,
            teleport_function: format!("{}/enter_{}", slug(&context.mod_id), slug(&feature.name)),
            custom_terrain_dropped: d.custom_terrain,
        }),
        feature_type: FeatureType::WorldGen,
        description: format!("Reserved an overworld region standing in for '{}'", feature.name),
        warnings,
        suggestions: vec![
            "Surround the region with barrier blocks to keep players inside".to_string(),
            "Pre-generate the region terrain with structure files".to_string(),
        ],
    }
}

fn stub(feature: &Feature) -> Generated {
    let steps = vec![
        format!("Decide how players should reach '{}' on the target platform", feature.name),
        "Recreate its terrain with structures or a reserved region".to_string(),
    ];

    Generated {
        replacement: documentation_stub(feature, steps),
        feature_type: FeatureType::Other,
        description: format!("No dimension approximation for '{}'; generated manual conversion notes", feature.name),
        warnings: Vec::new(),
        suggestions: vec!["Review the manual post-processing guide for this feature".to_string()],
    }
}

#[async_trait]
impl CompromiseStrategy for DimensionApproximationStrategy {
    fn name(&self) -> &str {
        DIMENSION_APPROXIMATION_STRATEGY
    }

    fn supported_types(&self) -> &[FeatureType] {
        &SUPPORTED
    }

    fn base_impact(&self) -> ImpactLevel {
        ImpactLevel::High
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

    #[instrument(skip_all, fields(feature_id = %feature.id, strategy = DIMENSION_APPROXIMATION_STRATEGY))]
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

        let traits = feature.properties.dimension.as_ref();
        let empty = DimensionTraits::default();

        debug!(variant = variant.as_str(), "applying dimension approximation");
        let generated = match variant {
            DimensionCompromise::StructureInstance => {
                structure(feature, traits.unwrap_or(&empty), context)
            }
            DimensionCompromise::BiomeOverlay => biome_overlay(feature, traits),
            DimensionCompromise::ReservedRegion => reserved_region(
                self.region_origin(&feature.id)?,
                feature,
                traits.unwrap_or(&empty),
                context,
            ),
            DimensionCompromise::DocumentationStub => stub(feature),
        };

        let modified = feature.derive_replacement(
            variant.as_str(),
            generated.feature_type,
            generated.description.clone(),
            generated.replacement,
        );
        let metadata = CompromiseMetadata::new(
            DIMENSION_APPROXIMATION_STRATEGY,
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

        if variant == DimensionCompromise::DocumentationStub
            && !options.preferences.accept_functionality_loss
        {
            result = result.with_warning(functionality_loss_warning(feature));
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::feature::CompatibilityTier;

    fn dimension(traits: DimensionTraits) -> Feature {
        Feature::new("aether", "The Aether", FeatureType::Dimension, CompatibilityTier::NoEquivalent)
            .with_dimension(traits)
    }

    #[test]
    fn test_classification() {
        let strategy = DimensionApproximationStrategy::default();

        let pocket = dimension(DimensionTraits { bounded_size: Some(48), has_portal: true, ..Default::default() });
        assert_eq!(strategy.classify(&pocket), DimensionCompromise::StructureInstance);

        let biomes = dimension(DimensionTraits { biomes: vec!["cloud_fields".to_string()], ..Default::default() });
        assert_eq!(strategy.classify(&biomes), DimensionCompromise::BiomeOverlay);

        let full = dimension(DimensionTraits { custom_terrain: true, has_portal: true, ..Default::default() });
        assert_eq!(strategy.classify(&full), DimensionCompromise::ReservedRegion);

        let empty = dimension(DimensionTraits::default());
        assert_eq!(strategy.classify(&empty), DimensionCompromise::DocumentationStub);

        let biome = Feature::new("b", "Crystal Caves", FeatureType::Biome, CompatibilityTier::Approximate);
        assert_eq!(strategy.classify(&biome), DimensionCompromise::BiomeOverlay);
    }

    #[tokio::test]
    async fn test_reserved_region_is_deterministic() {
        let strategy = DimensionApproximationStrategy::default();
        let feature = dimension(DimensionTraits {
            custom_terrain: true,
            has_portal: true,
            custom_sky: true,
            ..Default::default()
        });
        let context = ConversionContext::new("aether_mod", "2.0");

        let first = strategy
            .apply(&feature, &context, &CompromiseOptions::default())
            .await
            .expect("reserved region applies");
        let second = strategy
            .apply(&feature, &context, &CompromiseOptions::default())
            .await
            .expect("reserved region applies");

        assert_eq!(first.impact_level, ImpactLevel::High);
        assert_eq!(first.warnings.len(), 3);
        let region = |r: CompromiseResult| match r.modified_feature.and_then(|f| f.properties.replacement) {
            Some(Replacement::ReservedRegion(region)) => region,
            other => panic!("unexpected replacement: {other:?}"),
        };
        let a = region(first);
        let b = region(second);
        assert_eq!(a, b);
        assert!(a.origin_x >= 1_000_000);
        assert_eq!(a.teleport_function, "aether_mod/enter_the_aether");
    }

    #[tokio::test]
    async fn test_region_beyond_world_border_fails_apply() {
        let strategy = DimensionApproximationStrategy::new(DimensionSettings {
            region_spacing: i64::MAX / 2,
            ..Default::default()
        });
        let feature = dimension(DimensionTraits { has_portal: true, ..Default::default() });
        let original = feature.clone();

        let err = strategy
            .apply(&feature, &ConversionContext::new("m", "1"), &CompromiseOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, StrategyError::ApplyFailed(msg) if msg.contains("world border")));
        assert_eq!(feature, original);
    }

    #[test]
    fn test_region_origin_checks_bounds() {
        let settings = DimensionSettings::default();
        assert_eq!(settings.region_origin(0), Some((1_000_000, 1_000_000)));
        assert_eq!(settings.region_origin(2), Some((1_100_000, 1_000_000)));

        let far = DimensionSettings {
            region_offset: i64::MAX,
            ..Default::default()
        };
        assert_eq!(far.region_origin(1), None);
        assert_eq!(far.region_origin(0), None);
    }

    #[tokio::test]
    async fn test_reserved_region_refused_under_medium_limit() {
        let strategy = DimensionApproximationStrategy::default();
        let feature = dimension(DimensionTraits { custom_terrain: true, ..Default::default() });
        let options = CompromiseOptions::default().with_max_impact(ImpactLevel::Medium);

        let estimate = strategy
            .estimate_impact(&feature, &ConversionContext::new("m", "1"))
            .await
            .expect("estimate");
        assert_eq!(estimate.impact_level, ImpactLevel::High);

        let err = strategy
            .apply(&feature, &ConversionContext::new("m", "1"), &options)
            .await
            .unwrap_err();
        assert!(matches!(err, StrategyError::ImpactLimitExceeded { .. }));
    }
}
