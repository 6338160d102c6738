//! Rendering simplification strategy.
//!
//! Custom shaders and renderers are approximated with stock particles,
//! materials, flipbook textures, or static geometry.

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::{documentation_stub, functionality_loss_warning, slug, Profile};
use crate::domain::error::{StrategyError, StrategyResult};
use crate::domain::models::compromise::{
    CompromiseMetadata, CompromiseOptions, CompromiseResult, ImpactEstimate, ImpactLevel,
};
use crate::domain::models::config::RenderingSettings;
use crate::domain::models::feature::{
    ConversionContext, Feature, FeatureType, RenderingTraits, ShaderEffect,
};
use crate::domain::models::replacement::{
    FlipbookAnimation, MaterialOverride, ParticleEmitter, Replacement, StaticModel,
};
use crate::domain::ports::CompromiseStrategy;

/// Registered name of the rendering simplification strategy.
pub const RENDERING_SIMPLIFICATION_STRATEGY: &str = "rendering_simplification";

const SUPPORTED: [FeatureType; 3] = [
    FeatureType::Rendering,
    FeatureType::Shader,
    FeatureType::Particle,
];

/// Sub-cases of rendering simplification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderingCompromise {
    ParticleSubstitution,
    MaterialSubstitution,
    FlipbookTexture,
    StaticGeometry,
    DocumentationStub,
}

impl RenderingCompromise {
    pub const fn profile(self) -> Profile {
        match self {
            RenderingCompromise::ParticleSubstitution => Profile::new(ImpactLevel::Low, 20, 80, true),
            RenderingCompromise::MaterialSubstitution => Profile::new(ImpactLevel::Medium, 40, 75, true),
            RenderingCompromise::FlipbookTexture => Profile::new(ImpactLevel::Low, 25, 85, true),
            RenderingCompromise::StaticGeometry => Profile::new(ImpactLevel::Medium, 55, 70, true),
            RenderingCompromise::DocumentationStub => Profile::new(ImpactLevel::High, 80, 50, false),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            RenderingCompromise::ParticleSubstitution => "particle_substitution",
            RenderingCompromise::MaterialSubstitution => "material_substitution",
            RenderingCompromise::FlipbookTexture => "flipbook_texture",
            RenderingCompromise::StaticGeometry => "static_geometry",
            RenderingCompromise::DocumentationStub => "documentation",
        }
    }
}

/// Approximates custom rendering with stock rendering features.
#[derive(Debug, Clone, Default)]
pub struct RenderingSimplificationStrategy {
    settings: RenderingSettings,
}

impl RenderingSimplificationStrategy {
    pub fn new(settings: RenderingSettings) -> Self {
        Self { settings }
    }

    /// Pick the sub-case from the feature's rendering traits.
    pub fn classify(&self, feature: &Feature) -> RenderingCompromise {
        let Some(r) = feature.properties.rendering.as_ref() else {
            return if feature.feature_type == FeatureType::Particle {
                RenderingCompromise::ParticleSubstitution
            } else {
                RenderingCompromise::DocumentationStub
            };
        };

        if !r.custom_shader
            && (feature.feature_type == FeatureType::Particle || r.particle_count > 0)
        {
            return RenderingCompromise::ParticleSubstitution;
        }
        if r.custom_shader
            && self.settings.allow_material_substitution
            && r.shader_effects.iter().any(ShaderEffect::has_material_equivalent)
        {
            return RenderingCompromise::MaterialSubstitution;
        }
        if !r.custom_shader && r.animated && r.frame_count > 1 {
            return RenderingCompromise::FlipbookTexture;
        }
        if !r.custom_shader && r.custom_model {
            return RenderingCompromise::StaticGeometry;
        }
        RenderingCompromise::DocumentationStub
    }
}

struct Generated {
    replacement: Replacement,
    feature_type: FeatureType,
    description: String,
    warnings: Vec<String>,
    suggestions: Vec<String>,
}

fn particles(
    settings: &RenderingSettings,
    feature: &Feature,
    r: &RenderingTraits,
    context: &ConversionContext,
    options: &CompromiseOptions,
) -> Generated {
    let requested = if r.particle_count > 0 { r.particle_count } else { settings.max_particles };
    let mut budget = requested.min(settings.max_particles);
    let mut warnings = Vec::new();

    if options.performance_constrained {
        budget = (budget / 2).max(1);
        warnings.push(format!("Particle budget halved to {budget} for performance-constrained targets"));
    }
    if budget < requested {
        warnings.push(format!("Particle count reduced from {requested} to {budget}"));
    }

    Generated {
        replacement: Replacement::ParticleSubstitution(ParticleEmitter {
            identifier: format!("{}:{}_particle", slug(&context.mod_id), slug(&feature.name)),
            max_particles: budget,
            texture: r.texture.clone(),
        }),
        feature_type: FeatureType::Particle,
        description: format!("Approximated '{}' with a stock particle emitter", feature.name),
        warnings,
        suggestions: vec!["Tune emitter lifetime and velocity against the original effect".to_string()],
    }
}

fn material(feature: &Feature, r: &RenderingTraits) -> Generated {
    let emissive = r.shader_effects.contains(&ShaderEffect::Glow);
    let translucent = r.shader_effects.contains(&ShaderEffect::Transparency);
    let material = match (emissive, translucent) {
        (true, true) => "entity_emissive_alpha",
        (true, false) => "entity_emissive",
        (false, _) => "entity_alphablend",
    };
    let dropped: Vec<String> = r
        .shader_effects
        .iter()
        .filter(|effect| !effect.has_material_equivalent())
        .map(|effect| format!("{effect:?}").to_lowercase())
        .collect();

    let warnings = if dropped.is_empty() {
        Vec::new()
    } else {
        vec![format!("Shader effects without a material equivalent were dropped: {}", dropped.join(", "))]
    };

    Generated {
        replacement: Replacement::MaterialSubstitution(MaterialOverride {
            material: material.to_string(),
            emissive,
            translucent,
            dropped_effects: dropped,
        }),
        feature_type: FeatureType::Rendering,
        description: format!("Replaced the custom shader of '{}' with the {material} material", feature.name),
        warnings,
        suggestions: vec!["Bake remaining shader detail into the texture where possible".to_string()],
    }
}

fn flipbook(
    settings: &RenderingSettings,
    feature: &Feature,
    r: &RenderingTraits,
    options: &CompromiseOptions,
) -> Generated {
    let ticks = if options.performance_constrained {
        settings.ticks_per_frame.saturating_mul(2)
    } else {
        settings.ticks_per_frame
    };

    Generated {
        replacement: Replacement::FlipbookTexture(FlipbookAnimation {
            texture: r
                .texture
                .clone()
                .unwrap_or_else(|| format!("textures/{}", slug(&feature.name))),
            frames: r.frame_count,
            ticks_per_frame: ticks,
        }),
        feature_type: FeatureType::Rendering,
        description: format!("Baked the animation of '{}' into a {}-frame flipbook", feature.name, r.frame_count),
        warnings: Vec::new(),
        suggestions: vec!["Stack the frames vertically in the texture atlas".to_string()],
    }
}

fn static_geometry(feature: &Feature, r: &RenderingTraits, context: &ConversionContext) -> Generated {
    Generated {
        replacement: Replacement::StaticGeometry(StaticModel {
            geometry: format!("geometry.{}.{}", slug(&context.mod_id), slug(&feature.name)),
            texture: r.texture.clone(),
        }),
        feature_type: FeatureType::Rendering,
        description: format!("Froze the dynamic renderer of '{}' into static geometry", feature.name),
        warnings: vec!["Runtime model transformations are no longer rendered".to_string()],
        suggestions: vec!["Recreate simple motion with entity animations".to_string()],
    }
}

fn stub(feature: &Feature, r: &RenderingTraits) -> Generated {
    let mut steps = vec![format!("Reimplement the visual effect of '{}' by hand", feature.name)];
    if r.custom_shader {
        steps.push("Port the shader logic to a supported material or texture".to_string());
    }
    if r.custom_model {
        steps.push("Export the model to the target geometry format".to_string());
    }

    Generated {
        replacement: documentation_stub(feature, steps),
        feature_type: FeatureType::Other,
        description: format!("No rendering approximation for '{}'; generated manual conversion notes", feature.name),
        warnings: Vec::new(),
        suggestions: vec!["Review the manual post-processing guide for this feature".to_string()],
    }
}

#[async_trait]
impl CompromiseStrategy for RenderingSimplificationStrategy {
    fn name(&self) -> &str {
        RENDERING_SIMPLIFICATION_STRATEGY
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

    #[instrument(skip_all, fields(feature_id = %feature.id, strategy = RENDERING_SIMPLIFICATION_STRATEGY))]
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

        let empty = RenderingTraits::default();
        let traits = feature.properties.rendering.as_ref().unwrap_or(&empty);

        debug!(variant = variant.as_str(), "applying rendering simplification");
        let generated = match variant {
            RenderingCompromise::ParticleSubstitution => {
                particles(&self.settings, feature, traits, context, options)
            }
            RenderingCompromise::MaterialSubstitution => material(feature, traits),
            RenderingCompromise::FlipbookTexture => flipbook(&self.settings, feature, traits, options),
            RenderingCompromise::StaticGeometry => static_geometry(feature, traits, context),
            RenderingCompromise::DocumentationStub => stub(feature, traits),
        };

        let modified = feature.derive_replacement(
            variant.as_str(),
            generated.feature_type,
            generated.description.clone(),
            generated.replacement,
        );
        let metadata = CompromiseMetadata::new(
            RENDERING_SIMPLIFICATION_STRATEGY,
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

        if variant == RenderingCompromise::DocumentationStub
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

    fn rendering(feature_type: FeatureType, traits: RenderingTraits) -> Feature {
        Feature::new("fx", "Plasma Beam", feature_type, CompatibilityTier::NoEquivalent)
            .with_rendering(traits)
    }

    #[test]
    fn test_classification() {
        let strategy = RenderingSimplificationStrategy::default();

        let sparks = rendering(FeatureType::Particle, RenderingTraits { particle_count: 200, ..Default::default() });
        assert_eq!(strategy.classify(&sparks), RenderingCompromise::ParticleSubstitution);

        let glow = rendering(
            FeatureType::Shader,
            RenderingTraits {
                custom_shader: true,
                shader_effects: vec![ShaderEffect::Glow, ShaderEffect::Distortion],
                ..Default::default()
            },
        );
        assert_eq!(strategy.classify(&glow), RenderingCompromise::MaterialSubstitution);

        let no_materials = RenderingSimplificationStrategy::new(RenderingSettings {
            allow_material_substitution: false,
            ..Default::default()
        });
        assert_eq!(no_materials.classify(&glow), RenderingCompromise::DocumentationStub);

        let animated = rendering(
            FeatureType::Rendering,
            RenderingTraits { animated: true, frame_count: 8, ..Default::default() },
        );
        assert_eq!(strategy.classify(&animated), RenderingCompromise::FlipbookTexture);

        let model = rendering(
            FeatureType::Rendering,
            RenderingTraits { custom_model: true, ..Default::default() },
        );
        assert_eq!(strategy.classify(&model), RenderingCompromise::StaticGeometry);

        let bare = Feature::new("x", "X", FeatureType::Rendering, CompatibilityTier::NoEquivalent);
        assert_eq!(strategy.classify(&bare), RenderingCompromise::DocumentationStub);
    }

    #[tokio::test]
    async fn test_particle_budget_halved_when_constrained() {
        let strategy = RenderingSimplificationStrategy::default();
        let feature = rendering(FeatureType::Particle, RenderingTraits { particle_count: 200, ..Default::default() });
        let options = CompromiseOptions {
            performance_constrained: true,
            ..CompromiseOptions::default()
        };

        let result = strategy
            .apply(&feature, &ConversionContext::new("Plasma Mod", "1.0"), &options)
            .await
            .expect("particle substitution applies");

        assert_eq!(result.impact_level, ImpactLevel::Low);
        let Some(Replacement::ParticleSubstitution(emitter)) =
            result.modified_feature.and_then(|f| f.properties.replacement)
        else {
            panic!("expected particle emitter");
        };
        assert_eq!(emitter.max_particles, 32);
        assert_eq!(emitter.identifier, "plasma_mod:plasma_beam_particle");
    }

    #[tokio::test]
    async fn test_flipbook_frame_time_saturates_when_constrained() {
        let strategy = RenderingSimplificationStrategy::new(RenderingSettings {
            ticks_per_frame: u32::MAX,
            ..Default::default()
        });
        let feature = rendering(
            FeatureType::Rendering,
            RenderingTraits { animated: true, frame_count: 8, ..Default::default() },
        );
        let options = CompromiseOptions {
            performance_constrained: true,
            ..CompromiseOptions::default()
        };
        assert_eq!(strategy.classify(&feature), RenderingCompromise::FlipbookTexture);

        let result = strategy
            .apply(&feature, &ConversionContext::new("m", "1"), &options)
            .await
            .expect("flipbook applies");

        let Some(Replacement::FlipbookTexture(flipbook)) =
            result.modified_feature.and_then(|f| f.properties.replacement)
        else {
            panic!("expected flipbook");
        };
        assert_eq!(flipbook.ticks_per_frame, u32::MAX);
        assert_eq!(flipbook.frames, 8);
    }

    #[tokio::test]
    async fn test_material_lists_dropped_effects() {
        let strategy = RenderingSimplificationStrategy::default();
        let feature = rendering(
            FeatureType::Shader,
            RenderingTraits {
                custom_shader: true,
                shader_effects: vec![ShaderEffect::Glow, ShaderEffect::Transparency, ShaderEffect::Bloom],
                ..Default::default()
            },
        );

        let result = strategy
            .apply(&feature, &ConversionContext::new("m", "1"), &CompromiseOptions::default())
            .await
            .expect("material substitution applies");

        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("bloom"));
        let Some(Replacement::MaterialSubstitution(material)) =
            result.modified_feature.and_then(|f| f.properties.replacement)
        else {
            panic!("expected material override");
        };
        assert_eq!(material.material, "entity_emissive_alpha");
    }

    #[tokio::test]
    async fn test_rejects_unsupported_type() {
        let strategy = RenderingSimplificationStrategy::default();
        let feature = Feature::new("g", "G", FeatureType::Gui, CompatibilityTier::NoEquivalent);
        let err = strategy
            .estimate_impact(&feature, &ConversionContext::new("m", "1"))
            .await
            .unwrap_err();
        assert_eq!(err, StrategyError::UnsupportedFeature(FeatureType::Gui));
    }
}
