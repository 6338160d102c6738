mod common;

use common::{context, gui_feature, FixedStrategy};
use modbridge::services::strategy_selector::Ranking;
use modbridge::{
    CompromiseOptions, FeatureType, ImpactLevel, SelectionCriteria, StrategyRegistry,
    StrategySelector,
};
use proptest::prelude::*;
use std::sync::Arc;

fn impact_level() -> impl Strategy<Value = ImpactLevel> {
    prop_oneof![
        Just(ImpactLevel::Low),
        Just(ImpactLevel::Medium),
        Just(ImpactLevel::High),
    ]
}

fn build_selector(specs: &[(ImpactLevel, u8)]) -> StrategySelector {
    let mut registry = StrategyRegistry::new();
    for (i, (impact, confidence)) in specs.iter().enumerate() {
        registry.register(
            FeatureType::Gui,
            FixedStrategy::new(&format!("s{i}"), *impact, *confidence).shared(),
        );
    }
    StrategySelector::new(Arc::new(registry))
}

fn rank(
    selector: &StrategySelector,
    options: &CompromiseOptions,
    criteria: &SelectionCriteria,
) -> Ranking {
    tokio_test::block_on(selector.rank(&gui_feature("screen"), &context(), options, criteria))
}

fn names(ranking: &Ranking) -> Vec<String> {
    ranking
        .ranked
        .iter()
        .map(|c| c.strategy.name().to_string())
        .collect()
}

proptest! {
    /// Property: ranking the same input twice yields the same order
    #[test]
    fn prop_ranking_is_deterministic(
        specs in prop::collection::vec((impact_level(), 0u8..=100), 1..8),
        max in impact_level(),
    ) {
        let selector = build_selector(&specs);
        let options = CompromiseOptions::default().with_max_impact(max);
        let criteria = SelectionCriteria::default();

        let first = rank(&selector, &options, &criteria);
        let second = rank(&selector, &options, &criteria);

        prop_assert_eq!(names(&first), names(&second));
    }

    /// Property: no ranked candidate exceeds the impact ceiling, and every
    /// candidate is either ranked or rejected
    #[test]
    fn prop_impact_ceiling_is_respected(
        specs in prop::collection::vec((impact_level(), 0u8..=100), 1..8),
        max in impact_level(),
    ) {
        let selector = build_selector(&specs);
        let options = CompromiseOptions::default().with_max_impact(max);
        let ranking = rank(&selector, &options, &SelectionCriteria::default());

        for candidate in &ranking.ranked {
            prop_assert!(options.tolerates(candidate.estimate.impact_level));
        }
        let allowed = specs.iter().filter(|(impact, _)| options.tolerates(*impact)).count();
        prop_assert_eq!(ranking.ranked.len(), allowed);
        prop_assert_eq!(ranking.ranked.len() + ranking.rejected.len(), specs.len());
    }

    /// Property: scores descend and equal scores keep registration order
    #[test]
    fn prop_sorted_with_stable_ties(
        specs in prop::collection::vec((impact_level(), 0u8..=100), 1..8),
        impact_weight in 0.0f64..5.0,
        confidence_weight in 0.0f64..5.0,
    ) {
        let selector = build_selector(&specs);
        let criteria = SelectionCriteria::new(impact_weight, confidence_weight, 0.0);
        let ranking = rank(&selector, &CompromiseOptions::default(), &criteria);

        for pair in ranking.ranked.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
            if pair[0].score.total_cmp(&pair[1].score).is_eq() {
                prop_assert!(pair[0].order < pair[1].order);
            }
        }
    }

    /// Property: among identical candidates the first registered wins
    #[test]
    fn prop_identical_candidates_pick_first_registered(
        count in 2usize..6,
        impact in impact_level(),
        confidence in 0u8..=100,
    ) {
        let specs = vec![(impact, confidence); count];
        let selector = build_selector(&specs);
        let options = CompromiseOptions::default().with_max_impact(ImpactLevel::High);
        let ranking = rank(&selector, &options, &SelectionCriteria::default());

        let ranked_names = names(&ranking);
        prop_assert_eq!(ranked_names.first().map(String::as_str), Some("s0"));
    }
}
