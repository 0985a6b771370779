use engine::{
    confidence_breakdown, dispersion_from_skill, logistic_range, DispersionSources, ShotRng,
    MAX_RECOIL, MAX_SKILL,
};
use proptest::prelude::*;

proptest! {
    #[test]
    fn rolls_are_bounded_for_any_configuration(
        seed in any::<u64>(),
        linear in proptest::collection::vec(0.0f64..500.0, 0..6),
        normal in proptest::collection::vec(0.0f64..500.0, 0..6),
        multipliers in proptest::collection::vec(0.5f64..2.0, 0..3),
    ) {
        let mut rng = ShotRng::from_seed(seed);
        let mut sources = DispersionSources::new(0.0);
        for s in linear {
            sources.add_linear(s);
        }
        for s in normal {
            sources.add_normal(s);
        }
        for m in multipliers {
            sources.add_multiplier(m);
        }
        for _ in 0..32 {
            let roll = sources.roll(&mut rng);
            prop_assert!(roll >= 0.0);
            prop_assert!(roll <= MAX_RECOIL);
        }
    }

    #[test]
    fn skill_penalty_decreases_with_skill(
        low in 0.0f64..MAX_SKILL,
        delta in 0.01f64..5.0,
    ) {
        let high = (low + delta).min(MAX_SKILL);
        let p = 300.0 / 18.0;
        prop_assert!(dispersion_from_skill(low, p) > dispersion_from_skill(high, p));
    }

    #[test]
    fn confidence_tiers_always_total_one_hundred(confidence in 0.0f64..5.0) {
        let tiers = confidence_breakdown(confidence);
        prop_assert_eq!(tiers.total(), 100);
        prop_assert!(tiers.great >= 0);
        prop_assert!(tiers.normal >= 0);
        prop_assert!(tiers.graze >= 0);
        prop_assert!(tiers.miss >= 0);
    }

    #[test]
    fn logistic_range_stays_normalized(
        pos in -100.0f64..4000.0,
        other in -100.0f64..4000.0,
    ) {
        let value = logistic_range(0.0, MAX_RECOIL, pos);
        prop_assert!((0.0..=1.0).contains(&value));
        // monotone non-increasing
        let (a, b) = if pos <= other { (pos, other) } else { (other, pos) };
        prop_assert!(logistic_range(0.0, MAX_RECOIL, a) >= logistic_range(0.0, MAX_RECOIL, b));
    }
}
