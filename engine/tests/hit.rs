use engine::hit::{classify_missed_by, projectile_deviation, HitTier};
use engine::{
    confidence_breakdown, confidence_estimate, hit_distribution, DispersionSources, ShotRng,
    SizeClass,
};

#[test]
fn stochastic_percentages_sum_to_one_hundred() {
    let mut rng = ShotRng::from_seed(1234);
    let mut sources = DispersionSources::new(200.0);
    sources.add_normal(80.0);

    let hit = hit_distribution(&mut rng, &sources, 12.0, SizeClass::Medium, 10_000);
    let total = hit.critical + hit.good + hit.normal + hit.graze + hit.miss;
    assert!((total - 100.0).abs() < 1e-6, "total {total}");
}

#[test]
fn zero_dispersion_is_always_critical() {
    let mut rng = ShotRng::from_seed(5);
    let sources = DispersionSources::new(0.0);

    let hit = hit_distribution(&mut rng, &sources, 25.0, SizeClass::Tiny, 1_000);
    assert_eq!(hit.critical, 100.0);
    assert_eq!(hit.miss, 0.0);
}

#[test]
fn smaller_targets_are_missed_more() {
    let mut rng = ShotRng::from_seed(77);
    let sources = DispersionSources::new(300.0);

    let tiny = hit_distribution(&mut rng, &sources, 10.0, SizeClass::Tiny, 10_000);
    let huge = hit_distribution(&mut rng, &sources, 10.0, SizeClass::Huge, 10_000);
    assert!(tiny.miss > huge.miss);
}

#[test]
fn missed_by_classification_boundaries() {
    assert_eq!(classify_missed_by(1.2), HitTier::Miss);
    assert_eq!(classify_missed_by(1.0), HitTier::Miss);
    assert_eq!(classify_missed_by(0.8), HitTier::Graze);
    assert_eq!(classify_missed_by(0.5), HitTier::Normal);
    assert_eq!(classify_missed_by(0.2), HitTier::Good);
    assert_eq!(classify_missed_by(0.19), HitTier::Critical);
    assert_eq!(classify_missed_by(0.0), HitTier::Critical);
}

#[test]
fn deviation_projection_uses_the_half_angle() {
    // 60 degrees of deviation at range 10 projects tan(30°) * 10
    let deviation = projectile_deviation(3600.0, 10.0);
    assert!((deviation - 10.0 * (30.0f64).to_radians().tan()).abs() < 1e-9);
    assert_eq!(projectile_deviation(100.0, 0.0), 0.0);
}

#[test]
fn point_blank_confidence_is_twice_the_occupied_fraction() {
    let sources = DispersionSources::new(500.0);
    assert_eq!(
        confidence_estimate(&sources, 0.0, SizeClass::Medium),
        1.0
    );
    assert_eq!(
        confidence_estimate(&sources, 0.0, SizeClass::Huge),
        2.0
    );
}

#[test]
fn raw_confidence_is_not_clamped_at_unity() {
    // 2 MOA worst case at 1 tile: a few hundredths of a milliradian
    let sources = DispersionSources::new(2.0);
    let confidence = confidence_estimate(&sources, 1.0, SizeClass::Huge);
    assert!(confidence > 1.0, "got {confidence}");
}

#[test]
fn confidence_breakdown_always_totals_one_hundred() {
    for confidence in [0.0, 0.1, 0.3, 0.77, 1.0, 1.5, 3.0, 10.0] {
        let tiers = confidence_breakdown(confidence);
        assert_eq!(tiers.total(), 100, "confidence {confidence}: {tiers:?}");
        assert!(tiers.great >= 0 && tiers.normal >= 0 && tiers.graze >= 0 && tiers.miss >= 0);
    }
}

#[test]
fn confidence_breakdown_reference_values() {
    let certain = confidence_breakdown(1.0);
    assert_eq!(certain.great, 50);
    assert_eq!(certain.normal, 30);
    assert_eq!(certain.graze, 20);
    assert_eq!(certain.miss, 0);

    let hopeless = confidence_breakdown(0.0);
    assert_eq!(hopeless.miss, 100);

    // super-unity confidence saturates the first tier
    let saturated = confidence_breakdown(3.0);
    assert_eq!(saturated.great, 100);
    assert_eq!(saturated.miss, 0);
}
