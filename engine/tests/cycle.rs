use engine::cycle::{per_shot_recoil, AttackTimeSource, TimingRule};
use engine::weapon::most_accurate_sight_limit;
use engine::{
    evaluate, AmmoProfile, CharacterProfile, Evaluation, EvaluationConfig, FiringMode, GunProfile,
    HitPercentages, NotComputable, ShotRng, SizeClass, SkillTimings, WeaponClass,
};

fn shooter() -> CharacterProfile {
    CharacterProfile {
        name: "Shooter".into(),
        dexterity: 10,
        perception: 10,
        current_perception: None,
        strength: 10,
        gun_skill: 4.0,
        marksmanship: 4.0,
        vision_score: 1.0,
        grip_score: 1.0,
        manipulation_score: 1.0,
        lift_score: 1.0,
        stamina: 1000,
        stamina_max: 1000,
        in_confined_space: false,
    }
}

fn pistol() -> GunProfile {
    GunProfile {
        name: "Test pistol".into(),
        skill: "pistol".into(),
        class: WeaponClass::Firearm,
        volume_ml: 500.0,
        length_mm: 180.0,
        base_dispersion: 480.0,
        mod_dispersion: 0.0,
        damage_level: 0,
        handling: 16.0,
        mod_handling: 0.0,
        mod_recoil_factor: 1.0,
        iron_sights: true,
        iron_sight_dispersion: 90.0,
        sights: vec![],
        stock_collapsed: false,
        collapsed_volume_delta_ml: 0.0,
        bipod: false,
        magazine_capacity: Some(15),
        reload_moves: 150.0,
        external_ammo_source: false,
        external_reload_moves: 0.0,
        modes: vec![FiringMode {
            name: "semi".into(),
            shots: 1,
            recoil_multiplier: 1.0,
        }],
        chamberings: vec!["9mm".into()],
    }
}

fn ball_ammo() -> AmmoProfile {
    AmmoProfile {
        name: "ball".into(),
        damage: 26.0,
        recoil: 500.0,
        dispersion: 60.0,
        projectiles: 1,
        spread: 0.0,
    }
}

fn quick_config() -> EvaluationConfig {
    EvaluationConfig {
        ranges: vec![5.0, 15.0],
        trials: 500,
        ..EvaluationConfig::default()
    }
}

#[test]
fn evaluation_produces_consistent_dps() {
    let character = shooter();
    let gun = pistol();
    let ammo = ball_ammo();
    let mut rng = ShotRng::from_seed(99);

    let results = evaluate(
        &character,
        &gun,
        Some(&ammo),
        &quick_config(),
        &SkillTimings::default(),
        &mut rng,
        |_| {},
    )
    .computed()
    .expect("computable configuration");

    assert_eq!(results.damage_per_hit, 26.0);
    assert!(results.attack_moves > 0.0);
    let limit = most_accurate_sight_limit(&character, &gun);
    assert!(results.aim.final_recoil >= limit - 1e-9);
    assert!(!results.threshold_hits.is_empty());
    for threshold in &results.threshold_hits {
        assert_eq!(threshold.confidence.total(), 100);
    }

    assert_eq!(results.modes.len(), 1);
    for report in &results.modes {
        assert_eq!(report.per_range.len(), 2);
        for dps in &report.per_range {
            assert!(dps.sustained >= 0.0);
            assert!(dps.mag_dump >= 0.0);
            assert!(dps.precise_per_shot >= 0.0);
            assert!(
                dps.mag_dump >= dps.sustained,
                "reload can only reduce throughput: {dps:?}"
            );
        }
    }
}

#[test]
fn missing_ammo_is_not_computable() {
    let mut rng = ShotRng::from_seed(1);
    let result = evaluate(
        &shooter(),
        &pistol(),
        None,
        &quick_config(),
        &SkillTimings::default(),
        &mut rng,
        |_| {},
    );
    assert!(matches!(
        result,
        Evaluation::NotComputable(NotComputable::NoAmmo)
    ));
}

#[test]
fn zero_damage_ammo_is_not_computable() {
    let mut ammo = ball_ammo();
    ammo.damage = 0.0;
    let mut rng = ShotRng::from_seed(1);
    let result = evaluate(
        &shooter(),
        &pistol(),
        Some(&ammo),
        &quick_config(),
        &SkillTimings::default(),
        &mut rng,
        |_| {},
    );
    assert!(matches!(
        result,
        Evaluation::NotComputable(NotComputable::ZeroDamage)
    ));
}

#[test]
fn modular_receiver_without_chambering_is_non_standard() {
    let mut gun = pistol();
    gun.chamberings.clear();
    let mut rng = ShotRng::from_seed(1);
    let result = evaluate(
        &shooter(),
        &gun,
        Some(&ball_ammo()),
        &quick_config(),
        &SkillTimings::default(),
        &mut rng,
        |_| {},
    );
    assert!(matches!(
        result,
        Evaluation::NotComputable(NotComputable::NonStandard)
    ));
}

#[test]
fn missing_magazine_is_not_computable() {
    let mut gun = pistol();
    gun.magazine_capacity = None;
    let mut rng = ShotRng::from_seed(1);
    let result = evaluate(
        &shooter(),
        &gun,
        Some(&ball_ammo()),
        &quick_config(),
        &SkillTimings::default(),
        &mut rng,
        |_| {},
    );
    assert!(matches!(
        result,
        Evaluation::NotComputable(NotComputable::NoMagazine)
    ));
}

#[test]
fn external_ammo_source_needs_no_magazine() {
    let mut gun = pistol();
    gun.magazine_capacity = None;
    gun.external_ammo_source = true;
    gun.external_reload_moves = 100.0;
    let mut rng = ShotRng::from_seed(1);
    let result = evaluate(
        &shooter(),
        &gun,
        Some(&ball_ammo()),
        &quick_config(),
        &SkillTimings::default(),
        &mut rng,
        |_| {},
    );
    assert!(result.computed().is_some());
}

#[test]
fn skill_timing_formula_floors_at_minimum() {
    let timings = SkillTimings::default();
    assert_eq!(timings.attack_moves("pistol", 0.0), 80.0);
    assert_eq!(timings.attack_moves("pistol", 10.0), 50.0);
    // unknown skill falls back to the generic rule
    assert_eq!(timings.attack_moves("flamethrower", 0.0), 100.0);

    let mut timings = SkillTimings::default();
    timings.insert(
        "launcher",
        TimingRule {
            base_moves: 200.0,
            reduction_per_level: 10.0,
            min_moves: 120.0,
        },
    );
    assert_eq!(timings.attack_moves("launcher", 3.0), 170.0);
    assert_eq!(timings.attack_moves("launcher", 10.0), 120.0);
}

#[test]
fn precise_per_shot_matches_sustained_when_shots_add_no_recoil() {
    // Zero per-shot recoil: every re-aim starts at the converged limit and
    // spends no moves, so both cycles fire the same shots on the same clock.
    let mut character = shooter();
    character.strength = 200;
    let mut gun = pistol();
    gun.magazine_capacity = Some(2);
    let config = EvaluationConfig {
        ranges: vec![5.0],
        trials: 4_000,
        ..EvaluationConfig::default()
    };
    let mut rng = ShotRng::from_seed(17);

    let results = evaluate(
        &character,
        &gun,
        Some(&ball_ammo()),
        &config,
        &SkillTimings::default(),
        &mut rng,
        |_| {},
    )
    .computed()
    .expect("computable configuration");

    for report in &results.modes {
        for dps in &report.per_range {
            assert!(dps.sustained > 0.0);
            let relative = (dps.precise_per_shot - dps.sustained).abs() / dps.sustained;
            assert!(
                relative < 0.1,
                "precise {} vs sustained {}",
                dps.precise_per_shot,
                dps.sustained
            );
        }
    }
}

#[test]
fn bipod_quarters_recoil_instead_of_halving() {
    let character = shooter();
    let ammo = ball_ammo();
    let without = per_shot_recoil(&character, &pistol(), &ammo);
    let mut braced = pistol();
    braced.bipod = true;
    let with = per_shot_recoil(&character, &braced, &ammo);
    assert!((with - without / 2.0).abs() < 1e-9);
}

#[test]
fn strength_reduction_floors_raw_recoil_at_zero() {
    let mut character = shooter();
    character.strength = 200;
    assert_eq!(per_shot_recoil(&character, &pistol(), &ball_ammo()), 0.0);
}

#[test]
fn expected_damage_fraction_of_all_normal_hits_is_unity() {
    let hit = HitPercentages {
        critical: 0.0,
        good: 0.0,
        normal: 100.0,
        graze: 0.0,
        miss: 0.0,
    };
    assert!((hit.expected_damage_fraction() - 1.0).abs() < 1e-9);
}
