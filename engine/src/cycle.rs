use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::aiming::{simulate_aiming, AimCheckpoint, AimProgress, AimThresholds, Scenario};
use crate::character::{
    dexterity_dispersion_penalty, dispersion_from_skill, manipulation_dispersion_penalty,
    recoil_absorption, stamina_dispersion_multiplier, CharacterProfile,
};
use crate::dispersion::DispersionSources;
use crate::hit::{
    confidence_breakdown, confidence_estimate, hit_distribution, ConfidencePercentages,
    HitPercentages, SizeClass, DEFAULT_TRIALS,
};
use crate::weapon::{most_accurate_sight_limit, scaled_base_dispersion, AmmoProfile, GunProfile};
use crate::{ShotRng, MAX_RECOIL, MOVES_PER_SECOND};

pub const CRITICAL_DAMAGE_MULTIPLIER: f64 = 2.0;
pub const GOOD_DAMAGE_MULTIPLIER: f64 = 1.5;
pub const GRAZE_DAMAGE_MULTIPLIER: f64 = 0.25;

/// Strength knocks this much off raw ammo recoil per point.
const RECOIL_STRENGTH_REDUCTION: f64 = 6.0;
/// Handling scale: recoil is divided by handling/20.
const RECOIL_HANDLING_SCALE: f64 = 20.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EvaluationConfig {
    /// Ranges (tiles) the cycle is evaluated at.
    pub ranges: Vec<f64>,
    /// Monte Carlo trials per shot.
    pub trials: usize,
    pub move_cap: u32,
    pub target_size: SizeClass,
    pub light: f64,
    pub target_visible: bool,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            ranges: vec![1.0, 5.0, 10.0, 20.0, 30.0],
            trials: DEFAULT_TRIALS,
            move_cap: 1000,
            target_size: SizeClass::Medium,
            light: 0.0,
            target_visible: true,
        }
    }
}

impl EvaluationConfig {
    fn scenario(&self, range: f64) -> Scenario {
        Scenario {
            start_recoil: MAX_RECOIL,
            range,
            target_size: self.target_size,
            light: self.light,
            target_visible: self.target_visible,
            move_cap: self.move_cap,
        }
    }
}

/// Keyed attack-activation timing service. The engine queries it by weapon
/// skill id and never sees the underlying schema.
pub trait AttackTimeSource {
    fn attack_moves(&self, skill: &str, level: f64) -> f64;
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TimingRule {
    pub base_moves: f64,
    pub reduction_per_level: f64,
    pub min_moves: f64,
}

impl TimingRule {
    fn moves(&self, level: f64) -> f64 {
        (self.base_moves - self.reduction_per_level * level)
            .round()
            .max(self.min_moves)
    }
}

/// Default timing table, one rule per weapon skill, insertion-ordered.
#[derive(Debug, Clone)]
pub struct SkillTimings {
    rules: IndexMap<String, TimingRule>,
    fallback: TimingRule,
}

impl Default for SkillTimings {
    fn default() -> Self {
        let mut rules = IndexMap::new();
        for (skill, rule) in [
            ("pistol", TimingRule { base_moves: 80.0, reduction_per_level: 3.0, min_moves: 50.0 }),
            ("smg", TimingRule { base_moves: 90.0, reduction_per_level: 3.0, min_moves: 60.0 }),
            ("rifle", TimingRule { base_moves: 100.0, reduction_per_level: 3.0, min_moves: 65.0 }),
            ("shotgun", TimingRule { base_moves: 110.0, reduction_per_level: 3.0, min_moves: 70.0 }),
            ("archery", TimingRule { base_moves: 120.0, reduction_per_level: 5.0, min_moves: 60.0 }),
        ] {
            rules.insert(skill.to_string(), rule);
        }
        Self {
            rules,
            fallback: TimingRule {
                base_moves: 100.0,
                reduction_per_level: 3.0,
                min_moves: 65.0,
            },
        }
    }
}

impl SkillTimings {
    pub fn insert(&mut self, skill: impl Into<String>, rule: TimingRule) {
        self.rules.insert(skill.into(), rule);
    }
}

impl AttackTimeSource for SkillTimings {
    fn attack_moves(&self, skill: &str, level: f64) -> f64 {
        self.rules.get(skill).unwrap_or(&self.fallback).moves(level)
    }
}

/// Why a configuration produced no numbers. These are values, not errors:
/// the caller excludes the configuration from comparison and moves on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotComputable {
    #[error("no fireable ammunition")]
    NoAmmo,
    #[error("ammunition deals no damage")]
    ZeroDamage,
    #[error("no magazine or external ammo source")]
    NoMagazine,
    #[error("non-standard weapon configuration")]
    NonStandard,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Evaluation {
    Computed(Box<CombatResults>),
    NotComputable(NotComputable),
}

impl Evaluation {
    pub fn computed(self) -> Option<Box<CombatResults>> {
        match self {
            Evaluation::Computed(results) => Some(results),
            Evaluation::NotComputable(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AimLevel {
    Regular,
    Careful,
    Precise,
}

/// Hit quality achievable at one reached aim threshold.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ThresholdHit {
    pub level: AimLevel,
    pub at: AimCheckpoint,
    pub hit: HitPercentages,
    pub confidence: ConfidencePercentages,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct RangeDps {
    pub range: f64,
    /// Full cycle: aim, empty the magazine, reload.
    pub sustained: f64,
    /// Reload cost excluded.
    pub mag_dump: f64,
    /// Re-aim to the precise threshold before every shot.
    pub precise_per_shot: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ModeReport {
    pub mode: String,
    pub per_range: Vec<RangeDps>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct CombatResults {
    pub gun: String,
    pub ammo: String,
    pub damage_per_hit: f64,
    pub attack_moves: f64,
    pub thresholds: AimThresholds,
    /// Convergence record for the first configured range.
    pub aim: AimProgress,
    pub threshold_hits: Vec<ThresholdHit>,
    pub modes: Vec<ModeReport>,
}

/// Assemble the dispersion sources for one shot at the given recoil.
pub fn weapon_dispersion_sources(
    character: &CharacterProfile,
    gun: &GunProfile,
    ammo: &AmmoProfile,
    recoil: f64,
) -> DispersionSources {
    let mut sources = DispersionSources::new(scaled_base_dispersion(gun, ammo));
    sources.add_linear(dexterity_dispersion_penalty(character.dexterity));
    sources.add_linear(dispersion_from_skill(
        character.marksmanship,
        gun.class.skill_dispersion_constant(),
    ));
    sources.add_normal(manipulation_dispersion_penalty(character.manipulation_score));
    sources.add_multiplier(stamina_dispersion_multiplier(
        character.stamina,
        character.stamina_max,
    ));
    sources.add_linear(recoil);
    if ammo.projectiles > 1 {
        sources.set_spread(ammo.spread);
    }
    sources
}

/// Recoil added by one shot before skill absorption and the firing mode's
/// own multiplier. A deployed bipod turns the usual halving into a
/// quartering.
pub fn per_shot_recoil(character: &CharacterProfile, gun: &GunProfile, ammo: &AmmoProfile) -> f64 {
    let raw = (ammo.recoil * gun.mod_recoil_factor
        - RECOIL_STRENGTH_REDUCTION * character.strength as f64)
        .max(0.0);
    let handling = (gun.handling + gun.mod_handling).max(1.0);
    let steadied = raw * RECOIL_HANDLING_SCALE / handling;
    steadied / if gun.bipod { 4.0 } else { 2.0 }
}

/// Run the full firing cycle for every mode and range and aggregate DPS.
/// Degenerate configurations come back as [`Evaluation::NotComputable`].
pub fn evaluate(
    character: &CharacterProfile,
    gun: &GunProfile,
    ammo: Option<&AmmoProfile>,
    config: &EvaluationConfig,
    timings: &impl AttackTimeSource,
    rng: &mut ShotRng,
    mut log: impl FnMut(String),
) -> Evaluation {
    let Some(ammo) = ammo else {
        return Evaluation::NotComputable(NotComputable::NoAmmo);
    };
    if ammo.damage <= 0.0 {
        return Evaluation::NotComputable(NotComputable::ZeroDamage);
    }
    if gun.chamberings.is_empty() {
        return Evaluation::NotComputable(NotComputable::NonStandard);
    }
    let capacity = if gun.external_ammo_source {
        1
    } else {
        match gun.magazine_capacity {
            Some(capacity) if capacity > 0 => capacity,
            _ => return Evaluation::NotComputable(NotComputable::NoMagazine),
        }
    };

    let limit = most_accurate_sight_limit(character, gun);
    let thresholds = AimThresholds::from_limit(limit);
    let attack_moves = timings.attack_moves(&gun.skill, character.gun_skill);
    let shot_recoil =
        per_shot_recoil(character, gun, ammo) * recoil_absorption(character.gun_skill);

    let reference_range = config.ranges.first().copied().unwrap_or(10.0);
    let reference_scenario = config.scenario(reference_range);
    let aim = simulate_aiming(character, gun, &reference_scenario, &thresholds, &mut log);

    let threshold_hits = [
        (AimLevel::Regular, aim.regular),
        (AimLevel::Careful, aim.careful),
        (AimLevel::Precise, aim.precise),
    ]
    .into_iter()
    .filter_map(|(level, checkpoint)| {
        let at = checkpoint?;
        let sources = weapon_dispersion_sources(character, gun, ammo, at.recoil);
        Some(ThresholdHit {
            level,
            at,
            hit: hit_distribution(
                rng,
                &sources,
                reference_range,
                config.target_size,
                config.trials,
            ),
            confidence: confidence_breakdown(confidence_estimate(
                &sources,
                reference_range,
                config.target_size,
            )),
        })
    })
    .collect();

    let modes: Vec<ModeReport> = gun
        .modes
        .iter()
        .map(|mode| {
            let mode_recoil = (shot_recoil * mode.recoil_multiplier).min(MAX_RECOIL);
            let per_range = config
                .ranges
                .iter()
                .map(|&range| {
                    evaluate_mode_at_range(
                        character,
                        gun,
                        ammo,
                        config,
                        mode.shots.max(1),
                        mode_recoil,
                        capacity,
                        attack_moves,
                        &thresholds,
                        range,
                        rng,
                        &mut log,
                    )
                })
                .collect();
            ModeReport {
                mode: mode.name.clone(),
                per_range,
            }
        })
        .collect();

    debug!(gun = %gun.name, ammo = %ammo.name, "evaluation complete");
    Evaluation::Computed(Box::new(CombatResults {
        gun: gun.name.clone(),
        ammo: ammo.name.clone(),
        damage_per_hit: ammo.damage,
        attack_moves,
        thresholds,
        aim,
        threshold_hits,
        modes,
    }))
}

#[allow(clippy::too_many_arguments)]
fn evaluate_mode_at_range(
    character: &CharacterProfile,
    gun: &GunProfile,
    ammo: &AmmoProfile,
    config: &EvaluationConfig,
    shots_per_activation: u32,
    shot_recoil: f64,
    capacity: u32,
    attack_moves: f64,
    thresholds: &AimThresholds,
    range: f64,
    rng: &mut ShotRng,
    mut log: impl FnMut(String),
) -> RangeDps {
    let scenario = config.scenario(range);
    let aim = simulate_aiming(character, gun, &scenario, thresholds, &mut log);

    let mut recoil = aim.final_recoil;
    let mut expected_damage = 0.0;
    for _ in 0..capacity {
        expected_damage += expected_shot_damage(character, gun, ammo, recoil, range, config, rng);
        recoil = (recoil + shot_recoil).min(MAX_RECOIL);
    }

    let activations = capacity.div_ceil(shots_per_activation) as f64;
    let fire_moves = activations * attack_moves;
    let mag_moves = aim.moves_spent as f64 + fire_moves;
    let sustained_moves = mag_moves + gun.reload_cost();

    // Aim-fire-aim-fire: first hold from full recoil, every later one from
    // the single shot's kick, each shot its own activation.
    let mut precise_damage = 0.0;
    let mut precise_moves = gun.reload_cost();
    let mut hold = aim.clone();
    for shot in 0..capacity {
        precise_damage +=
            expected_shot_damage(character, gun, ammo, hold.final_recoil, range, config, rng);
        precise_moves += hold.moves_spent as f64 + attack_moves;
        if shot + 1 < capacity {
            let mut rescenario = scenario.clone();
            rescenario.start_recoil = (hold.final_recoil + shot_recoil).min(MAX_RECOIL);
            hold = simulate_aiming(character, gun, &rescenario, thresholds, &mut log);
        }
    }

    RangeDps {
        range,
        sustained: dps(expected_damage, sustained_moves),
        mag_dump: dps(expected_damage, mag_moves),
        precise_per_shot: dps(precise_damage, precise_moves),
    }
}

fn expected_shot_damage(
    character: &CharacterProfile,
    gun: &GunProfile,
    ammo: &AmmoProfile,
    recoil: f64,
    range: f64,
    config: &EvaluationConfig,
    rng: &mut ShotRng,
) -> f64 {
    let sources = weapon_dispersion_sources(character, gun, ammo, recoil);
    let hit = hit_distribution(rng, &sources, range, config.target_size, config.trials);
    ammo.damage * ammo.projectiles as f64 * hit.expected_damage_fraction()
}

fn dps(damage: f64, moves: f64) -> f64 {
    damage / (moves.max(1.0) / MOVES_PER_SECOND)
}
