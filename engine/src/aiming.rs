use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::character::{
    aim_speed_dex_modifier, aim_speed_modifier, aim_speed_skill_modifier, point_shooting_limit,
};
use crate::hit::SizeClass;
use crate::weapon::{
    aim_length_factor, aim_volume_factor, most_accurate_sight_limit, sight_parallax, GunProfile,
};
use crate::{logistic_range, CharacterProfile, MAX_RECOIL, MAX_SKILL};

/// Base recoil shed per move before any sight or attribute modifier.
const BASE_AIM_SPEED: f64 = 10.0;
/// Final scaling applied to the per-move aim speed.
const AIM_SPEED_SCALE: f64 = 2.4;
/// Below this per-move improvement the loop is considered stalled.
const MIN_RECOIL_IMPROVEMENT: f64 = 0.01;
/// Fixed aim-speed bonus of plain iron sights.
const IRON_SIGHT_AIM_SPEED: f64 = 6.0;
/// Point-shooting aim-speed bonus before the skill term.
const POINT_SHOOTING_BASE_SPEED: f64 = 4.0;
/// Laser dots wash out with ambient light: base usable range in tiles,
/// shrinking with light, never below the floor.
const LASER_BASE_RANGE: f64 = 30.0;
const LASER_LIGHT_PENALTY: f64 = 0.25;
const LASER_MIN_RANGE: f64 = 5.0;

/// Target and environment for one evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Scenario {
    #[serde(default = "max_recoil")]
    pub start_recoil: f64,
    /// Distance to the target in tiles.
    pub range: f64,
    pub target_size: SizeClass,
    /// Ambient light on the target, 0 (pitch dark) upward.
    #[serde(default)]
    pub light: f64,
    #[serde(default = "yes")]
    pub target_visible: bool,
    #[serde(default = "default_move_cap")]
    pub move_cap: u32,
}

fn max_recoil() -> f64 {
    MAX_RECOIL
}

fn yes() -> bool {
    true
}

fn default_move_cap() -> u32 {
    1000
}

impl Scenario {
    pub fn at_range(range: f64, target_size: SizeClass) -> Self {
        Self {
            start_recoil: MAX_RECOIL,
            range,
            target_size,
            light: 0.0,
            target_visible: true,
            move_cap: default_move_cap(),
        }
    }
}

/// Named recoil levels an attacker can choose to aim down to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AimThresholds {
    pub precise: f64,
    pub careful: Option<f64>,
    pub regular: Option<f64>,
}

impl AimThresholds {
    pub fn from_limit(limit: f64) -> Self {
        let headroom = MAX_RECOIL - limit;
        Self {
            precise: limit,
            careful: Some(limit + headroom / 20.0),
            regular: Some(limit + headroom / 10.0),
        }
    }
}

/// Recoil at a given move count, recorded when a threshold is first crossed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AimCheckpoint {
    pub moves: u32,
    pub recoil: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AimProgress {
    pub start: AimCheckpoint,
    pub regular: Option<AimCheckpoint>,
    pub careful: Option<AimCheckpoint>,
    pub precise: Option<AimCheckpoint>,
    pub final_recoil: f64,
    pub moves_spent: u32,
    /// True when the move cap (or a stall, reported the same way) ended the
    /// loop before the accuracy limit was reached.
    pub capped: bool,
}

/// One way of lining up the gun, with the recoil band over which it helps.
#[derive(Debug, Clone, Copy)]
struct SightingOption {
    aim_speed: f64,
    effective_dispersion: f64,
    field_of_view: f64,
}

fn laser_usable(scenario: &Scenario) -> bool {
    let usable_range = (LASER_BASE_RANGE - scenario.light * LASER_LIGHT_PENALTY).max(LASER_MIN_RANGE);
    scenario.target_visible && scenario.range <= usable_range
}

fn sighting_options(
    character: &CharacterProfile,
    gun: &GunProfile,
    scenario: &Scenario,
) -> Vec<SightingOption> {
    let skill = character.gun_skill.clamp(0.0, MAX_SKILL);
    let mut options = vec![SightingOption {
        aim_speed: POINT_SHOOTING_BASE_SPEED + skill,
        effective_dispersion: point_shooting_limit(character.gun_skill, gun.class),
        field_of_view: MAX_RECOIL,
    }];
    if gun.iron_sights {
        options.push(SightingOption {
            aim_speed: IRON_SIGHT_AIM_SPEED,
            effective_dispersion: gun.iron_sight_dispersion + sight_parallax(character, false),
            field_of_view: MAX_RECOIL,
        });
    }
    for sight in gun.sights.iter().filter(|s| s.field_of_view > 0.0) {
        if sight.laser && !laser_usable(scenario) {
            continue;
        }
        options.push(SightingOption {
            aim_speed: sight.aim_speed,
            effective_dispersion: sight.dispersion + sight_parallax(character, sight.zoom),
            field_of_view: sight.field_of_view,
        });
    }
    options
}

/// Speed contribution of one sighting option at the current recoil: nothing
/// once the sight can no longer improve the hold, nothing while recoil is
/// outside its field of view, logistic falloff in between.
fn modified_sight_speed(option: &SightingOption, recoil: f64) -> f64 {
    if recoil <= option.effective_dispersion || recoil > option.field_of_view {
        return 0.0;
    }
    option.aim_speed * logistic_range(option.effective_dispersion, option.field_of_view, recoil)
}

/// Recoil shed in one move of aiming at the given current recoil.
pub fn aim_per_move(
    character: &CharacterProfile,
    gun: &GunProfile,
    scenario: &Scenario,
    recoil: f64,
) -> f64 {
    let skill = character.gun_skill.clamp(0.0, MAX_SKILL);
    let sight_speed = sighting_options(character, gun, scenario)
        .iter()
        .map(|option| modified_sight_speed(option, recoil))
        .fold(0.0, f64::max);

    let mut aim_speed = BASE_AIM_SPEED + sight_speed;
    aim_speed += aim_speed_dex_modifier(character.dexterity);
    aim_speed += aim_speed_skill_modifier(character.gun_skill, gun.class);
    aim_speed *= aim_speed_modifier(
        character.grip_score,
        character.manipulation_score,
        character.lift_score,
    );
    aim_speed /= (2.5 - 0.2 * skill).max(1.0);

    // fast at both ends, slow in the middle
    aim_speed *= (recoil / MAX_RECOIL).max(1.0 - logistic_range(0.0, MAX_RECOIL, recoil));

    let cap = aim_volume_factor(gun).min(aim_length_factor(gun, character.in_confined_space))
        * (5.0 + skill + (3.0 * skill).max(10.0));
    aim_speed = aim_speed.min(cap);
    aim_speed *= AIM_SPEED_SCALE;
    aim_speed.max(MIN_RECOIL_IMPROVEMENT)
}

/// Drive recoil down toward the best achievable limit, move by move,
/// recording when each named threshold is first crossed. Always terminates:
/// at the limit, at the move cap, or on a stalled improvement.
pub fn simulate_aiming(
    character: &CharacterProfile,
    gun: &GunProfile,
    scenario: &Scenario,
    thresholds: &AimThresholds,
    mut log: impl FnMut(String),
) -> AimProgress {
    let limit = most_accurate_sight_limit(character, gun);
    let mut recoil = scenario.start_recoil.clamp(0.0, MAX_RECOIL).max(limit);
    let start = AimCheckpoint { moves: 0, recoil };

    let mut progress = AimProgress {
        start,
        regular: None,
        careful: None,
        precise: None,
        final_recoil: recoil,
        moves_spent: 0,
        capped: false,
    };
    mark_thresholds(&mut progress, thresholds, start);

    let mut moves = 0u32;
    while recoil - limit > f64::EPSILON {
        if moves >= scenario.move_cap {
            progress.capped = true;
            break;
        }
        let speed = aim_per_move(character, gun, scenario, recoil);
        let step = speed.min(recoil - limit).max(0.0);
        if step < MIN_RECOIL_IMPROVEMENT && recoil - limit > MIN_RECOIL_IMPROVEMENT {
            // Stalled short of the limit; report as if the cap was hit.
            progress.capped = true;
            break;
        }
        recoil -= step;
        moves += 1;
        log(format!("move {moves}: recoil {recoil:.1}"));
        mark_thresholds(&mut progress, thresholds, AimCheckpoint { moves, recoil });
    }

    progress.final_recoil = recoil;
    progress.moves_spent = moves;
    debug!(
        gun = %gun.name,
        moves,
        recoil,
        limit,
        capped = progress.capped,
        "aim convergence finished"
    );
    progress
}

fn mark_thresholds(progress: &mut AimProgress, thresholds: &AimThresholds, at: AimCheckpoint) {
    if progress.regular.is_none() && thresholds.regular.is_some_and(|t| at.recoil <= t) {
        progress.regular = Some(at);
    }
    if progress.careful.is_none() && thresholds.careful.is_some_and(|t| at.recoil <= t) {
        progress.careful = Some(at);
    }
    if progress.precise.is_none() && at.recoil <= thresholds.precise {
        progress.precise = Some(at);
    }
}
