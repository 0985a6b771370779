use serde::{Deserialize, Serialize};

use crate::weapon::WeaponClass;
use crate::MAX_SKILL;

/// Skill level below which the scaled dispersion penalty steepens sharply.
const SKILL_THRESHOLD: f64 = 5.0;

/// Parallax added per point of perception below 20, unzoomed.
const PARALLAX_PER_POINT: f64 = 2.0;
/// Magnified optics shrink the apparent parallax by this much.
const ZOOM_PARALLAX_MULTIPLIER: f64 = 0.25;

/// Attacker attributes, flattened from whatever character sheet the caller
/// keeps. Immutable for the duration of a calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CharacterProfile {
    pub name: String,
    pub dexterity: i32,
    pub perception: i32,
    /// Perception after temporary effects; falls back to `perception`.
    #[serde(default)]
    pub current_perception: Option<i32>,
    pub strength: i32,
    /// Level in the weapon's own skill.
    pub gun_skill: f64,
    /// Average combat skill, drives the dispersion penalty.
    pub marksmanship: f64,
    #[serde(default = "full_score")]
    pub vision_score: f64,
    #[serde(default = "full_score")]
    pub grip_score: f64,
    #[serde(default = "full_score")]
    pub manipulation_score: f64,
    #[serde(default = "full_score")]
    pub lift_score: f64,
    #[serde(default = "default_stamina")]
    pub stamina: i32,
    #[serde(default = "default_stamina")]
    pub stamina_max: i32,
    #[serde(default)]
    pub in_confined_space: bool,
}

fn full_score() -> f64 {
    1.0
}

fn default_stamina() -> i32 {
    1000
}

impl CharacterProfile {
    pub fn effective_perception(&self) -> i32 {
        self.current_perception.unwrap_or(self.perception)
    }
}

/// Dispersion added for dexterity below 20.
pub fn dexterity_dispersion_penalty(dexterity: i32) -> f64 {
    ((20 - dexterity) as f64 * 0.5).max(0.0)
}

/// Perception- and optics-driven aiming imprecision in MOA, rounded to
/// whole minutes and never negative.
pub fn parallax(perception: i32, zoomed: bool, vision_penalty: f64) -> i32 {
    let factor = if zoomed {
        PARALLAX_PER_POINT * ZOOM_PARALLAX_MULTIPLIER
    } else {
        PARALLAX_PER_POINT
    };
    let base = ((20 - perception) as f64 * factor).max(0.0);
    ((base + vision_penalty).round() as i32).max(0)
}

/// Dispersion penalty from average combat skill. Zero at `MAX_SKILL`; below
/// that, a flat 10 MOA per missing level plus a scaled term that steepens
/// under `SKILL_THRESHOLD`.
pub fn dispersion_from_skill(avg_skill: f64, weapon_constant: f64) -> f64 {
    if avg_skill >= MAX_SKILL {
        return 0.0;
    }
    let skill = avg_skill.max(0.0);
    let flat = 10.0 * (MAX_SKILL - skill);
    let scaled = if skill >= SKILL_THRESHOLD {
        weapon_constant * (MAX_SKILL - skill) * 1.25 / (MAX_SKILL - SKILL_THRESHOLD)
    } else {
        weapon_constant * (1.25 + (SKILL_THRESHOLD - skill) * 2.0)
    };
    flat + scaled
}

/// Best recoil achievable without aiming down sights.
pub fn point_shooting_limit(skill: f64, class: WeaponClass) -> f64 {
    let skill = skill.clamp(0.0, MAX_SKILL);
    match class {
        WeaponClass::Firearm => 200.0 - 10.0 * skill,
        WeaponClass::Archery => 30.0 + 220.0 / (1.0 + skill),
    }
}

pub fn aim_speed_dex_modifier(dexterity: i32) -> f64 {
    (dexterity - 8) as f64 * 0.5
}

pub fn aim_speed_skill_modifier(skill: f64, class: WeaponClass) -> f64 {
    let skill = skill.clamp(0.0, MAX_SKILL);
    match class {
        WeaponClass::Firearm => 0.5 * skill,
        WeaponClass::Archery => 0.75 * skill - 1.0,
    }
}

/// Overall aim-speed multiplier from limb capability, weighted toward grip.
pub fn aim_speed_modifier(grip: f64, manipulation: f64, lift: f64) -> f64 {
    (0.5 * grip + 0.3 * manipulation + 0.2 * lift).clamp(0.1, 1.0)
}

/// Dispersion from impaired hand function: zero at a full score, diverging
/// as the score collapses.
pub fn manipulation_dispersion_penalty(manipulation: f64) -> f64 {
    let score = manipulation.max(1e-3);
    (22.8 / score - 22.8).clamp(0.0, 1000.0)
}

/// Vision analogue of the manipulation penalty; feeds parallax.
pub fn vision_dispersion_penalty(vision: f64) -> f64 {
    let score = vision.max(1e-3);
    (30.0 / score - 30.0).clamp(0.0, 1000.0)
}

/// Fatigue widens the whole dispersion envelope: 1.0 rested, 1.5 exhausted.
pub fn stamina_dispersion_multiplier(stamina: i32, stamina_max: i32) -> f64 {
    if stamina_max <= 0 {
        return 1.5;
    }
    let fraction = (stamina.max(0) as f64 / stamina_max as f64).min(1.0);
    1.0 + 0.5 * (1.0 - fraction)
}

/// Portion of per-shot recoil soaked up by practiced handling.
pub fn recoil_absorption(skill: f64) -> f64 {
    1.0 - 0.5 * skill.clamp(0.0, MAX_SKILL) / MAX_SKILL
}
