use serde::{Deserialize, Serialize};

use crate::character::{self, CharacterProfile};

/// Mechanical dispersion units are divided down to MOA by this.
const DISPERSION_DIVIDER: f64 = 15.0;
/// Extra raw dispersion per level of accumulated weapon damage.
const DISPERSION_PER_DAMAGE_LEVEL: f64 = 50.0;
/// Volume above which a wielded gun starts slowing the aim.
const REFERENCE_AIM_VOLUME_ML: f64 = 800.0;
/// Length at which confined spaces start to bite, and the ramp over which
/// the penalty accrues.
const CONFINED_LENGTH_PIVOT_MM: f64 = 300.0;
const CONFINED_LENGTH_RAMP_MM: f64 = 1000.0;
const AIM_FACTOR_FLOOR: f64 = 0.2;

/// Broad mechanical family; decides which modifier formulas apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponClass {
    Firearm,
    Archery,
}

impl WeaponClass {
    /// Weapon-class constant feeding the skill dispersion penalty.
    pub fn skill_dispersion_constant(self) -> f64 {
        match self {
            WeaponClass::Firearm => 300.0 / 18.0,
            WeaponClass::Archery => 25.0,
        }
    }
}

/// A mounted sighting option: optic, reflex sight, laser.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SightSpec {
    pub name: String,
    /// Base dispersion of the sight itself, MOA.
    pub dispersion: f64,
    /// Magnified optics shrink parallax but narrow the field of view.
    #[serde(default)]
    pub zoom: bool,
    pub aim_speed: f64,
    /// Usable field of view in MOA of recoil; zero disables the sight.
    pub field_of_view: f64,
    #[serde(default)]
    pub laser: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FiringMode {
    pub name: String,
    /// Projectiles fired per activation.
    pub shots: u32,
    #[serde(default = "one")]
    pub recoil_multiplier: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AmmoProfile {
    pub name: String,
    pub damage: f64,
    pub recoil: f64,
    #[serde(default)]
    pub dispersion: f64,
    #[serde(default = "one_shot")]
    pub projectiles: u32,
    /// Shot spread in MOA, only meaningful when `projectiles > 1`.
    #[serde(default)]
    pub spread: f64,
}

/// Flattened weapon record consumed by the engine. Parsing the game's raw
/// item definitions into this shape is the caller's problem.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GunProfile {
    pub name: String,
    /// Weapon skill id, e.g. "pistol", "rifle", "shotgun", "archery".
    pub skill: String,
    pub class: WeaponClass,
    pub volume_ml: f64,
    pub length_mm: f64,
    pub base_dispersion: f64,
    #[serde(default)]
    pub mod_dispersion: f64,
    #[serde(default)]
    pub damage_level: i32,
    pub handling: f64,
    #[serde(default)]
    pub mod_handling: f64,
    #[serde(default = "one")]
    pub mod_recoil_factor: f64,
    #[serde(default = "yes")]
    pub iron_sights: bool,
    #[serde(default = "default_iron_sight_dispersion")]
    pub iron_sight_dispersion: f64,
    #[serde(default)]
    pub sights: Vec<SightSpec>,
    #[serde(default)]
    pub stock_collapsed: bool,
    #[serde(default)]
    pub collapsed_volume_delta_ml: f64,
    #[serde(default)]
    pub bipod: bool,
    #[serde(default)]
    pub magazine_capacity: Option<u32>,
    #[serde(default)]
    pub reload_moves: f64,
    /// Belt feeds and the like: ammo lives outside the gun.
    #[serde(default)]
    pub external_ammo_source: bool,
    #[serde(default)]
    pub external_reload_moves: f64,
    pub modes: Vec<FiringMode>,
    /// Calibers the base receiver accepts; empty means a fully modular
    /// weapon with no base chambering.
    #[serde(default)]
    pub chamberings: Vec<String>,
}

fn one() -> f64 {
    1.0
}

fn one_shot() -> u32 {
    1
}

fn yes() -> bool {
    true
}

fn default_iron_sight_dispersion() -> f64 {
    120.0
}

impl GunProfile {
    pub fn is_pistol(&self) -> bool {
        self.skill == "pistol"
    }

    /// Volume actually wielded, accounting for a folded stock.
    pub fn wielded_volume_ml(&self) -> f64 {
        if self.stock_collapsed {
            (self.volume_ml - self.collapsed_volume_delta_ml).max(0.0)
        } else {
            self.volume_ml
        }
    }

    /// Moves to cycle one reload of whatever feeds this gun.
    pub fn reload_cost(&self) -> f64 {
        if self.external_ammo_source {
            self.external_reload_moves
        } else {
            self.reload_moves
        }
    }
}

/// Inherent mechanical dispersion of the gun/ammo pairing, in MOA.
/// No weapon is ever treated as better than 1 MOA.
pub fn scaled_base_dispersion(gun: &GunProfile, ammo: &AmmoProfile) -> f64 {
    let raw = (gun.base_dispersion
        + gun.mod_dispersion
        + gun.damage_level as f64 * DISPERSION_PER_DAMAGE_LEVEL
        + ammo.dispersion)
        .max(0.0);
    (raw / DISPERSION_DIVIDER).round().max(1.0)
}

/// How much sheer bulk slows the aim.
pub fn aim_volume_factor(gun: &GunProfile) -> f64 {
    let base = if gun.is_pistol() { 4.0 } else { 1.0 };
    let volume = gun.wielded_volume_ml();
    let factor = if volume > REFERENCE_AIM_VOLUME_ML {
        base * (REFERENCE_AIM_VOLUME_ML / volume).cbrt()
    } else {
        base
    };
    factor.max(AIM_FACTOR_FLOOR)
}

/// Long weapons are awkward to bring to bear in confined spaces.
pub fn aim_length_factor(gun: &GunProfile, confined: bool) -> f64 {
    if !confined || gun.length_mm <= CONFINED_LENGTH_PIVOT_MM {
        return 1.0;
    }
    (1.0 - (gun.length_mm - CONFINED_LENGTH_PIVOT_MM) / CONFINED_LENGTH_RAMP_MM)
        .min(1.0)
        .max(AIM_FACTOR_FLOOR)
}

/// Parallax for a particular sight on this character, MOA.
pub fn sight_parallax(character: &CharacterProfile, zoomed: bool) -> f64 {
    character::parallax(
        character.effective_perception(),
        zoomed,
        character::vision_dispersion_penalty(character.vision_score),
    ) as f64
}

/// Best (lowest) recoil this character can aim down to with any sighting
/// option on the gun.
pub fn most_accurate_sight_limit(character: &CharacterProfile, gun: &GunProfile) -> f64 {
    let mut limit = character::point_shooting_limit(character.gun_skill, gun.class);
    if gun.iron_sights {
        limit = limit.min(gun.iron_sight_dispersion + sight_parallax(character, false));
    }
    for sight in gun.sights.iter().filter(|s| s.field_of_view > 0.0) {
        limit = limit.min(sight.dispersion + sight_parallax(character, sight.zoom));
    }
    limit
}
