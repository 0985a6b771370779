use std::f64::consts::PI;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub mod aiming;
pub mod character;
pub mod content;
pub mod cycle;
pub mod dispersion;
pub mod hit;
pub mod weapon;

pub use aiming::{simulate_aiming, AimCheckpoint, AimProgress, AimThresholds, Scenario};
pub use character::{dispersion_from_skill, point_shooting_limit, CharacterProfile};
pub use cycle::{
    evaluate, CombatResults, Evaluation, EvaluationConfig, NotComputable, SkillTimings,
};
pub use dispersion::DispersionSources;
pub use hit::{
    confidence_breakdown, confidence_estimate, hit_distribution, ConfidencePercentages,
    HitPercentages, SizeClass,
};
pub use weapon::{AmmoProfile, FiringMode, GunProfile, SightSpec, WeaponClass};

/// Ceiling on accumulated recoil and on any single rolled deviation, in
/// angular minutes (60 degrees of arc).
pub const MAX_RECOIL: f64 = 3600.0;

/// Skill levels above this contribute nothing further.
pub const MAX_SKILL: f64 = 10.0;

/// Move ↔ wall-clock conversion used for DPS figures.
pub const MOVES_PER_SECOND: f64 = 100.0;

/// Seeded random source for shot simulation. Normal deviates come from a
/// Box–Muller pair; the second value of each pair is cached on the instance
/// and consumed by the next call.
pub struct ShotRng {
    rng: ChaCha8Rng,
    spare_normal: Option<f64>,
}

impl ShotRng {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            spare_normal: None,
        }
    }

    /// Uniform sample on `[lo, hi)`; degenerate intervals return `lo`.
    pub fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        if hi <= lo {
            return lo;
        }
        self.rng.gen_range(lo..hi)
    }

    /// Standard normal deviate (Box–Muller, with the spare value cached).
    pub fn standard_normal(&mut self) -> f64 {
        if let Some(z) = self.spare_normal.take() {
            return z;
        }
        let u1: f64 = loop {
            let u = self.rng.gen_range(0.0..1.0);
            if u > f64::EPSILON {
                break u;
            }
        };
        let u2: f64 = self.rng.gen_range(0.0..1.0);
        let radius = (-2.0 * u1.ln()).sqrt();
        let (sin, cos) = (2.0 * PI * u2).sin_cos();
        self.spare_normal = Some(radius * sin);
        radius * cos
    }

    pub fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        mean + std_dev * self.standard_normal()
    }
}

/// Logistic falloff from 1.0 at `min` to 0.0 at `max`, normalized so the
/// endpoints are hit exactly.
pub fn logistic_range(min: f64, max: f64, pos: f64) -> f64 {
    const CUTOFF: f64 = 4.0;
    if pos <= min {
        return 1.0;
    }
    if pos >= max {
        return 0.0;
    }
    let logistic = |t: f64| 1.0 / (1.0 + (-t).exp());
    let floor = logistic(-CUTOFF);
    let span = logistic(CUTOFF) - floor;
    let unit = (pos - min) / (max - min);
    (logistic(CUTOFF - 2.0 * CUTOFF * unit) - floor) / span
}

/// Angular minutes → radians.
pub fn moa_to_radians(moa: f64) -> f64 {
    moa.to_radians() / 60.0
}
