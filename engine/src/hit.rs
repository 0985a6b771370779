use serde::{Deserialize, Serialize};

use crate::dispersion::DispersionSources;
use crate::{moa_to_radians, ShotRng};

/// Missed-by cutoffs, from best to worst.
const CUTOFF_CRITICAL: f64 = 0.2;
const CUTOFF_GOOD: f64 = 0.5;
const CUTOFF_NORMAL: f64 = 0.8;
const CUTOFF_GRAZE: f64 = 1.0;

/// Trials used for the stochastic distribution unless the caller says
/// otherwise.
pub const DEFAULT_TRIALS: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeClass {
    Tiny,
    Small,
    Medium,
    Large,
    Huge,
}

impl SizeClass {
    /// Fraction of its tile the target actually fills.
    pub fn occupied_fraction(self) -> f64 {
        match self {
            SizeClass::Tiny => 0.1,
            SizeClass::Small => 0.25,
            SizeClass::Medium => 0.5,
            SizeClass::Large => 0.75,
            SizeClass::Huge => 1.0,
        }
    }

    /// Target radius in tiles.
    pub fn radius(self) -> f64 {
        0.5 * self.occupied_fraction()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitTier {
    Critical,
    Good,
    Normal,
    Graze,
    Miss,
}

/// Linear deviation from the aim point at `range` tiles for an angular
/// deviation of `moa`. The half-angle projection (without a compensating
/// factor of 2) matches the shipped upstream behavior.
pub fn projectile_deviation(moa: f64, range: f64) -> f64 {
    (moa_to_radians(moa) / 2.0).tan() * range
}

/// Classify a normalized miss distance (deviation ÷ target radius).
pub fn classify_missed_by(missed_by: f64) -> HitTier {
    if missed_by >= CUTOFF_GRAZE {
        HitTier::Miss
    } else if missed_by >= CUTOFF_NORMAL {
        HitTier::Graze
    } else if missed_by >= CUTOFF_GOOD {
        HitTier::Normal
    } else if missed_by >= CUTOFF_CRITICAL {
        HitTier::Good
    } else {
        HitTier::Critical
    }
}

/// Five-way stochastic outcome distribution, in percent. Sums to 100 within
/// floating-point rounding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct HitPercentages {
    pub critical: f64,
    pub good: f64,
    pub normal: f64,
    pub graze: f64,
    pub miss: f64,
}

impl HitPercentages {
    /// Expected damage fraction per shot given per-tier damage multipliers.
    pub fn expected_damage_fraction(&self) -> f64 {
        (self.critical * crate::cycle::CRITICAL_DAMAGE_MULTIPLIER
            + self.good * crate::cycle::GOOD_DAMAGE_MULTIPLIER
            + self.normal
            + self.graze * crate::cycle::GRAZE_DAMAGE_MULTIPLIER)
            / 100.0
    }
}

/// Sample the assembled dispersion `trials` times against a sized target at
/// `range` and tally the outcome tiers.
pub fn hit_distribution(
    rng: &mut ShotRng,
    sources: &DispersionSources,
    range: f64,
    size: SizeClass,
    trials: usize,
) -> HitPercentages {
    let trials = trials.max(1);
    let radius = size.radius();
    let mut counts = [0usize; 5];
    for _ in 0..trials {
        let deviation = projectile_deviation(sources.roll(rng), range);
        let missed_by = if radius > 0.0 {
            deviation / radius
        } else {
            CUTOFF_GRAZE
        };
        let slot = match classify_missed_by(missed_by) {
            HitTier::Critical => 0,
            HitTier::Good => 1,
            HitTier::Normal => 2,
            HitTier::Graze => 3,
            HitTier::Miss => 4,
        };
        counts[slot] += 1;
    }
    let pct = |count: usize| 100.0 * count as f64 / trials as f64;
    HitPercentages {
        critical: pct(counts[0]),
        good: pct(counts[1]),
        normal: pct(counts[2]),
        graze: pct(counts[3]),
        miss: pct(counts[4]),
    }
}

/// Deterministic proxy for hit likelihood, derived from the worst-case
/// dispersion bound. Point blank is twice the occupied fraction. The raw
/// value is not clamped at 1.0; only the tiers clamp.
pub fn confidence_estimate(sources: &DispersionSources, range: f64, size: SizeClass) -> f64 {
    if range == 0.0 {
        return 2.0 * size.occupied_fraction();
    }
    let max_deviation = projectile_deviation(sources.max(), range).max(1e-6);
    size.occupied_fraction() / max_deviation
}

/// Four-tier deterministic preview; integer percentages summing to exactly
/// 100 after the final-tier adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ConfidencePercentages {
    pub great: i32,
    pub normal: i32,
    pub graze: i32,
    pub miss: i32,
}

impl ConfidencePercentages {
    pub fn total(&self) -> i32 {
        self.great + self.normal + self.graze + self.miss
    }
}

/// Accuracy factors of the three non-miss tiers, cumulative.
const CONFIDENCE_TIER_FACTORS: [f64; 3] = [0.5, 0.8, 1.0];

pub fn confidence_breakdown(confidence: f64) -> ConfidencePercentages {
    let mut cumulative = 0.0;
    let mut tiers = [0i32; 3];
    for (tier, factor) in tiers.iter_mut().zip(CONFIDENCE_TIER_FACTORS) {
        let ceiling = (100.0 * factor * confidence).min(100.0);
        let chance = (ceiling - cumulative).max(0.0);
        *tier = chance.round() as i32;
        cumulative += chance;
    }
    let [great, mut normal, mut graze] = tiers;
    let mut miss = 100 - great - normal - graze;
    if miss < 0 {
        // Rounding overshot; take it out of the last computed tier.
        graze += miss;
        miss = 0;
    }
    if graze < 0 {
        normal += graze;
        graze = 0;
    }
    ConfidencePercentages {
        great,
        normal,
        graze,
        miss,
    }
}
