use crate::{ShotRng, MAX_RECOIL};

/// Accumulated angular-deviation contributions for a single shot.
///
/// Built once per shot and discarded. Sources are kept in insertion order;
/// multipliers apply to the running sum of all sources, not per source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispersionSources {
    linear_sources: Vec<f64>,
    normal_sources: Vec<f64>,
    multipliers: Vec<f64>,
    spread: f64,
}

impl DispersionSources {
    pub fn new(initial: f64) -> Self {
        Self {
            linear_sources: vec![initial],
            ..Self::default()
        }
    }

    pub fn add_linear(&mut self, source: f64) {
        self.linear_sources.push(source);
    }

    /// Zero-magnitude normal sources are dropped rather than stored.
    pub fn add_normal(&mut self, source: f64) {
        if source != 0.0 {
            self.normal_sources.push(source);
        }
    }

    pub fn add_multiplier(&mut self, multiplier: f64) {
        self.multipliers.push(multiplier);
    }

    pub fn set_spread(&mut self, spread: f64) {
        self.spread = spread;
    }

    pub fn spread(&self) -> f64 {
        self.spread
    }

    /// One random shot deviation in angular minutes, capped at
    /// [`MAX_RECOIL`]. Linear sources sample uniformly on `[0, s]`; normal
    /// sources a bounded curve (mean `s/2`, sd `s/4`, clamped to `[0, s]`).
    /// Spread is not part of the roll.
    pub fn roll(&self, rng: &mut ShotRng) -> f64 {
        let mut total = 0.0;
        for &source in &self.linear_sources {
            total += rng.uniform(0.0, source);
        }
        for &source in &self.normal_sources {
            total += rng.normal(source / 2.0, source / 4.0).clamp(0.0, source);
        }
        for &multiplier in &self.multipliers {
            total *= multiplier;
        }
        total.min(MAX_RECOIL)
    }

    /// Deterministic worst-case deviation: full sum of every source,
    /// multipliers applied, spread added last. Not clamped to the recoil
    /// ceiling.
    pub fn max(&self) -> f64 {
        let mut total: f64 = self.linear_sources.iter().sum::<f64>()
            + self.normal_sources.iter().sum::<f64>();
        for &multiplier in &self.multipliers {
            total *= multiplier;
        }
        total + self.spread
    }
}
