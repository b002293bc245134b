//! Confidence estimation from data completeness
//!
//! Confidence starts from a fixed base and earns bounded bonuses for each input
//! channel that is rich enough to trust. Only ambiguous or missing data goes
//! without a bonus: a hazard feed that positively reports zero events still
//! counts in the unit's favour.

use crate::core_types::weather::WeatherSnapshot;
use crate::scoring::HazardSummary;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfidenceConfig {
    pub base: f64,
    pub min: f64,
    pub max: f64,
    /// Bonus per year of history beyond the first
    pub per_year_bonus: f64,
    pub max_history_bonus: f64,
    /// At least one high-confidence event within the nearby radius
    pub hazard_confirmed_bonus: f64,
    /// Feed reported, zero events
    pub hazard_absence_bonus: f64,
    /// Events present but none both high-confidence and nearby
    pub hazard_partial_bonus: f64,
    /// Scaled by populated weather fields / 4
    pub weather_completeness_bonus: f64,
    /// Synthetic snapshots earn this fraction of the completeness bonus
    pub synthetic_weather_factor: f64,
    pub algorithm_confidence: f64,
    /// All three channels adequate
    pub completeness_bonus: f64,
    pub adequate_history_years: usize,
    pub adequate_weather_completeness: f64,
    /// Maximum jitter as a fraction of the value
    pub jitter_fraction: f64,
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            base: 0.70,
            min: 0.70,
            max: 0.95,
            per_year_bonus: 0.025,
            max_history_bonus: 0.10,
            hazard_confirmed_bonus: 0.05,
            hazard_absence_bonus: 0.03,
            hazard_partial_bonus: 0.02,
            weather_completeness_bonus: 0.05,
            synthetic_weather_factor: 0.5,
            algorithm_confidence: 0.05,
            completeness_bonus: 0.02,
            adequate_history_years: 3,
            adequate_weather_completeness: 0.5,
            jitter_fraction: 0.01,
        }
    }
}

/// What the estimator knows about a unit's inputs
#[derive(Debug, Clone, Copy)]
pub struct ConfidenceInputs<'a> {
    /// Real (not synthesized) years of vulnerability history
    pub history_years: usize,
    /// `None` when the hazard feed was unavailable
    pub hazard: Option<&'a HazardSummary>,
    pub weather: Option<&'a WeatherSnapshot>,
}

impl ConfidenceConfig {
    fn history_bonus(&self, years: usize) -> f64 {
        (years.saturating_sub(1) as f64 * self.per_year_bonus).min(self.max_history_bonus)
    }

    fn hazard_bonus(&self, hazard: Option<&HazardSummary>) -> f64 {
        match hazard {
            None => 0.0,
            Some(h) if h.high_confidence_nearby => self.hazard_confirmed_bonus,
            Some(h) if h.active == 0 => self.hazard_absence_bonus,
            Some(_) => self.hazard_partial_bonus,
        }
    }

    fn weather_completeness(&self, weather: Option<&WeatherSnapshot>) -> f64 {
        weather.map_or(0.0, |w| {
            let completeness = w.populated_fields() as f64 / 4.0;
            if w.synthetic {
                completeness * self.synthetic_weather_factor
            } else {
                completeness
            }
        })
    }

    /// Clamped confidence before jitter
    #[must_use]
    pub fn estimate(&self, inputs: &ConfidenceInputs<'_>) -> f64 {
        let weather_completeness = self.weather_completeness(inputs.weather);
        let all_adequate = inputs.history_years >= self.adequate_history_years
            && inputs.hazard.is_some()
            && weather_completeness >= self.adequate_weather_completeness;

        let raw = self.base
            + self.history_bonus(inputs.history_years)
            + self.hazard_bonus(inputs.hazard)
            + weather_completeness * self.weather_completeness_bonus
            + self.algorithm_confidence
            + if all_adequate { self.completeness_bonus } else { 0.0 };

        raw.clamp(self.min, self.max)
    }

    /// Perturb `value` by `offset` (in `[-1, 1]`) times the jitter fraction, staying
    /// inside the clamp range
    #[must_use]
    pub fn apply_jitter(&self, value: f64, offset: f64) -> f64 {
        let offset = offset.clamp(-1.0, 1.0);
        (value * (1.0 + offset * self.jitter_fraction)).clamp(self.min, self.max)
    }
}

/// Source of the small per-unit confidence perturbation
pub trait JitterSource: Send + Sync + fmt::Debug {
    /// Offset in `[-1, 1]` for `unit_id`
    fn offset(&self, unit_id: &str) -> f64;
}

/// No perturbation
#[derive(Debug, Clone, Copy, Default)]
pub struct NoJitter;

impl JitterSource for NoJitter {
    fn offset(&self, _unit_id: &str) -> f64 {
        0.0
    }
}

/// Deterministic per-unit perturbation derived from a seed and the unit id
///
/// Independent of evaluation order, so parallel batches reproduce exactly.
#[derive(Debug, Clone, Copy)]
pub struct SeededJitter {
    seed: u64,
}

impl SeededJitter {
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl JitterSource for SeededJitter {
    fn offset(&self, unit_id: &str) -> f64 {
        let mut hasher = FxHasher::default();
        unit_id.hash(&mut hasher);
        let mut rng = StdRng::seed_from_u64(self.seed ^ hasher.finish());
        rng.random_range(-1.0..=1.0)
    }
}

/// Fresh randomness on every call
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngJitter;

impl JitterSource for ThreadRngJitter {
    fn offset(&self, _unit_id: &str) -> f64 {
        rand::rng().random_range(-1.0..=1.0)
    }
}
