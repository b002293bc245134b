//! Dynamic, population-relative classification thresholds
//!
//! Cut points are percentiles of the current batch's composite scores, so the same
//! raw score can land in HIGH in one batch and MEDIUM in the next when the
//! distribution shifts. Small or degenerate batches fall back to a fixed set.
//!
//! # Two-phase protocol
//!
//! 1. Every unit is scored and provisionally classified against
//!    [`ThresholdSet::fallback`].
//! 2. Once all units are scored, one [`ThresholdSet`] is computed from the full
//!    batch and every unit is re-classified against it.
//!
//! The pipeline enforces the barrier between the phases; see
//! [`crate::pipeline::ScoredBatch`].

pub mod percentile;
pub mod tier;

pub use percentile::{percentile, DistributionStatistics, Quartiles};
pub use tier::{RiskLevel, RiskTier};

use crate::error::{Result, RiskError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// How a threshold set was derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Methodology {
    /// Percentiles of the batch
    Dynamic,
    /// Static cut points (sample too small or degenerate)
    Fallback,
}

/// One cut point and the percentile it represents
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    pub threshold: f64,
    pub percentile: f64,
}

/// Static cut points used when percentiles would be unreliable
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FallbackThresholds {
    pub high: f64,
    pub medium: f64,
    pub low: f64,
}

impl Default for FallbackThresholds {
    fn default() -> Self {
        Self {
            high: 0.60,
            medium: 0.35,
            low: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ThresholdConfig {
    pub high_percentile: f64,
    pub medium_percentile: f64,
    pub low_percentile: f64,
    /// Batches smaller than this use the fallback set
    pub min_sample_size: usize,
    /// Minimum gap between adjacent cut points, as a fraction of the score range
    pub min_separation_ratio: f64,
    pub fallback: FallbackThresholds,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            high_percentile: 75.0,
            medium_percentile: 50.0,
            low_percentile: 25.0,
            min_sample_size: 10,
            min_separation_ratio: 0.05,
            fallback: FallbackThresholds::default(),
        }
    }
}

impl ThresholdConfig {
    /// # Errors
    /// Returns [`RiskError::Config`] when percentiles or fallback cut points are
    /// out of order or out of range.
    pub fn validate(&self) -> Result<()> {
        let in_range = |p: f64| (0.0..=100.0).contains(&p);
        if !(in_range(self.high_percentile)
            && in_range(self.medium_percentile)
            && in_range(self.low_percentile)
            && self.high_percentile >= self.medium_percentile
            && self.medium_percentile >= self.low_percentile)
        {
            return Err(RiskError::Config(
                "threshold percentiles must satisfy 100 >= high >= medium >= low >= 0".into(),
            ));
        }
        let fb = &self.fallback;
        if !(fb.high <= 1.0 && fb.high >= fb.medium && fb.medium >= fb.low && fb.low >= 0.0) {
            return Err(RiskError::Config(
                "fallback thresholds must satisfy 1 >= high >= medium >= low >= 0".into(),
            ));
        }
        if self.min_sample_size < 2 {
            return Err(RiskError::Config("minSampleSize must be at least 2".into()));
        }
        if !(0.0..=0.5).contains(&self.min_separation_ratio) {
            return Err(RiskError::Config(
                "minSeparationRatio must be between 0 and 0.5".into(),
            ));
        }
        Ok(())
    }
}

/// Batch-scoped classification cut points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdSet {
    #[serde(rename = "HIGH")]
    pub high: Threshold,
    #[serde(rename = "MEDIUM")]
    pub medium: Threshold,
    #[serde(rename = "LOW")]
    pub low: Threshold,
    pub statistics: DistributionStatistics,
    pub sample_size: usize,
    pub methodology: Methodology,
    pub computed_at: DateTime<Utc>,
}

impl ThresholdSet {
    /// The static set, with no sample attached
    #[must_use]
    pub fn fallback(config: &ThresholdConfig) -> Self {
        Self {
            high: Threshold {
                threshold: config.fallback.high,
                percentile: config.high_percentile,
            },
            medium: Threshold {
                threshold: config.fallback.medium,
                percentile: config.medium_percentile,
            },
            low: Threshold {
                threshold: config.fallback.low,
                percentile: config.low_percentile,
            },
            statistics: DistributionStatistics::default(),
            sample_size: 0,
            methodology: Methodology::Fallback,
            computed_at: Utc::now(),
        }
    }

    /// Tier of `score` under these cut points
    #[must_use]
    pub fn classify(&self, score: f64) -> RiskTier {
        if score >= self.high.threshold {
            RiskTier::High
        } else if score >= self.medium.threshold {
            RiskTier::Medium
        } else {
            RiskTier::Low
        }
    }

    /// True when both sets would classify every score identically
    #[must_use]
    pub fn same_cut_points(&self, other: &ThresholdSet) -> bool {
        self.high.threshold == other.high.threshold
            && self.medium.threshold == other.medium.threshold
            && self.low.threshold == other.low.threshold
    }
}

/// Computes a [`ThresholdSet`] from one batch of composite scores
#[derive(Debug, Clone, Default)]
pub struct DynamicThresholdCalculator {
    config: ThresholdConfig,
}

impl DynamicThresholdCalculator {
    #[must_use]
    pub fn new(config: ThresholdConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &ThresholdConfig {
        &self.config
    }

    /// Compute the batch's threshold set
    ///
    /// Non-finite scores are ignored.
    ///
    /// # Errors
    /// Returns [`RiskError::EmptyBatch`] when no finite score is supplied.
    pub fn calculate(&self, scores: &[f64]) -> Result<ThresholdSet> {
        let mut sorted: Vec<f64> = scores.iter().copied().filter(|s| s.is_finite()).collect();
        if sorted.is_empty() {
            return Err(RiskError::EmptyBatch);
        }
        sorted.sort_by(f64::total_cmp);

        let statistics = DistributionStatistics::from_sorted(&sorted);
        let sample_size = sorted.len();

        if sample_size < self.config.min_sample_size {
            warn!(
                sample_size,
                min_sample_size = self.config.min_sample_size,
                "Insufficient sample for dynamic thresholds, using fallback set"
            );
            return Ok(self.fallback_with(statistics, sample_size));
        }
        if statistics.range() <= f64::EPSILON {
            warn!(
                sample_size,
                score = statistics.min,
                "All scores identical, using fallback set"
            );
            return Ok(self.fallback_with(statistics, sample_size));
        }

        let at = |p| percentile(&sorted, p).unwrap_or_default();
        let raw_high = at(self.config.high_percentile);
        let raw_medium = at(self.config.medium_percentile);
        let raw_low = at(self.config.low_percentile);

        let min_separation = self.config.min_separation_ratio * statistics.range();
        let (high, medium, low) = smooth(raw_high, raw_medium, raw_low, min_separation);

        debug!(
            sample_size,
            raw_high, raw_medium, raw_low, high, medium, low, "Computed dynamic thresholds"
        );

        Ok(ThresholdSet {
            high: Threshold {
                threshold: high,
                percentile: self.config.high_percentile,
            },
            medium: Threshold {
                threshold: medium,
                percentile: self.config.medium_percentile,
            },
            low: Threshold {
                threshold: low,
                percentile: self.config.low_percentile,
            },
            statistics,
            sample_size,
            methodology: Methodology::Dynamic,
            computed_at: Utc::now(),
        })
    }

    fn fallback_with(&self, statistics: DistributionStatistics, sample_size: usize) -> ThresholdSet {
        ThresholdSet {
            statistics,
            sample_size,
            ..ThresholdSet::fallback(&self.config)
        }
    }
}

/// Tolerance when checking whether a gap already meets the minimum separation
const SEPARATION_TOLERANCE: f64 = 1e-9;

/// Upper bound on relaxation passes in [`smooth`]
const MAX_SMOOTHING_PASSES: usize = 64;

/// Push adjacent cut points at least `min_separation` apart
///
/// Each too-close pair is moved symmetrically about its midpoint and clamped to
/// `[0, 1]`. Separating one pair can crowd the other, so passes repeat until both
/// gaps hold. Ordering `high >= medium >= low` is enforced last.
fn smooth(high: f64, medium: f64, low: f64, min_separation: f64) -> (f64, f64, f64) {
    let (mut high, mut medium, mut low) = (high, medium, low);
    for _ in 0..MAX_SMOOTHING_PASSES {
        if is_separated(high, medium, min_separation) && is_separated(medium, low, min_separation)
        {
            break;
        }
        (high, medium) = separate(high, medium, min_separation);
        (medium, low) = separate(medium, low, min_separation);
    }
    let medium = medium.min(high);
    let low = low.min(medium);
    (high, medium, low)
}

fn is_separated(upper: f64, lower: f64, min_separation: f64) -> bool {
    upper - lower >= min_separation - SEPARATION_TOLERANCE
}

fn separate(upper: f64, lower: f64, min_separation: f64) -> (f64, f64) {
    if is_separated(upper, lower, min_separation) {
        return (upper, lower);
    }
    let mid = (upper + lower) / 2.0;
    let half = min_separation / 2.0;
    ((mid + half).min(1.0), (mid - half).max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn spread(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64 / (n - 1) as f64).collect()
    }

    #[test]
    fn test_small_batch_uses_fallback() {
        let calc = DynamicThresholdCalculator::default();
        let set = calc.calculate(&[0.9, 0.5, 0.1]).unwrap();
        assert_eq!(set.methodology, Methodology::Fallback);
        assert!(set.same_cut_points(&ThresholdSet::fallback(calc.config())));
        assert_eq!(set.sample_size, 3);
        assert_abs_diff_eq!(set.statistics.mean, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_batch_is_error() {
        let calc = DynamicThresholdCalculator::default();
        assert!(matches!(calc.calculate(&[]), Err(RiskError::EmptyBatch)));
        assert!(matches!(calc.calculate(&[f64::NAN]), Err(RiskError::EmptyBatch)));
    }

    #[test]
    fn test_uniform_spread_percentiles() {
        // 0.0, 0.1, ..., 1.0
        let set = DynamicThresholdCalculator::default().calculate(&spread(11)).unwrap();
        assert_eq!(set.methodology, Methodology::Dynamic);
        assert_abs_diff_eq!(set.high.threshold, 0.75, epsilon = 1e-12);
        assert_abs_diff_eq!(set.medium.threshold, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(set.low.threshold, 0.25, epsilon = 1e-12);
        assert_eq!(set.high.percentile, 75.0);
    }

    #[test]
    fn test_clustered_batch_is_separated() {
        // Nine identical scores and one outlier: p25..p75 all collapse onto 0.4
        let mut scores = vec![0.4; 9];
        scores.push(0.9);
        let set = DynamicThresholdCalculator::default().calculate(&scores).unwrap();
        let sep = 0.05 * 0.5;
        assert!(set.high.threshold - set.medium.threshold >= sep - 1e-6);
        assert!(set.medium.threshold - set.low.threshold >= sep - 1e-6);
        assert_abs_diff_eq!(set.medium.threshold, 0.4, epsilon = 1e-6);
        assert_abs_diff_eq!(set.high.threshold, 0.4 + sep, epsilon = 1e-6);
        assert_abs_diff_eq!(set.low.threshold, 0.4 - sep, epsilon = 1e-6);
    }

    #[test]
    fn test_identical_scores_fall_back() {
        let set = DynamicThresholdCalculator::default().calculate(&[0.5; 12]).unwrap();
        assert_eq!(set.methodology, Methodology::Fallback);
    }

    #[test]
    fn test_same_score_classifies_differently_across_batches() {
        let calc = DynamicThresholdCalculator::default();
        let low_batch: Vec<f64> = (0..20).map(|i| 0.1 + i as f64 * 0.02).collect();
        let high_batch: Vec<f64> = (0..20).map(|i| 0.45 + i as f64 * 0.02).collect();
        let a = calc.calculate(&low_batch).unwrap();
        let b = calc.calculate(&high_batch).unwrap();
        assert_eq!(a.classify(0.48), RiskTier::High);
        assert_eq!(b.classify(0.48), RiskTier::Low);
    }

    #[test]
    fn test_classify_boundaries_are_inclusive() {
        let set = ThresholdSet::fallback(&ThresholdConfig::default());
        assert_eq!(set.classify(0.60), RiskTier::High);
        assert_eq!(set.classify(0.5999), RiskTier::Medium);
        assert_eq!(set.classify(0.35), RiskTier::Medium);
        assert_eq!(set.classify(0.1), RiskTier::Low);
    }

    #[test]
    fn test_smooth_repeats_until_both_gaps_hold() {
        // One pass leaves high/medium 0.05 apart after low/medium is pushed
        let (h, m, l) = smooth(0.5, 0.5, 0.5, 0.1);
        assert!(h - m >= 0.1 - 1e-6, "high {h} medium {m}");
        assert!(m - l >= 0.1 - 1e-6, "medium {m} low {l}");
        assert!(h <= 1.0 && l >= 0.0);
    }

    #[test]
    fn test_smooth_preserves_order_at_ceiling() {
        let (h, m, l) = smooth(1.0, 1.0, 1.0, 0.05);
        assert!(h >= m && m >= l);
        assert!(h <= 1.0 && l >= 0.0);
    }

    #[test]
    fn test_config_validation() {
        assert!(ThresholdConfig::default().validate().is_ok());
        let bad = ThresholdConfig {
            high_percentile: 40.0,
            ..ThresholdConfig::default()
        };
        assert!(bad.validate().is_err());
    }
}
