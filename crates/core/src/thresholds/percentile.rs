//! Percentiles and distribution statistics over a batch of scores

use serde::{Deserialize, Serialize};

/// Linear-interpolated percentile of an ascending-sorted slice
///
/// `p` is in percent (0-100). Uses the `(n - 1)` rank convention: the 0th
/// percentile is the minimum and the 100th is the maximum. Returns `None` for an
/// empty slice.
#[must_use]
pub fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let rank = (p.clamp(0.0, 100.0) / 100.0) * last as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let fraction = rank - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * fraction)
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Quartiles {
    pub q1: f64,
    pub q2: f64,
    pub q3: f64,
}

/// Diagnostic summary of a batch's score distribution
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionStatistics {
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub quartiles: Quartiles,
}

impl DistributionStatistics {
    /// Statistics of an ascending-sorted slice; all zeros when empty
    #[must_use]
    pub fn from_sorted(sorted: &[f64]) -> Self {
        let (Some(&min), Some(&max)) = (sorted.first(), sorted.last()) else {
            return Self::default();
        };

        let n = sorted.len() as f64;
        let mean = sorted.iter().sum::<f64>() / n;
        let variance = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let at = |p| percentile(sorted, p).unwrap_or_default();

        Self {
            mean,
            median: at(50.0),
            std_dev: variance.sqrt(),
            min,
            max,
            quartiles: Quartiles {
                q1: at(25.0),
                q2: at(50.0),
                q3: at(75.0),
            },
        }
    }

    #[must_use]
    pub fn range(&self) -> f64 {
        self.max - self.min
    }
}
