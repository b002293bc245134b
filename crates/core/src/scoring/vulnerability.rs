//! Vulnerability channel scorer and multi-year trend analysis
//!
//! The score starts from the latest year's overall index (normalized to `[0, 1]`)
//! and is adjusted by the direction of the series: worsening histories score
//! higher than improving ones with the same latest value.

use super::{ChannelScore, TrendDirection};
use crate::core_types::vulnerability::{VulnerabilityRecord, NEUTRAL_INDEX};
use serde::{Deserialize, Serialize};

/// Index-point change that counts as a real move rather than noise
pub const TREND_BAND: f64 = 2.0;

/// Multiplier for a worsening long-term trend
pub const WORSENING_MULTIPLIER: f64 = 1.1;

/// Multiplier for an improving long-term trend
pub const IMPROVING_MULTIPLIER: f64 = 0.9;

/// Extra multiplier when short- and long-term trends both increase
pub const COMPOUNDING_MULTIPLIER: f64 = 1.05;

/// Shape of a unit's vulnerability history
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VulnerabilityTrend {
    /// Long-term direction (first to last record)
    pub direction: TrendDirection,
    /// Direction over the last two records
    pub short_term: TrendDirection,
    pub long_term_change: f64,
    pub short_term_change: f64,
    pub change_per_year: f64,
    pub years_analyzed: usize,
    pub latest_index: f64,
    pub latest_year: Option<i32>,
}

impl VulnerabilityTrend {
    /// Trend multiplier applied to the normalized latest index
    #[must_use]
    pub fn multiplier(&self) -> f64 {
        let mut multiplier = match self.direction {
            TrendDirection::Increasing => WORSENING_MULTIPLIER,
            TrendDirection::Decreasing => IMPROVING_MULTIPLIER,
            TrendDirection::Stable => 1.0,
        };
        if self.direction == TrendDirection::Increasing
            && self.short_term == TrendDirection::Increasing
        {
            multiplier *= COMPOUNDING_MULTIPLIER;
        }
        multiplier
    }
}

/// Analyze a by-year sorted history. An empty history is neutral and stable.
#[must_use]
pub fn analyze_trend(sorted: &[VulnerabilityRecord]) -> VulnerabilityTrend {
    let (Some(first), Some(last)) = (sorted.first(), sorted.last()) else {
        return VulnerabilityTrend {
            direction: TrendDirection::Stable,
            short_term: TrendDirection::Stable,
            long_term_change: 0.0,
            short_term_change: 0.0,
            change_per_year: 0.0,
            years_analyzed: 0,
            latest_index: NEUTRAL_INDEX,
            latest_year: None,
        };
    };

    let long_term_change = last.overall_index - first.overall_index;
    let short_term_change = match sorted.len() {
        0 | 1 => 0.0,
        n => last.overall_index - sorted[n - 2].overall_index,
    };
    let span_years = f64::from(last.year.saturating_sub(first.year));
    let change_per_year = if span_years > 0.0 {
        long_term_change / span_years
    } else {
        0.0
    };

    VulnerabilityTrend {
        direction: TrendDirection::from_change(long_term_change, TREND_BAND),
        short_term: TrendDirection::from_change(short_term_change, TREND_BAND),
        long_term_change,
        short_term_change,
        change_per_year,
        years_analyzed: sorted.len(),
        latest_index: last.overall_index,
        latest_year: Some(last.year),
    }
}

/// Score a by-year sorted history
#[must_use]
pub fn score_vulnerability(sorted: &[VulnerabilityRecord]) -> (ChannelScore, VulnerabilityTrend) {
    let trend = analyze_trend(sorted);
    let score = trend.latest_index / 100.0 * trend.multiplier();

    let direction = match trend.direction {
        TrendDirection::Increasing => "worsening",
        TrendDirection::Decreasing => "improving",
        TrendDirection::Stable => "stable",
    };
    let mut description = format!(
        "Vulnerability index {:.0} ({direction} over {} year{})",
        trend.latest_index,
        trend.years_analyzed,
        if trend.years_analyzed == 1 { "" } else { "s" }
    );
    if let Some((theme, value)) = sorted.last().and_then(|r| r.sub_indices.dominant_theme()) {
        description.push_str(&format!("; highest theme: {theme} ({value:.0})"));
    }

    (ChannelScore::new(score, description), trend)
}
