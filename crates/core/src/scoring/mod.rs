//! Feature scorers
//!
//! Each scorer maps one raw input channel to a bounded `[0, 1]` score with a
//! human-readable description. Scorers are pure functions and never fail:
//! missing input produces a documented baseline.
//!
//! | channel | module | baseline when missing |
//! |---|---|---|
//! | hazard activity | [`hazard`] | 0.2 |
//! | weather | [`weather`] | 0.3 |
//! | vulnerability | [`vulnerability`] | neutral record, handled by the engine |

pub mod hazard;
pub mod ladder;
pub mod vulnerability;
pub mod weather;

pub use hazard::{score_hazard_activity, HazardSummary};
pub use ladder::{Comparison, Ladder, LadderStep};
pub use vulnerability::{analyze_trend, score_vulnerability, VulnerabilityTrend};
pub use weather::score_weather;

use serde::{Deserialize, Serialize};

/// Unweighted output of a scorer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelScore {
    pub score: f64,
    pub description: String,
}

impl ChannelScore {
    /// Build a score, clamping to `[0, 1]` (NaN becomes 0)
    #[must_use]
    pub fn new(score: f64, description: impl Into<String>) -> Self {
        let score = if score.is_nan() {
            0.0
        } else {
            score.clamp(0.0, 1.0)
        };
        Self {
            score,
            description: description.into(),
        }
    }
}

/// A channel score with its weight in the composite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureScore {
    pub score: f64,
    pub weight: f64,
    pub contribution: f64,
    pub description: String,
}

impl FeatureScore {
    #[must_use]
    pub fn weighted(channel: ChannelScore, weight: f64) -> Self {
        Self {
            score: channel.score,
            weight,
            contribution: channel.score * weight,
            description: channel.description,
        }
    }
}

/// Direction of a series over time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl TrendDirection {
    /// Classify a change against a symmetric dead band
    #[must_use]
    pub fn from_change(change: f64, band: f64) -> Self {
        if change > band {
            TrendDirection::Increasing
        } else if change < -band {
            TrendDirection::Decreasing
        } else {
            TrendDirection::Stable
        }
    }
}

/// Radii and cutoffs used to interpret hazard observations
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScoringConfig {
    /// Observations farther than this are ignored (miles)
    pub consideration_radius_miles: f64,
    /// Observations at or within this distance are "nearby" (miles)
    pub nearby_radius_miles: f64,
    /// Detection confidence at or above this is "high confidence" (%)
    pub high_confidence_pct: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            consideration_radius_miles: 100.0,
            nearby_radius_miles: 25.0,
            high_confidence_pct: 80.0,
        }
    }
}
