//! Hazard-activity channel scorer
//!
//! Counts are normalized against small caps (10 active, 5 high-confidence,
//! 5 nearby) so a handful of events already saturates their share. Proximity,
//! severity and intensity then add fixed increments from ladders.

use super::ladder::{Ladder, LadderStep};
use super::{ChannelScore, ScoringConfig};
use crate::core_types::hazard::{HazardObservation, HazardRiskLevel};
use crate::core_types::units::Miles;
use serde::{Deserialize, Serialize};

/// Floor score: no reported danger is not proof of zero risk
pub const BASELINE: f64 = 0.2;

const ACTIVE_CAP: f64 = 10.0;
const ACTIVE_WEIGHT: f64 = 0.30;
const HIGH_CONFIDENCE_CAP: f64 = 5.0;
const HIGH_CONFIDENCE_WEIGHT: f64 = 0.20;
const NEARBY_CAP: f64 = 5.0;
const NEARBY_WEIGHT: f64 = 0.20;

/// Distance to the closest event, miles
pub const PROXIMITY: Ladder = Ladder::falls_below(&[
    LadderStep::new(5.0, 0.30),
    LadderStep::new(10.0, 0.20),
    LadderStep::new(25.0, 0.10),
    LadderStep::new(50.0, 0.05),
]);

/// Fire radiative power of the most intense event, MW
pub const INTENSITY: Ladder = Ladder::exceeds(&[
    LadderStep::new(100.0, 0.10),
    LadderStep::new(50.0, 0.05),
]);

/// Increment for the worst provider-assigned severity
#[must_use]
pub fn severity_increment(level: HazardRiskLevel) -> f64 {
    match level {
        HazardRiskLevel::Critical => 0.20,
        HazardRiskLevel::High => 0.15,
        HazardRiskLevel::Moderate => 0.05,
        HazardRiskLevel::Low => 0.0,
    }
}

/// Aggregate view of a unit's hazard feed
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HazardSummary {
    /// Observations in the feed before the radius filter
    pub reported: usize,
    /// Observations within the consideration radius
    pub active: usize,
    pub high_confidence: usize,
    pub nearby: usize,
    /// At least one event is both high-confidence and nearby
    pub high_confidence_nearby: bool,
    pub closest: Option<Miles>,
    pub worst_level: Option<HazardRiskLevel>,
    pub max_radiative_power: f64,
}

impl HazardSummary {
    #[must_use]
    pub fn from_observations(observations: &[HazardObservation], config: &ScoringConfig) -> Self {
        let consideration = Miles::new(config.consideration_radius_miles);
        let nearby_radius = Miles::new(config.nearby_radius_miles);

        let mut summary = HazardSummary {
            reported: observations.len(),
            ..HazardSummary::default()
        };

        for obs in observations.iter().filter(|o| o.is_within(consideration)) {
            summary.active += 1;
            let high_confidence = obs.is_high_confidence(config.high_confidence_pct);
            let nearby = obs.is_nearby(nearby_radius);
            if high_confidence {
                summary.high_confidence += 1;
            }
            if nearby {
                summary.nearby += 1;
            }
            summary.high_confidence_nearby |= high_confidence && nearby;
            if let Some(d) = obs.distance_from_unit {
                summary.closest = Some(summary.closest.map_or(d, |c| c.min(d)));
            }
            summary.worst_level = summary.worst_level.max(Some(obs.risk_level));
            summary.max_radiative_power = summary.max_radiative_power.max(obs.radiative_power);
        }

        summary
    }
}

/// Score the hazard channel. `None` means the feed was unavailable.
#[must_use]
pub fn score_hazard_activity(summary: Option<&HazardSummary>) -> ChannelScore {
    let summary = match summary {
        Some(s) if s.active > 0 => s,
        Some(_) => return ChannelScore::new(BASELINE, "No active hazards detected nearby"),
        None => return ChannelScore::new(BASELINE, "Hazard data unavailable - using baseline"),
    };

    let active = summary.active as f64;
    let high_confidence = summary.high_confidence as f64;
    let nearby = summary.nearby as f64;

    let mut score = (active / ACTIVE_CAP).min(1.0) * ACTIVE_WEIGHT
        + (high_confidence / HIGH_CONFIDENCE_CAP).min(1.0) * HIGH_CONFIDENCE_WEIGHT
        + (nearby / NEARBY_CAP).min(1.0) * NEARBY_WEIGHT;

    if let Some(closest) = summary.closest {
        score += PROXIMITY.evaluate(*closest);
    }
    if let Some(level) = summary.worst_level {
        score += severity_increment(level);
    }
    score += INTENSITY.evaluate(summary.max_radiative_power);

    let mut description = format!(
        "{} active hazard{}, {} high-confidence, {} nearby",
        summary.active,
        if summary.active == 1 { "" } else { "s" },
        summary.high_confidence,
        summary.nearby
    );
    if let Some(closest) = summary.closest {
        description.push_str(&format!(" (closest {closest})"));
    }

    ChannelScore::new(score.max(BASELINE), description)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::spatial::GeoPoint;
    use approx::assert_abs_diff_eq;
    use chrono::Utc;

    fn event(distance: f64, confidence: f64, level: HazardRiskLevel) -> HazardObservation {
        HazardObservation {
            id: format!("evt-{distance}"),
            location: GeoPoint::new(34.0, -118.0),
            confidence_pct: confidence,
            radiative_power: 30.0,
            distance_from_unit: Some(Miles::new(distance)),
            risk_level: level,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_unavailable_and_empty_are_baseline() {
        assert_eq!(score_hazard_activity(None).score, BASELINE);
        let empty = HazardSummary::from_observations(&[], &ScoringConfig::default());
        let score = score_hazard_activity(Some(&empty));
        assert_eq!(score.score, BASELINE);
        assert!(score.description.contains("No active"));
    }

    #[test]
    fn test_single_nearby_high_confidence_event() {
        let summary = HazardSummary::from_observations(
            &[event(3.0, 90.0, HazardRiskLevel::High)],
            &ScoringConfig::default(),
        );
        assert!(summary.high_confidence_nearby);
        // 0.03 + 0.04 + 0.04 + 0.30 proximity + 0.15 severity
        assert_abs_diff_eq!(score_hazard_activity(Some(&summary)).score, 0.56, epsilon = 1e-12);
    }

    #[test]
    fn test_distant_events_are_ignored() {
        let summary = HazardSummary::from_observations(
            &[event(150.0, 95.0, HazardRiskLevel::Critical)],
            &ScoringConfig::default(),
        );
        assert_eq!(summary.reported, 1);
        assert_eq!(summary.active, 0);
        assert_eq!(score_hazard_activity(Some(&summary)).score, BASELINE);
    }

    #[test]
    fn test_weak_far_event_floors_at_baseline() {
        let summary = HazardSummary::from_observations(
            &[event(80.0, 30.0, HazardRiskLevel::Low)],
            &ScoringConfig::default(),
        );
        assert_eq!(score_hazard_activity(Some(&summary)).score, BASELINE);
    }

    #[test]
    fn test_many_events_saturate() {
        let events: Vec<_> = (0..20)
            .map(|i| event(1.0 + f64::from(i), 95.0, HazardRiskLevel::Critical))
            .collect();
        let summary = HazardSummary::from_observations(&events, &ScoringConfig::default());
        assert_eq!(summary.closest, Some(Miles::new(1.0)));
        assert_eq!(score_hazard_activity(Some(&summary)).score, 1.0);
    }
}
