//! Detected hazard events (satellite fire detections and similar)

use crate::core_types::spatial::GeoPoint;
use crate::core_types::units::Miles;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity tier assigned to an observation by the detection provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HazardRiskLevel {
    Low,
    Moderate,
    High,
    Critical,
}

/// One detected hazard event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HazardObservation {
    pub id: String,
    pub location: GeoPoint,
    /// Detection confidence (0-100)
    pub confidence_pct: f64,
    /// Fire radiative power in megawatts
    #[serde(default)]
    pub radiative_power: f64,
    /// Distance to the unit this copy was associated with
    #[serde(default)]
    pub distance_from_unit: Option<Miles>,
    pub risk_level: HazardRiskLevel,
    pub timestamp: DateTime<Utc>,
}

impl HazardObservation {
    /// Whether the detection is at or above the given confidence
    #[must_use]
    pub fn is_high_confidence(&self, min_confidence_pct: f64) -> bool {
        self.confidence_pct >= min_confidence_pct
    }

    /// Within `radius` of the unit; observations without a distance count as in range
    #[must_use]
    pub fn is_within(&self, radius: Miles) -> bool {
        self.distance_from_unit.is_none_or(|d| d <= radius)
    }

    /// Within `radius` of the unit; observations without a distance are not nearby
    #[must_use]
    pub fn is_nearby(&self, radius: Miles) -> bool {
        self.distance_from_unit.is_some_and(|d| d <= radius)
    }
}

/// Annotate observations with their distance from `unit_location`, keep those within
/// `radius`, nearest first.
#[must_use]
pub fn associate_hazards(
    observations: &[HazardObservation],
    unit_location: &GeoPoint,
    radius: Miles,
) -> Vec<HazardObservation> {
    let mut associated: Vec<HazardObservation> = observations
        .iter()
        .filter(|obs| obs.location.is_valid())
        .filter_map(|obs| {
            let distance = unit_location.distance_miles(&obs.location);
            (distance <= radius).then(|| HazardObservation {
                distance_from_unit: Some(distance),
                ..obs.clone()
            })
        })
        .collect();
    associated.sort_by(|a, b| a.distance_from_unit.cmp(&b.distance_from_unit));
    associated
}
