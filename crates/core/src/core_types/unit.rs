//! Per-unit input bundle handed to the engine

use crate::core_types::hazard::HazardObservation;
use crate::core_types::spatial::GeoPoint;
use crate::core_types::vulnerability::VulnerabilityRecord;
use crate::core_types::weather::WeatherSnapshot;
use serde::{Deserialize, Serialize};

/// Everything known about one geographic unit for one run
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitInput {
    pub unit_id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Representative point (county centroid)
    #[serde(default)]
    pub location: Option<GeoPoint>,
    /// Region key for synthetic weather lookup
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub vulnerability: Vec<VulnerabilityRecord>,
    /// `None` when the hazard feed was unavailable for this unit
    #[serde(default)]
    pub hazards: Option<Vec<HazardObservation>>,
    #[serde(default)]
    pub weather: Option<WeatherSnapshot>,
}

impl UnitInput {
    #[must_use]
    pub fn new(unit_id: impl Into<String>) -> Self {
        Self {
            unit_id: unit_id.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_location(mut self, location: GeoPoint) -> Self {
        self.location = Some(location);
        self
    }

    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    #[must_use]
    pub fn with_vulnerability(mut self, records: Vec<VulnerabilityRecord>) -> Self {
        self.vulnerability = records;
        self
    }

    #[must_use]
    pub fn with_hazards(mut self, hazards: Vec<HazardObservation>) -> Self {
        self.hazards = Some(hazards);
        self
    }

    #[must_use]
    pub fn with_weather(mut self, weather: WeatherSnapshot) -> Self {
        self.weather = Some(weather);
        self
    }

    /// Describe the first structural problem, if any
    #[must_use]
    pub fn validation_error(&self) -> Option<String> {
        if self.unit_id.trim().is_empty() {
            return Some("unit id is empty".to_string());
        }
        if let Some(record) = self.vulnerability.iter().find(|r| !r.is_well_formed()) {
            return Some(format!("vulnerability record for {} is not finite", record.year));
        }
        if let Some(weather) = &self.weather {
            if !weather.is_well_formed() {
                return Some("weather snapshot contains non-finite values".to_string());
            }
        }
        if let Some(hazards) = &self.hazards {
            let bad = hazards.iter().find(|h| {
                !h.confidence_pct.is_finite()
                    || !h.radiative_power.is_finite()
                    || h.distance_from_unit.is_some_and(|d| !d.is_finite())
            });
            if let Some(h) = bad {
                return Some(format!("hazard {} contains non-finite values", h.id));
            }
        }
        None
    }
}
