//! Batch input file
//!
//! A dataset bundles every unit of one run with the shared hazard feed and the
//! regional base weather, as delivered by the upstream collectors.

use crate::core_types::hazard::HazardObservation;
use crate::core_types::unit::UnitInput;
use crate::core_types::weather::WeatherSnapshot;
use crate::error::{Result, RiskError};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchDataset {
    pub units: Vec<UnitInput>,
    /// Shared hazard feed; `None` when the feed was unavailable for the run
    #[serde(default)]
    pub observations: Option<Vec<HazardObservation>>,
    /// Base snapshot per region key
    #[serde(default)]
    pub regional_weather: FxHashMap<String, WeatherSnapshot>,
    /// Calendar month (1-12) for seasonal adjustment; the current month when absent
    #[serde(default)]
    pub month: Option<u32>,
}

impl BatchDataset {
    /// Parse a dataset from JSON
    ///
    /// # Errors
    /// Returns [`RiskError::DatasetParse`] if the JSON does not describe a dataset.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| RiskError::DatasetParse(e.to_string()))
    }

    /// Load a dataset file
    ///
    /// # Errors
    /// Returns [`RiskError::DatasetLoad`] if the file cannot be read, or
    /// [`RiskError::DatasetParse`] if it cannot be parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|e| RiskError::DatasetLoad(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&contents)
    }

    /// Write the dataset as pretty-printed JSON
    ///
    /// # Errors
    /// Returns [`RiskError::DatasetParse`] if serialization fails, or
    /// [`RiskError::DatasetLoad`] if the file cannot be written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| RiskError::DatasetParse(e.to_string()))?;
        fs::write(path, contents).map_err(|e| RiskError::DatasetLoad(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "units": [
            { "unitId": "06037", "name": "Los Angeles", "location": { "lat": 34.3, "lng": -118.2 }, "region": "pacific_coast" },
            { "unitId": "04013", "region": "desert_southwest" }
        ],
        "observations": [
            {
                "id": "fire-1",
                "location": { "lat": 34.4, "lng": -118.3 },
                "confidencePct": 92,
                "radiativePower": 75.5,
                "riskLevel": "high",
                "timestamp": "2024-08-01T12:00:00Z"
            }
        ],
        "regionalWeather": {
            "pacific_coast": { "temperature": 88, "humidity": 18, "windSpeedMph": 22, "windDirectionDeg": 250 }
        },
        "month": 8
    }"#;

    #[test]
    fn test_parse_sample() {
        let dataset = BatchDataset::from_json_str(SAMPLE).unwrap();
        assert_eq!(dataset.units.len(), 2);
        assert_eq!(dataset.observations.as_ref().map(Vec::len), Some(1));
        assert!(dataset.regional_weather.contains_key("pacific_coast"));
        assert_eq!(dataset.month, Some(8));
    }

    #[test]
    fn test_missing_feed_is_none() {
        let dataset = BatchDataset::from_json_str(r#"{ "units": [] }"#).unwrap();
        assert!(dataset.observations.is_none());
        assert!(dataset.regional_weather.is_empty());
    }

    #[test]
    fn test_parse_and_load_errors() {
        assert!(matches!(
            BatchDataset::from_json_str("[1, 2"),
            Err(RiskError::DatasetParse(_))
        ));
        assert!(matches!(
            BatchDataset::load("/nonexistent/dataset.json"),
            Err(RiskError::DatasetLoad(_))
        ));
    }

    #[test]
    fn test_save_and_load() {
        let dataset = BatchDataset::from_json_str(SAMPLE).unwrap();
        let path = std::env::temp_dir().join(format!("hazard-risk-dataset-{}.json", std::process::id()));
        dataset.save(&path).unwrap();
        let loaded = BatchDataset::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        let ids: Vec<&str> = loaded.units.iter().map(|u| u.unit_id.as_str()).collect();
        assert_eq!(ids, ["06037", "04013"]);
        assert_eq!(loaded.month, Some(8));
    }
}
