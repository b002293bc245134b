//! Social-vulnerability time series
//!
//! One record per unit per year, as published by the vulnerability-data provider.
//! The overall index and the theme sub-indices are percentile ranks (0-100) where
//! higher means more vulnerable.

use serde::{Deserialize, Serialize};

/// Overall index assigned to a synthesized record when a unit has no history
pub const NEUTRAL_INDEX: f64 = 50.0;

/// Theme sub-indices reported alongside the overall index
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubIndices {
    pub socioeconomic: Option<f64>,
    pub household_composition: Option<f64>,
    pub minority_status: Option<f64>,
    pub housing_transportation: Option<f64>,
}

impl SubIndices {
    /// The highest-ranked theme, if any sub-index was reported
    #[must_use]
    pub fn dominant_theme(&self) -> Option<(&'static str, f64)> {
        [
            ("socioeconomic status", self.socioeconomic),
            ("household composition", self.household_composition),
            ("minority status and language", self.minority_status),
            ("housing and transportation", self.housing_transportation),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
        .max_by(|a, b| a.1.total_cmp(&b.1))
    }

    fn all_finite(&self) -> bool {
        [
            self.socioeconomic,
            self.household_composition,
            self.minority_status,
            self.housing_transportation,
        ]
        .into_iter()
        .flatten()
        .all(f64::is_finite)
    }
}

/// One unit, one year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VulnerabilityRecord {
    pub unit_id: String,
    pub year: i32,
    /// Overall vulnerability index (0-100)
    pub overall_index: f64,
    #[serde(default)]
    pub sub_indices: SubIndices,
    #[serde(default)]
    pub population: u64,
}

impl VulnerabilityRecord {
    /// Neutral single-year record substituted for a unit with no history
    #[must_use]
    pub fn neutral_fallback(unit_id: &str, year: i32) -> Self {
        Self {
            unit_id: unit_id.to_string(),
            year,
            overall_index: NEUTRAL_INDEX,
            sub_indices: SubIndices::default(),
            population: 0,
        }
    }

    /// True when every reported number is finite
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.overall_index.is_finite() && self.sub_indices.all_finite()
    }
}

/// Copy of `records` ordered by year
#[must_use]
pub fn sorted_by_year(records: &[VulnerabilityRecord]) -> Vec<VulnerabilityRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by_key(|r| r.year);
    sorted
}
