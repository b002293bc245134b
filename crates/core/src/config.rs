//! Engine configuration
//!
//! Every field has a default, so a configuration file only needs the values it
//! overrides:
//!
//! ```json
//! { "weightProfile": "communityImpact", "thresholds": { "minSampleSize": 20 } }
//! ```

use crate::engine::{CacheConfig, ConfidenceConfig, WeightProfileName, WeightProfiles};
use crate::error::{Result, RiskError};
use crate::forecast::ForecastConfig;
use crate::scoring::ScoringConfig;
use crate::thresholds::ThresholdConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Profile used for composite scoring
    pub weight_profile: WeightProfileName,
    pub weight_profiles: WeightProfiles,
    pub scoring: ScoringConfig,
    pub confidence: ConfidenceConfig,
    pub thresholds: ThresholdConfig,
    pub cache: CacheConfig,
    pub forecast: ForecastConfig,
}

impl EngineConfig {
    /// Parse and validate a JSON configuration
    ///
    /// # Errors
    /// Returns [`RiskError::Config`] if the JSON is malformed or fails
    /// validation.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| RiskError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    ///
    /// # Errors
    /// Returns [`RiskError::Config`] if the file cannot be read or parsed, or
    /// fails validation.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|e| RiskError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&contents)
    }

    /// Check every section
    ///
    /// # Errors
    /// Returns [`RiskError::InvalidWeights`] for a profile that does not sum to
    /// 1.0, or [`RiskError::Config`] for any other out-of-range value.
    pub fn validate(&self) -> Result<()> {
        self.weight_profiles.validate()?;
        self.thresholds.validate()?;
        self.forecast.validate()?;

        let c = &self.confidence;
        if !(0.0 <= c.min && c.min <= c.base && c.base <= c.max && c.max <= 1.0) {
            return Err(RiskError::Config(
                "confidence bounds must satisfy 0 <= min <= base <= max <= 1".into(),
            ));
        }
        if !(0.0..=0.1).contains(&c.jitter_fraction) {
            return Err(RiskError::Config(
                "confidence jitterFraction must be between 0 and 0.1".into(),
            ));
        }

        let s = &self.scoring;
        if !(s.nearby_radius_miles > 0.0 && s.nearby_radius_miles <= s.consideration_radius_miles) {
            return Err(RiskError::Config(
                "scoring radii must satisfy 0 < nearby <= consideration".into(),
            ));
        }
        if !(0.0..=100.0).contains(&s.high_confidence_pct) {
            return Err(RiskError::Config(
                "scoring highConfidencePct must be between 0 and 100".into(),
            ));
        }
        Ok(())
    }
}
