//! Channel weight profiles for the composite score
//!
//! Two consumers fuse the same three channels with different emphasis: hazard
//! prediction leans on live hazard activity, community impact leans on the
//! vulnerability history. They are kept as separate named profiles.

use crate::error::{Result, RiskError};
use serde::{Deserialize, Serialize};

/// Tolerance on the weight sum
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Named weight profile selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WeightProfileName {
    #[default]
    HazardPrediction,
    CommunityImpact,
}

impl WeightProfileName {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            WeightProfileName::HazardPrediction => "hazardPrediction",
            WeightProfileName::CommunityImpact => "communityImpact",
        }
    }
}

/// Per-channel weights; must sum to 1.0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureWeights {
    pub hazard_activity: f64,
    pub weather: f64,
    pub vulnerability: f64,
}

impl FeatureWeights {
    /// Hazard 0.40, weather 0.35, vulnerability 0.25
    #[must_use]
    pub const fn hazard_prediction() -> Self {
        Self {
            hazard_activity: 0.40,
            weather: 0.35,
            vulnerability: 0.25,
        }
    }

    /// Hazard 0.35, weather 0.30, vulnerability 0.35
    #[must_use]
    pub const fn community_impact() -> Self {
        Self {
            hazard_activity: 0.35,
            weather: 0.30,
            vulnerability: 0.35,
        }
    }

    #[must_use]
    pub fn sum(&self) -> f64 {
        self.hazard_activity + self.weather + self.vulnerability
    }

    /// Reject negative weights and sums away from 1.0
    ///
    /// # Errors
    /// Returns [`RiskError::InvalidWeights`] naming `profile`.
    pub fn validate(&self, profile: &str) -> Result<()> {
        let sum = self.sum();
        let non_negative = [self.hazard_activity, self.weather, self.vulnerability]
            .iter()
            .all(|w| w.is_finite() && *w >= 0.0);
        if !non_negative || (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(RiskError::InvalidWeights {
                profile: profile.to_string(),
                sum,
            });
        }
        Ok(())
    }
}

/// The two weight tables, selectable by [`WeightProfileName`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WeightProfiles {
    pub hazard_prediction: FeatureWeights,
    pub community_impact: FeatureWeights,
}

impl Default for WeightProfiles {
    fn default() -> Self {
        Self {
            hazard_prediction: FeatureWeights::hazard_prediction(),
            community_impact: FeatureWeights::community_impact(),
        }
    }
}

impl WeightProfiles {
    #[must_use]
    pub fn get(&self, name: WeightProfileName) -> FeatureWeights {
        match name {
            WeightProfileName::HazardPrediction => self.hazard_prediction,
            WeightProfileName::CommunityImpact => self.community_impact,
        }
    }

    /// # Errors
    /// Returns the first profile that fails [`FeatureWeights::validate`].
    pub fn validate(&self) -> Result<()> {
        self.hazard_prediction
            .validate(WeightProfileName::HazardPrediction.as_str())?;
        self.community_impact
            .validate(WeightProfileName::CommunityImpact.as_str())
    }
}
