//! Composite risk engine
//!
//! Fuses the three feature scores of one unit into a composite risk score with a
//! confidence estimate. Results are cached per unit for the prediction TTL.
//!
//! A prediction produced here carries a *provisional* classification against the
//! static fallback thresholds, and only provisional predictions are cached. Batch
//! runs re-classify every unit against the batch's own threshold set; those final
//! predictions live in the batch report only. See [`crate::pipeline`].

pub mod cache;
pub mod confidence;
pub mod weights;

pub use cache::{CacheConfig, TtlCache};
pub use confidence::{
    ConfidenceConfig, ConfidenceInputs, JitterSource, NoJitter, SeededJitter, ThreadRngJitter,
};
pub use weights::{FeatureWeights, WeightProfileName, WeightProfiles};

use crate::config::EngineConfig;
use crate::core_types::unit::UnitInput;
use crate::core_types::vulnerability::{sorted_by_year, VulnerabilityRecord};
use crate::error::{Result, RiskError};
use crate::scoring::{
    analyze_trend, hazard, score_hazard_activity, score_vulnerability, score_weather, weather,
    ChannelScore, FeatureScore, HazardSummary, ScoringConfig, VulnerabilityTrend,
};
use crate::thresholds::{RiskLevel, RiskTier, ThresholdSet};
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Vulnerability channel score used when a unit's input cannot be scored at all
const NEUTRAL_VULNERABILITY_SCORE: f64 = 0.5;

/// Whether a prediction's level came from the batch or the static fallback set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClassificationStage {
    /// Classified against the static fallback set (single-unit query, phase 1)
    Provisional,
    /// Classified against the batch's threshold set (phase 2)
    Final,
}

/// The three weighted channels of one prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureBreakdown {
    pub hazard_activity: FeatureScore,
    pub weather: FeatureScore,
    pub vulnerability: FeatureScore,
}

impl FeatureBreakdown {
    #[must_use]
    pub fn weighted(
        weights: FeatureWeights,
        hazard_activity: ChannelScore,
        weather: ChannelScore,
        vulnerability: ChannelScore,
    ) -> Self {
        Self {
            hazard_activity: FeatureScore::weighted(hazard_activity, weights.hazard_activity),
            weather: FeatureScore::weighted(weather, weights.weather),
            vulnerability: FeatureScore::weighted(vulnerability, weights.vulnerability),
        }
    }

    /// Sum of contributions
    #[must_use]
    pub fn total(&self) -> f64 {
        self.hazard_activity.contribution + self.weather.contribution + self.vulnerability.contribution
    }
}

/// Risk assessment of one unit for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskPrediction {
    pub unit_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Composite score in `[0, 1]`
    pub risk_score: f64,
    /// `round(risk_score * 100)`
    pub composite_index: u8,
    pub risk_level: RiskLevel,
    /// In `[0.70, 0.95]` under the default confidence configuration
    pub confidence: f64,
    pub features: FeatureBreakdown,
    pub trend: VulnerabilityTrend,
    pub weight_profile: WeightProfileName,
    /// Some input was substituted with a neutral value
    pub using_fallback: bool,
    pub classification: ClassificationStage,
    pub generated_at: DateTime<Utc>,
}

impl RiskPrediction {
    #[must_use]
    pub fn tier(&self) -> RiskTier {
        self.risk_level.tier
    }

    /// A copy classified against `thresholds` and marked final
    #[must_use]
    pub fn reclassified(&self, thresholds: &ThresholdSet) -> RiskPrediction {
        RiskPrediction {
            risk_level: thresholds.classify(self.risk_score).into(),
            classification: ClassificationStage::Final,
            ..self.clone()
        }
    }
}

/// Composite index for a score
#[must_use]
pub fn composite_index(risk_score: f64) -> u8 {
    (risk_score.clamp(0.0, 1.0) * 100.0).round() as u8
}

/// Per-unit fusion of feature scores
#[derive(Debug)]
pub struct CompositeRiskEngine {
    profile: WeightProfileName,
    weights: FeatureWeights,
    scoring: ScoringConfig,
    confidence: ConfidenceConfig,
    provisional: ThresholdSet,
    cache: TtlCache<RiskPrediction>,
    jitter: Arc<dyn JitterSource>,
}

impl CompositeRiskEngine {
    /// Build an engine from a validated configuration
    ///
    /// Jitter defaults to fresh per-call randomness; use [`Self::with_jitter`] for
    /// reproducible runs.
    ///
    /// # Errors
    /// Returns the first error from [`EngineConfig::validate`].
    pub fn new(config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            profile: config.weight_profile,
            weights: config.weight_profiles.get(config.weight_profile),
            scoring: config.scoring,
            confidence: config.confidence,
            provisional: ThresholdSet::fallback(&config.thresholds),
            cache: TtlCache::new("predictions", config.cache.prediction_ttl()),
            jitter: Arc::new(ThreadRngJitter),
        })
    }

    #[must_use]
    pub fn with_jitter(mut self, jitter: Arc<dyn JitterSource>) -> Self {
        self.jitter = jitter;
        self
    }

    #[must_use]
    pub fn weights(&self) -> FeatureWeights {
        self.weights
    }

    #[must_use]
    pub fn profile(&self) -> WeightProfileName {
        self.profile
    }

    #[must_use]
    pub fn scoring_config(&self) -> &ScoringConfig {
        &self.scoring
    }

    #[must_use]
    pub fn cache(&self) -> &TtlCache<RiskPrediction> {
        &self.cache
    }

    /// Assess one unit, reading through the prediction cache
    ///
    /// The result is always provisional, whatever batches have run since. Never
    /// fails: a unit whose input cannot be scored gets a neutral fallback
    /// prediction flagged with `using_fallback`. Fallback predictions are not
    /// cached.
    pub fn assess(&self, unit: &UnitInput) -> Arc<RiskPrediction> {
        if let Some(hit) = self.cache.get(&unit.unit_id) {
            return hit;
        }
        match self.compute(unit) {
            Ok(prediction) => self.cache.insert(unit.unit_id.clone(), prediction),
            Err(err) => {
                warn!(unit_id = %unit.unit_id, error = %err, "Unit could not be scored, using fallback prediction");
                Arc::new(self.fallback_prediction(unit))
            }
        }
    }

    /// Score one unit without touching the cache
    ///
    /// # Errors
    /// Returns [`RiskError::InvalidInput`] when the unit's input is structurally
    /// broken (empty id, non-finite values).
    pub fn compute(&self, unit: &UnitInput) -> Result<RiskPrediction> {
        if let Some(reason) = unit.validation_error() {
            return Err(RiskError::InvalidInput {
                unit_id: unit.unit_id.clone(),
                reason,
            });
        }

        let synthesized_history = unit.vulnerability.is_empty();
        let history = if synthesized_history {
            warn!(unit_id = %unit.unit_id, "No vulnerability history, substituting neutral record");
            vec![VulnerabilityRecord::neutral_fallback(
                &unit.unit_id,
                Utc::now().year(),
            )]
        } else {
            sorted_by_year(&unit.vulnerability)
        };

        let hazard_summary = unit
            .hazards
            .as_deref()
            .map(|observations| HazardSummary::from_observations(observations, &self.scoring));

        let hazard_score = score_hazard_activity(hazard_summary.as_ref());
        let weather_score = score_weather(unit.weather.as_ref());
        let (vulnerability_score, trend) = score_vulnerability(&history);

        let features =
            FeatureBreakdown::weighted(self.weights, hazard_score, weather_score, vulnerability_score);
        let risk_score = features.total().clamp(0.0, 1.0);

        let estimated = self.confidence.estimate(&ConfidenceInputs {
            history_years: if synthesized_history { 0 } else { history.len() },
            hazard: hazard_summary.as_ref(),
            weather: unit.weather.as_ref(),
        });
        let confidence = self
            .confidence
            .apply_jitter(estimated, self.jitter.offset(&unit.unit_id));

        let tier = self.provisional.classify(risk_score);
        debug!(
            unit_id = %unit.unit_id,
            risk_score,
            confidence,
            ?tier,
            "Scored unit"
        );

        Ok(RiskPrediction {
            unit_id: unit.unit_id.clone(),
            name: unit.name.clone(),
            risk_score,
            composite_index: composite_index(risk_score),
            risk_level: tier.into(),
            confidence,
            features,
            trend,
            weight_profile: self.profile,
            using_fallback: synthesized_history,
            classification: ClassificationStage::Provisional,
            generated_at: Utc::now(),
        })
    }

    /// Neutral prediction for a unit whose input could not be scored
    #[must_use]
    pub fn fallback_prediction(&self, unit: &UnitInput) -> RiskPrediction {
        let features = FeatureBreakdown::weighted(
            self.weights,
            ChannelScore::new(hazard::BASELINE, "Hazard data unusable - using baseline"),
            ChannelScore::new(weather::NO_DATA_BASELINE, "Weather data unusable - using baseline"),
            ChannelScore::new(
                NEUTRAL_VULNERABILITY_SCORE,
                "Vulnerability data unusable - using neutral index",
            ),
        );
        let risk_score = features.total().clamp(0.0, 1.0);

        RiskPrediction {
            unit_id: unit.unit_id.clone(),
            name: unit.name.clone(),
            risk_score,
            composite_index: composite_index(risk_score),
            risk_level: self.provisional.classify(risk_score).into(),
            confidence: self.confidence.min,
            features,
            trend: analyze_trend(&[]),
            weight_profile: self.profile,
            using_fallback: true,
            classification: ClassificationStage::Provisional,
            generated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::units::{Degrees, MilesPerHour, Percent};
    use crate::core_types::vulnerability::SubIndices;
    use crate::core_types::weather::WeatherSnapshot;
    use approx::assert_abs_diff_eq;

    fn engine() -> CompositeRiskEngine {
        CompositeRiskEngine::new(&EngineConfig::default())
            .unwrap()
            .with_jitter(Arc::new(NoJitter))
    }

    fn record(year: i32, index: f64) -> VulnerabilityRecord {
        VulnerabilityRecord {
            unit_id: "06037".into(),
            year,
            overall_index: index,
            sub_indices: SubIndices::default(),
            population: 10_000,
        }
    }

    #[test]
    fn test_weights_follow_profile() {
        let config = EngineConfig {
            weight_profile: WeightProfileName::CommunityImpact,
            ..EngineConfig::default()
        };
        let engine = CompositeRiskEngine::new(&config).unwrap();
        assert_eq!(engine.weights(), FeatureWeights::community_impact());
    }

    #[test]
    fn test_composite_is_weighted_sum() {
        let unit = UnitInput::new("06037")
            .with_vulnerability(vec![record(2022, 60.0)])
            .with_hazards(Vec::new())
            .with_weather(WeatherSnapshot {
                humidity: Some(Percent::new(20.0)),
                wind_speed_mph: Some(MilesPerHour::new(12.0)),
                wind_direction_deg: Some(Degrees::new(90.0)),
                ..WeatherSnapshot::default()
            });
        let p = engine().compute(&unit).unwrap();
        // hazard 0.2, weather 0.1 + 0.15 + 0.10 = 0.35, vulnerability 0.6
        let expected = 0.4 * 0.2 + 0.35 * 0.35 + 0.25 * 0.6;
        assert_abs_diff_eq!(p.risk_score, expected, epsilon = 1e-12);
        assert_eq!(p.composite_index, 35);
        assert_eq!(p.classification, ClassificationStage::Provisional);
        assert!(!p.using_fallback);
    }

    #[test]
    fn test_missing_history_synthesizes_neutral_record() {
        let p = engine().compute(&UnitInput::new("06037")).unwrap();
        assert!(p.using_fallback);
        assert_eq!(p.trend.latest_index, 50.0);
        assert_abs_diff_eq!(p.features.vulnerability.score, 0.5);
    }

    #[test]
    fn test_invalid_input_becomes_fallback() {
        let engine = engine();
        let unit = UnitInput::new("06037").with_vulnerability(vec![record(2022, f64::NAN)]);
        assert!(matches!(engine.compute(&unit), Err(RiskError::InvalidInput { .. })));

        let p = engine.assess(&unit);
        assert!(p.using_fallback);
        assert_eq!(p.confidence, 0.70);
        assert!(engine.cache().is_empty());
    }

    #[test]
    fn test_assess_reads_through_cache() {
        let engine = engine();
        let unit = UnitInput::new("06037").with_vulnerability(vec![record(2022, 60.0)]);
        let first = engine.assess(&unit);
        let second = engine.assess(&unit.clone().with_vulnerability(vec![record(2022, 99.0)]));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(engine.cache().len(), 1);
    }

    #[test]
    fn test_reclassified_is_final() {
        let mut scored = engine().compute(&UnitInput::new("06037")).unwrap();
        scored.risk_score = 0.9;
        let fallback = ThresholdSet::fallback(&crate::thresholds::ThresholdConfig::default());
        let final_p = scored.reclassified(&fallback);
        assert_eq!(final_p.classification, ClassificationStage::Final);
        assert_eq!(final_p.tier(), RiskTier::High);
    }

    #[test]
    fn test_composite_index_rounds() {
        assert_eq!(composite_index(0.637), 64);
        assert_eq!(composite_index(1.3), 100);
        assert_eq!(composite_index(0.0), 0);
        assert_eq!(composite_index(1.0), 100);
    }
}
