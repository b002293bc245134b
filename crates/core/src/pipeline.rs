//! Batch pipeline
//!
//! Composes the engine, the threshold calculator and the forecaster over a whole
//! batch of units:
//!
//! ```text
//! UnitInput ──► prepare (hazard association, regional weather)
//!           ──► score, in parallel            ──► ScoredBatch
//!           ──► thresholds from all scores    ──► classify ──► ClassifiedBatch
//!           ──► BatchReport (sorted, tier counts)
//! ```
//!
//! Classification is two-phase. A [`ScoredBatch`] exposes scores only, never
//! levels; the final level of any unit exists only on a [`ClassifiedBatch`],
//! which can only be built from a complete `ScoredBatch`.

use crate::config::EngineConfig;
use crate::core_types::hazard::{associate_hazards, HazardObservation};
use crate::core_types::unit::UnitInput;
use crate::core_types::units::Miles;
use crate::core_types::weather::{RegionProfile, WeatherSnapshot};
use crate::dataset::BatchDataset;
use crate::engine::{CompositeRiskEngine, JitterSource, RiskPrediction, TtlCache};
use crate::error::{Result, RiskError};
use crate::forecast::{ForecastRequest, SpreadForecast, SpreadForecaster};
use crate::thresholds::{DynamicThresholdCalculator, RiskTier, ThresholdSet};
use chrono::{DateTime, Datelike, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Phase 1 output: every unit scored, nothing classified yet
#[derive(Debug)]
pub struct ScoredBatch {
    predictions: Vec<Arc<RiskPrediction>>,
}

impl ScoredBatch {
    #[must_use]
    pub fn len(&self) -> usize {
        self.predictions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }

    /// Composite scores in input order
    #[must_use]
    pub fn scores(&self) -> Vec<f64> {
        self.predictions.iter().map(|p| p.risk_score).collect()
    }

    /// Phase 2: classify every unit against one threshold set
    #[must_use]
    pub fn classify(self, thresholds: &ThresholdSet) -> ClassifiedBatch {
        let predictions = self
            .predictions
            .par_iter()
            .map(|p| p.reclassified(thresholds))
            .collect();
        ClassifiedBatch {
            predictions,
            thresholds: thresholds.clone(),
        }
    }
}

/// Phase 2 output: every prediction carries its final level
#[derive(Debug, Clone)]
pub struct ClassifiedBatch {
    predictions: Vec<RiskPrediction>,
    thresholds: ThresholdSet,
}

impl ClassifiedBatch {
    /// Sort by tier priority, then by descending score, and count tiers
    #[must_use]
    pub fn into_report(self) -> BatchReport {
        let mut predictions = self.predictions;
        predictions.sort_by(|a, b| {
            a.risk_level
                .priority
                .cmp(&b.risk_level.priority)
                .then_with(|| b.risk_score.total_cmp(&a.risk_score))
                .then_with(|| a.unit_id.cmp(&b.unit_id))
        });
        let tier_counts = TierCounts::from_predictions(&predictions);
        let fallback_count = predictions.iter().filter(|p| p.using_fallback).count();
        BatchReport {
            predictions,
            thresholds: self.thresholds,
            tier_counts,
            fallback_count,
            generated_at: Utc::now(),
        }
    }
}

/// Units per tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct TierCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl TierCounts {
    #[must_use]
    pub fn from_predictions(predictions: &[RiskPrediction]) -> Self {
        predictions
            .iter()
            .fold(TierCounts::default(), |mut counts, p| {
                match p.tier() {
                    RiskTier::High => counts.high += 1,
                    RiskTier::Medium => counts.medium += 1,
                    RiskTier::Low => counts.low += 1,
                }
                counts
            })
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.high + self.medium + self.low
    }
}

/// Result of one batch run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    /// Sorted by tier priority, then descending score
    pub predictions: Vec<RiskPrediction>,
    pub thresholds: ThresholdSet,
    pub tier_counts: TierCounts,
    /// Predictions built on substituted inputs
    pub fallback_count: usize,
    pub generated_at: DateTime<Utc>,
}

impl BatchReport {
    #[must_use]
    pub fn prediction(&self, unit_id: &str) -> Option<&RiskPrediction> {
        self.predictions.iter().find(|p| p.unit_id == unit_id)
    }
}

/// Owns the engine, the calculator, the forecaster and the snapshot caches
#[derive(Debug)]
pub struct RiskPipeline {
    engine: CompositeRiskEngine,
    calculator: DynamicThresholdCalculator,
    forecaster: SpreadForecaster,
    weather_cache: TtlCache<WeatherSnapshot>,
    hazard_cache: TtlCache<Vec<HazardObservation>>,
}

impl RiskPipeline {
    /// # Errors
    /// Returns the first error from [`EngineConfig::validate`].
    pub fn new(config: &EngineConfig) -> Result<Self> {
        Ok(Self {
            engine: CompositeRiskEngine::new(config)?,
            calculator: DynamicThresholdCalculator::new(config.thresholds),
            forecaster: SpreadForecaster::new(config.forecast.clone()),
            weather_cache: TtlCache::new("weather", config.cache.weather_ttl()),
            hazard_cache: TtlCache::new("hazards", config.cache.hazard_ttl()),
        })
    }

    #[must_use]
    pub fn with_jitter(mut self, jitter: Arc<dyn JitterSource>) -> Self {
        self.engine = self.engine.with_jitter(jitter);
        self
    }

    #[must_use]
    pub fn engine(&self) -> &CompositeRiskEngine {
        &self.engine
    }

    #[must_use]
    pub fn calculator(&self) -> &DynamicThresholdCalculator {
        &self.calculator
    }

    #[must_use]
    pub fn forecaster(&self) -> &SpreadForecaster {
        &self.forecaster
    }

    /// Single-unit query with a provisional classification
    pub fn assess(&self, unit: &UnitInput) -> Arc<RiskPrediction> {
        self.engine.assess(unit)
    }

    /// Regional base weather, read through the weather cache
    pub fn weather_for<F>(&self, region: &str, fetch: F) -> Option<Arc<WeatherSnapshot>>
    where
        F: FnOnce() -> Option<WeatherSnapshot>,
    {
        self.weather_cache.get_or_insert_with(region, fetch)
    }

    /// Hazard observations associated with a unit, read through the hazard cache
    pub fn hazards_for<F>(&self, unit_id: &str, fetch: F) -> Option<Arc<Vec<HazardObservation>>>
    where
        F: FnOnce() -> Option<Vec<HazardObservation>>,
    {
        self.hazard_cache.get_or_insert_with(unit_id, fetch)
    }

    /// Fill each unit's missing hazard and weather inputs from the dataset's
    /// shared feed and regional base weather
    ///
    /// Inputs a unit already carries are kept as is.
    #[must_use]
    pub fn prepare(&self, dataset: &BatchDataset) -> Vec<UnitInput> {
        let month = dataset.month.unwrap_or_else(|| Utc::now().month());
        let radius = Miles::new(self.engine.scoring_config().consideration_radius_miles);

        dataset
            .units
            .par_iter()
            .map(|unit| {
                let mut unit = unit.clone();

                if unit.hazards.is_none() {
                    if let (Some(feed), Some(location)) = (&dataset.observations, unit.location) {
                        unit.hazards = self
                            .hazards_for(&unit.unit_id, || {
                                Some(associate_hazards(feed, &location, radius))
                            })
                            .map(|obs| obs.as_ref().clone());
                    }
                }

                if unit.weather.is_none() {
                    if let Some(region) = unit.region.as_deref() {
                        let base = self
                            .weather_for(region, || dataset.regional_weather.get(region).copied());
                        unit.weather = base.map(|base| synthesize(&base, region, month));
                    }
                }

                unit
            })
            .collect()
    }

    /// Phase 1: score every unit in parallel
    ///
    /// The returned batch is complete; nothing is classified until
    /// [`ScoredBatch::classify`].
    #[must_use]
    pub fn score_batch(&self, units: &[UnitInput]) -> ScoredBatch {
        let predictions = units.par_iter().map(|unit| self.engine.assess(unit)).collect();
        ScoredBatch { predictions }
    }

    /// Score, classify and report on a batch
    ///
    /// Expired cache entries are purged first. Final predictions are returned in
    /// the report only; the prediction cache keeps the provisional ones.
    ///
    /// # Errors
    /// Returns [`RiskError::EmptyBatch`] for an empty batch.
    pub fn run_batch(&self, units: &[UnitInput]) -> Result<BatchReport> {
        if units.is_empty() {
            return Err(RiskError::EmptyBatch);
        }
        self.purge_caches();
        info!(units = units.len(), "Scoring batch");

        let scored = self.score_batch(units);
        let thresholds = self.calculator.calculate(&scored.scores())?;
        let report = scored.classify(&thresholds).into_report();
        info!(
            methodology = ?report.thresholds.methodology,
            high = report.tier_counts.high,
            medium = report.tier_counts.medium,
            low = report.tier_counts.low,
            fallbacks = report.fallback_count,
            "Batch classified"
        );
        Ok(report)
    }

    /// Drop expired predictions and snapshots from all three caches
    fn purge_caches(&self) {
        let predictions = self.engine.cache().purge_expired();
        let weather = self.weather_cache.purge_expired();
        let hazards = self.hazard_cache.purge_expired();
        if predictions + weather + hazards > 0 {
            debug!(predictions, weather, hazards, "Purged expired cache entries");
        }
    }

    /// Prepare and run a whole dataset
    ///
    /// # Errors
    /// Returns [`RiskError::EmptyBatch`] when the dataset has no units.
    pub fn run_dataset(&self, dataset: &BatchDataset) -> Result<BatchReport> {
        self.run_batch(&self.prepare(dataset))
    }

    /// Forecast spread from each unit's nearest hazard, in parallel
    ///
    /// Units without a location are skipped. A unit with no associated hazard
    /// gets a limited forecast.
    #[must_use]
    pub fn forecast_units(&self, units: &[UnitInput], days: Option<u8>) -> Vec<Result<SpreadForecast>> {
        units
            .par_iter()
            .filter_map(|unit| {
                let Some(origin) = unit.location else {
                    debug!(unit_id = %unit.unit_id, "No location, skipping forecast");
                    return None;
                };
                let nearest = unit
                    .hazards
                    .as_ref()
                    .and_then(|hazards| {
                        hazards
                            .iter()
                            .filter(|h| h.distance_from_unit.is_some())
                            .min_by_key(|h| h.distance_from_unit)
                            .or_else(|| hazards.first())
                    })
                    .cloned();
                let request = ForecastRequest {
                    unit_id: unit.unit_id.clone(),
                    origin,
                    hazard: nearest,
                    weather: unit.weather,
                    days,
                };
                let result = self.forecaster.forecast(&request);
                if let Err(err) = &result {
                    warn!(unit_id = %unit.unit_id, error = %err, "Forecast failed");
                }
                Some(result)
            })
            .collect()
    }
}

/// Synthetic unit weather from a regional base snapshot
fn synthesize(base: &WeatherSnapshot, region: &str, month: u32) -> WeatherSnapshot {
    match RegionProfile::by_name(region) {
        Some(profile) => base.synthesize_for(&profile, month),
        None => WeatherSnapshot {
            synthetic: true,
            ..*base
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::hazard::HazardRiskLevel;
    use crate::core_types::spatial::GeoPoint;
    use crate::core_types::units::Percent;
    use crate::core_types::vulnerability::{SubIndices, VulnerabilityRecord};
    use crate::engine::{ClassificationStage, NoJitter};
    use crate::thresholds::Methodology;

    fn pipeline() -> RiskPipeline {
        RiskPipeline::new(&EngineConfig::default())
            .unwrap()
            .with_jitter(Arc::new(NoJitter))
    }

    fn unit(id: &str, index: f64) -> UnitInput {
        UnitInput::new(id).with_vulnerability(vec![VulnerabilityRecord {
            unit_id: id.into(),
            year: 2022,
            overall_index: index,
            sub_indices: SubIndices::default(),
            population: 1_000,
        }])
    }

    #[test]
    fn test_empty_batch_is_error() {
        assert!(matches!(pipeline().run_batch(&[]), Err(RiskError::EmptyBatch)));
    }

    #[test]
    fn test_small_batch_uses_fallback_thresholds() {
        let units = vec![unit("a", 10.0), unit("b", 50.0), unit("c", 90.0)];
        let report = pipeline().run_batch(&units).unwrap();
        assert_eq!(report.thresholds.methodology, Methodology::Fallback);
        assert_eq!(report.tier_counts.total(), 3);
        assert!(report
            .predictions
            .iter()
            .all(|p| p.classification == ClassificationStage::Final));
    }

    #[test]
    fn test_report_sorted_by_priority_then_score() {
        let units: Vec<UnitInput> = (0..12)
            .map(|i| unit(&format!("u{i:02}"), f64::from(i) * 8.0))
            .collect();
        let report = pipeline().run_batch(&units).unwrap();
        assert_eq!(report.thresholds.methodology, Methodology::Dynamic);
        for pair in report.predictions.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(
                a.risk_level.priority < b.risk_level.priority
                    || (a.risk_level.priority == b.risk_level.priority
                        && a.risk_score >= b.risk_score)
            );
        }
        assert_eq!(report.predictions[0].unit_id, "u11");
    }

    #[test]
    fn test_batch_leaves_cache_provisional() {
        let pipeline = pipeline();
        let units: Vec<UnitInput> = (0..12)
            .map(|i| unit(&format!("u{i:02}"), f64::from(i) * 8.0))
            .collect();
        let report = pipeline.run_batch(&units).unwrap();
        assert_eq!(report.prediction("u00").unwrap().classification, ClassificationStage::Final);
        let cached = pipeline.engine().cache().get("u00").unwrap();
        assert_eq!(cached.classification, ClassificationStage::Provisional);
    }

    #[test]
    fn test_run_batch_purges_expired_snapshots() {
        let config = EngineConfig {
            cache: crate::engine::CacheConfig {
                weather_ttl_secs: 0,
                ..crate::engine::CacheConfig::default()
            },
            ..EngineConfig::default()
        };
        let pipeline = RiskPipeline::new(&config).unwrap().with_jitter(Arc::new(NoJitter));
        pipeline.weather_for("plains", || Some(WeatherSnapshot::default()));
        assert_eq!(pipeline.weather_cache.len(), 1);
        pipeline.run_batch(&[unit("a", 40.0)]).unwrap();
        assert!(pipeline.weather_cache.is_empty());
    }

    #[test]
    fn test_prepare_associates_and_synthesizes() {
        let dataset = BatchDataset {
            units: vec![UnitInput::new("06037")
                .with_location(GeoPoint::new(34.0, -118.0))
                .with_region("desert_southwest")],
            observations: Some(vec![HazardObservation {
                id: "fire-1".into(),
                location: GeoPoint::new(34.1, -118.0),
                confidence_pct: 90.0,
                radiative_power: 10.0,
                distance_from_unit: None,
                risk_level: HazardRiskLevel::High,
                timestamp: Utc::now(),
            }]),
            regional_weather: [(
                "desert_southwest".to_string(),
                WeatherSnapshot {
                    humidity: Some(Percent::new(30.0)),
                    ..WeatherSnapshot::default()
                },
            )]
            .into_iter()
            .collect(),
            month: Some(7),
        };
        let prepared = pipeline().prepare(&dataset);
        let unit = &prepared[0];
        let hazards = unit.hazards.as_ref().unwrap();
        assert_eq!(hazards.len(), 1);
        assert!(hazards[0].distance_from_unit.is_some());
        let weather = unit.weather.unwrap();
        assert!(weather.synthetic);
        // Summer offset for the desert southwest is -15
        assert_eq!(*weather.humidity.unwrap(), 15.0);
    }

    #[test]
    fn test_unknown_region_reuses_base_as_synthetic() {
        let base = WeatherSnapshot {
            humidity: Some(Percent::new(40.0)),
            ..WeatherSnapshot::default()
        };
        let w = synthesize(&base, "atlantis", 7);
        assert!(w.synthetic);
        assert_eq!(w.humidity, base.humidity);
    }

    #[test]
    fn test_weather_cache_reads_through() {
        let pipeline = pipeline();
        let first = pipeline.weather_for("plains", || Some(WeatherSnapshot::default()));
        let second = pipeline.weather_for("plains", || None);
        assert!(Arc::ptr_eq(&first.unwrap(), &second.unwrap()));
        assert!(pipeline.hazards_for("x", || None).is_none());
    }

    #[test]
    fn test_forecast_units_skips_unlocated() {
        let units = vec![
            unit("a", 50.0),
            unit("b", 50.0).with_location(GeoPoint::new(34.0, -118.0)),
        ];
        let forecasts = pipeline().forecast_units(&units, Some(2));
        assert_eq!(forecasts.len(), 1);
        let forecast = forecasts[0].as_ref().unwrap();
        assert_eq!(forecast.unit_id, "b");
        assert_eq!(forecast.days.len(), 2);
    }
}
