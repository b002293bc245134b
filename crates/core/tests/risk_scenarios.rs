//! End-to-end risk scenarios for single units and small batches
//!
//! Each scenario builds its inputs by hand and checks the composite score,
//! classification and confidence the engine produces for them.

use approx::assert_abs_diff_eq;
use chrono::Utc;
use hazard_risk_core::core_types::vulnerability::SubIndices;
use hazard_risk_core::{
    ClassificationStage, CompositeRiskEngine, EngineConfig, GeoPoint, HazardObservation,
    HazardRiskLevel, Methodology, Miles, MilesPerHour, NoJitter, Percent, RiskPipeline, RiskTier,
    SeededJitter, UnitInput, VulnerabilityRecord, WeatherSnapshot,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn history(unit_id: &str, indices: &[f64]) -> Vec<VulnerabilityRecord> {
    indices
        .iter()
        .enumerate()
        .map(|(i, &index)| VulnerabilityRecord {
            unit_id: unit_id.to_string(),
            year: 2019 + i as i32,
            overall_index: index,
            sub_indices: SubIndices {
                socioeconomic: Some(index + 5.0),
                household_composition: Some(index - 10.0),
                minority_status: None,
                housing_transportation: Some(index),
            },
            population: 250_000,
        })
        .collect()
}

fn nearby_fire(distance_miles: f64) -> HazardObservation {
    HazardObservation {
        id: "fire-nearby".to_string(),
        location: GeoPoint::new(34.1, -118.1),
        confidence_pct: 92.0,
        radiative_power: 20.0,
        distance_from_unit: Some(Miles::new(distance_miles)),
        risk_level: HazardRiskLevel::High,
        timestamp: Utc::now(),
    }
}

fn engine(config: &EngineConfig) -> CompositeRiskEngine {
    CompositeRiskEngine::new(config)
        .unwrap()
        .with_jitter(Arc::new(NoJitter))
}

#[test]
fn test_worsening_unit_near_active_fire_is_high() {
    let unit = UnitInput::new("06037")
        .with_vulnerability(history("06037", &[40.0, 47.5, 55.0, 62.5, 70.0]))
        .with_hazards(vec![nearby_fire(3.0)])
        .with_weather(WeatherSnapshot {
            humidity: Some(Percent::new(10.0)),
            wind_speed_mph: Some(MilesPerHour::new(30.0)),
            ..WeatherSnapshot::default()
        });

    let prediction = engine(&EngineConfig::default()).compute(&unit).unwrap();

    // 0.03 + 0.04 + 0.04 + 0.30 + 0.15
    assert_abs_diff_eq!(prediction.features.hazard_activity.score, 0.56, epsilon = 1e-12);
    // 0.1 + 0.25 + 0.25
    assert_abs_diff_eq!(prediction.features.weather.score, 0.6, epsilon = 1e-12);
    // 0.70 * 1.1 * 1.05
    assert_abs_diff_eq!(prediction.features.vulnerability.score, 0.8085, epsilon = 1e-12);

    assert_abs_diff_eq!(prediction.risk_score, 0.636_125, epsilon = 1e-9);
    assert_eq!(prediction.tier(), RiskTier::High);
    assert_eq!(prediction.classification, ClassificationStage::Provisional);
    assert!(prediction.confidence >= 0.85);
    assert!(!prediction.using_fallback);
}

#[test]
fn test_worsening_unit_confidence_with_jitter_stays_high() {
    let unit = UnitInput::new("06037")
        .with_vulnerability(history("06037", &[40.0, 47.5, 55.0, 62.5, 70.0]))
        .with_hazards(vec![nearby_fire(3.0)])
        .with_weather(WeatherSnapshot {
            humidity: Some(Percent::new(10.0)),
            wind_speed_mph: Some(MilesPerHour::new(30.0)),
            ..WeatherSnapshot::default()
        });
    let engine = CompositeRiskEngine::new(&EngineConfig::default())
        .unwrap()
        .with_jitter(Arc::new(SeededJitter::new(99)));
    let prediction = engine.compute(&unit).unwrap();
    assert!(prediction.confidence >= 0.85 && prediction.confidence <= 0.95);
}

#[test]
fn test_sparse_unit_is_never_high() {
    let engine = engine(&EngineConfig::default());
    for index in [0.0, 35.0, 60.0, 100.0] {
        let unit = UnitInput::new("48201").with_vulnerability(history("48201", &[index]));
        let prediction = engine.compute(&unit).unwrap();
        assert_ne!(prediction.tier(), RiskTier::High, "index {index}");
        assert_abs_diff_eq!(prediction.confidence, 0.75, epsilon = 1e-12);
        assert!(!prediction.using_fallback);
    }
}

#[test]
fn test_sparse_unit_scores_baselines() {
    let unit = UnitInput::new("48201").with_vulnerability(history("48201", &[60.0]));
    let prediction = engine(&EngineConfig::default()).compute(&unit).unwrap();
    assert_abs_diff_eq!(prediction.features.hazard_activity.score, 0.2);
    assert_abs_diff_eq!(prediction.features.weather.score, 0.3);
    assert_abs_diff_eq!(prediction.risk_score, 0.335, epsilon = 1e-12);
    assert_eq!(prediction.tier(), RiskTier::Low);
}

#[test]
fn test_confirmed_absence_beats_unavailable_feed() {
    let engine = engine(&EngineConfig::default());
    let base = UnitInput::new("48201").with_vulnerability(history("48201", &[60.0]));
    let unavailable = engine.compute(&base).unwrap();
    let absent = engine.compute(&base.clone().with_hazards(Vec::new())).unwrap();
    assert_abs_diff_eq!(absent.confidence - unavailable.confidence, 0.03, epsilon = 1e-12);
    assert_eq!(absent.risk_score, unavailable.risk_score);
}

#[test]
fn test_small_batch_classifies_with_fallback_cut_points() {
    let pipeline = RiskPipeline::new(&EngineConfig::default())
        .unwrap()
        .with_jitter(Arc::new(NoJitter));
    let units = vec![
        UnitInput::new("a").with_vulnerability(history("a", &[20.0])),
        UnitInput::new("b").with_vulnerability(history("b", &[60.0])),
        UnitInput::new("c").with_vulnerability(history("c", &[95.0])),
    ];
    let report = pipeline.run_batch(&units).unwrap();
    assert_eq!(report.thresholds.methodology, Methodology::Fallback);
    assert_eq!(report.thresholds.high.threshold, 0.60);
    assert_eq!(report.thresholds.medium.threshold, 0.35);
    assert_eq!(report.thresholds.sample_size, 3);
}

#[test]
fn test_community_impact_profile_weights_vulnerability_more() {
    let unit = UnitInput::new("06037").with_vulnerability(history("06037", &[90.0]));
    let hazard = engine(&EngineConfig::default()).compute(&unit).unwrap();
    let community = engine(&EngineConfig::from_json_str(r#"{ "weightProfile": "communityImpact" }"#).unwrap())
        .compute(&unit)
        .unwrap();
    assert!(community.risk_score > hazard.risk_score);
    assert_abs_diff_eq!(community.features.vulnerability.weight, 0.35);
}

#[test]
fn test_missing_history_is_flagged() {
    let prediction = engine(&EngineConfig::default())
        .compute(&UnitInput::new("06037").with_hazards(Vec::new()))
        .unwrap();
    assert!(prediction.using_fallback);
    assert_abs_diff_eq!(prediction.features.vulnerability.score, 0.5);
}

#[test]
fn test_single_query_unchanged_by_batch_run() {
    let pipeline = RiskPipeline::new(&EngineConfig::default())
        .unwrap()
        .with_jitter(Arc::new(NoJitter));
    let units: Vec<UnitInput> = (0..12)
        .map(|i| {
            let id = format!("u{i:02}");
            let index = 5.0 + 8.0 * f64::from(i);
            UnitInput::new(&id).with_vulnerability(history(&id, &[index]))
        })
        .collect();

    let before = pipeline.assess(&units[9]);
    assert_eq!(before.classification, ClassificationStage::Provisional);

    let report = pipeline.run_batch(&units).unwrap();
    assert_eq!(report.thresholds.methodology, Methodology::Dynamic);
    let in_batch = report.prediction("u09").unwrap();
    assert_eq!(in_batch.classification, ClassificationStage::Final);

    let after = pipeline.assess(&units[9]);
    assert_eq!(after.classification, ClassificationStage::Provisional);
    assert_eq!(after.risk_level, before.risk_level);
    assert_eq!(after.risk_score, before.risk_score);
}
