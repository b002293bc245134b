//! Hazard Risk Core Library
//!
//! Turns per-county hazard signals into a classified risk level and a
//! short-horizon spread forecast.
//!
//! Three input channels feed each unit's assessment:
//! - live hazard-event detections (satellite fire detections),
//! - current weather,
//! - a multi-year social vulnerability history.
//!
//! ## Pipeline
//!
//! - Feature scorers map each channel to a bounded score ([`scoring`])
//! - The composite engine fuses the scores with a weight profile and estimates
//!   confidence from data completeness ([`engine`])
//! - Dynamic thresholds classify every unit relative to its batch ([`thresholds`])
//! - The spread forecaster grows a wind-biased perimeter day by day ([`forecast`])
//!
//! [`pipeline::RiskPipeline`] composes all four over a batch.
//!
//! ```no_run
//! use hazard_risk_core::{BatchDataset, EngineConfig, RiskPipeline};
//!
//! # fn main() -> hazard_risk_core::Result<()> {
//! let pipeline = RiskPipeline::new(&EngineConfig::default())?;
//! let dataset = BatchDataset::load("counties.json")?;
//! let report = pipeline.run_dataset(&dataset)?;
//! println!("{} units in HIGH", report.tier_counts.high);
//! # Ok(())
//! # }
//! ```

// Core types and utilities
pub mod config;
pub mod core_types;
pub mod dataset;
pub mod error;

// Scoring and classification
pub mod engine;
pub mod forecast;
pub mod pipeline;
pub mod scoring;
pub mod thresholds;

// Re-export core types
pub use core_types::{
    associate_hazards, FireWeatherIndex, GeoPoint, HazardObservation, HazardRiskLevel,
    RegionProfile, UnitInput, VulnerabilityRecord, WeatherSnapshot,
};
pub use core_types::{Degrees, Fahrenheit, Kilometers, Miles, MilesPerHour, Percent};

pub use config::EngineConfig;
pub use dataset::BatchDataset;
pub use error::{Result, RiskError};

// Re-export engine types
pub use engine::{
    ClassificationStage, CompositeRiskEngine, FeatureWeights, JitterSource, NoJitter,
    RiskPrediction, SeededJitter, ThreadRngJitter, WeightProfileName,
};
pub use forecast::{DataQuality, ForecastRequest, SpreadForecast, SpreadForecastDay, SpreadForecaster};
pub use pipeline::{BatchReport, ClassifiedBatch, RiskPipeline, ScoredBatch, TierCounts};
pub use thresholds::{DynamicThresholdCalculator, Methodology, RiskLevel, RiskTier, ThresholdSet};
