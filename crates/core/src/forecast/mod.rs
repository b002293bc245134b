//! Multi-day spread forecaster
//!
//! Given a unit's current hazard event and weather, produces a day-by-day
//! sequence of forecast risk, a wind-biased spread polygon and directional
//! threat estimates.
//!
//! Day 1 seeds a ring around the hazard; each later day grows the previous
//! day's polygon. The weather is projected forward by persistence with a slow
//! warming and drying drift, so later days are hotter and drier than the
//! observation.
//!
//! Without both a hazard and a weather snapshot the forecaster still answers,
//! with a fixed moderate-risk forecast flagged [`DataQuality::Limited`].

pub mod polygon;
pub mod recommendations;
pub mod threat;

pub use polygon::SpreadPolygon;
pub use threat::{CompassDirection, ThreatArea, ThreatLevel};

use crate::core_types::hazard::{HazardObservation, HazardRiskLevel};
use crate::core_types::spatial::GeoPoint;
use crate::core_types::units::Percent;
use crate::core_types::weather::{FireWeatherIndex, WeatherSnapshot};
use crate::error::{Result, RiskError};
use crate::scoring::ladder::{Ladder, LadderStep};
use crate::scoring::TrendDirection;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Added to daily risk when the source hazard is rated critical
pub const CRITICAL_HAZARD_BONUS: f64 = 0.30;

/// Risk every active hazard carries regardless of conditions
pub const DAILY_BASE_RISK: f64 = 0.10;

/// Fractional risk escalation per day after the first
pub const DAILY_ESCALATION: f64 = 0.10;

/// Day-1 ring radius: `INITIAL_RADIUS_KM + RADIUS_KM_PER_MPH * wind`
pub const INITIAL_RADIUS_KM: f64 = 0.5;
pub const RADIUS_KM_PER_MPH: f64 = 0.05;

/// Daily growth: `(BASE_GROWTH_KM + GROWTH_KM_PER_MPH * wind) * (GROWTH_RISK_OFFSET + risk)`
pub const BASE_GROWTH_KM: f64 = 0.3;
pub const GROWTH_KM_PER_MPH: f64 = 0.05;
pub const GROWTH_RISK_OFFSET: f64 = 0.5;

/// Persistence drift per day after the first
pub const TEMPERATURE_DRIFT_F: f64 = 1.0;
pub const HUMIDITY_DRIFT_PCT: f64 = 2.0;
pub const HUMIDITY_FLOOR_PCT: f64 = 5.0;

pub const FALLBACK_RISK: f64 = 0.5;
pub const FALLBACK_RADIUS_KM: f64 = 1.0;

const FULL_CONFIDENCE_DAY_ONE: f64 = 0.8;
const LIMITED_CONFIDENCE_DAY_ONE: f64 = 0.5;
const CONFIDENCE_DECAY_PER_DAY: f64 = 0.1;
const CONFIDENCE_FLOOR: f64 = 0.3;

/// Longest forecast horizon a configuration may allow, in days
pub const MAX_HORIZON_DAYS: u8 = 5;

/// Band for the first-to-last day risk trend
const RISK_TREND_BAND: f64 = 0.05;

pub const FORECAST_WIND: Ladder = Ladder::exceeds(&[
    LadderStep::new(25.0, 0.30),
    LadderStep::new(15.0, 0.20),
    LadderStep::new(10.0, 0.10),
]);

pub const FORECAST_HUMIDITY: Ladder =
    Ladder::falls_below(&[LadderStep::new(15.0, 0.25), LadderStep::new(30.0, 0.15)]);

pub const FORECAST_TEMPERATURE: Ladder =
    Ladder::exceeds(&[LadderStep::new(95.0, 0.15), LadderStep::new(85.0, 0.10)]);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ForecastConfig {
    pub default_days: u8,
    pub max_days: u8,
    /// Vertices in the spread ring
    pub vertex_count: usize,
    /// Assumed terrain, reported with each forecast
    pub terrain_profile: String,
    pub terrain_factor: f64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            default_days: 3,
            max_days: 5,
            vertex_count: 16,
            terrain_profile: "mixed vegetation, moderate slopes".into(),
            terrain_factor: 0.10,
        }
    }
}

impl ForecastConfig {
    /// # Errors
    /// Returns [`RiskError::Config`] for a horizon outside `1..=5` days, a default
    /// outside the horizon, fewer than three vertices or a terrain factor outside
    /// `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_HORIZON_DAYS).contains(&self.max_days) {
            return Err(RiskError::Config(format!(
                "forecast maxDays must be within 1..={MAX_HORIZON_DAYS}, got {}",
                self.max_days
            )));
        }
        if !(1..=self.max_days).contains(&self.default_days) {
            return Err(RiskError::Config(format!(
                "forecast defaultDays must be within 1..={}",
                self.max_days
            )));
        }
        if self.vertex_count < 3 {
            return Err(RiskError::Config(
                "forecast vertexCount must be at least 3".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.terrain_factor) {
            return Err(RiskError::Config(
                "forecast terrainFactor must be between 0 and 1".into(),
            ));
        }
        Ok(())
    }
}

/// Whether the forecast ran on live inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DataQuality {
    Full,
    Limited,
}

/// What to forecast for one unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastRequest {
    pub unit_id: String,
    /// Unit location; the fallback ring is centered here when no hazard is known
    pub origin: GeoPoint,
    #[serde(default)]
    pub hazard: Option<HazardObservation>,
    #[serde(default)]
    pub weather: Option<WeatherSnapshot>,
    /// Horizon in days; the configured default when absent
    #[serde(default)]
    pub days: Option<u8>,
}

impl ForecastRequest {
    #[must_use]
    pub fn new(unit_id: impl Into<String>, origin: GeoPoint) -> Self {
        Self {
            unit_id: unit_id.into(),
            origin,
            hazard: None,
            weather: None,
            days: None,
        }
    }

    #[must_use]
    pub fn with_hazard(mut self, hazard: HazardObservation) -> Self {
        self.hazard = Some(hazard);
        self
    }

    #[must_use]
    pub fn with_weather(mut self, weather: WeatherSnapshot) -> Self {
        self.weather = Some(weather);
        self
    }

    #[must_use]
    pub fn with_days(mut self, days: u8) -> Self {
        self.days = Some(days);
        self
    }
}

/// One forecast day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadForecastDay {
    pub day: u8,
    pub risk_score: f64,
    pub risk_level: HazardRiskLevel,
    /// Conditions assumed for the day
    pub weather: WeatherSnapshot,
    pub spread_polygon: Vec<GeoPoint>,
    /// Distance from the hazard origin to each polygon vertex, at fixed bearings
    pub vertex_radii_km: Vec<f64>,
    pub area_km2: f64,
    pub threat_areas: Vec<ThreatArea>,
    pub confidence: f64,
}

impl SpreadForecastDay {
    fn new(
        day: u8,
        risk_score: f64,
        weather: WeatherSnapshot,
        polygon: &SpreadPolygon,
        threat_areas: Vec<ThreatArea>,
        confidence: f64,
    ) -> Self {
        Self {
            day,
            risk_score,
            risk_level: risk_level_for(risk_score),
            weather,
            spread_polygon: polygon.geo_vertices(),
            vertex_radii_km: polygon.radii_km().to_vec(),
            area_km2: polygon.area_km2(),
            threat_areas,
            confidence,
        }
    }
}

/// A unit's multi-day forecast with its summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadForecast {
    pub unit_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hazard_id: Option<String>,
    pub days: Vec<SpreadForecastDay>,
    pub highest_risk_day: u8,
    pub risk_trend: TrendDirection,
    pub primary_risk_factors: Vec<String>,
    pub recommendations: Vec<String>,
    pub data_quality: DataQuality,
    pub terrain_profile: String,
    pub generated_at: DateTime<Utc>,
}

impl SpreadForecast {
    /// The day with the highest risk
    #[must_use]
    pub fn peak_day(&self) -> Option<&SpreadForecastDay> {
        self.days.iter().find(|d| d.day == self.highest_risk_day)
    }
}

/// Forecast risk band
#[must_use]
pub fn risk_level_for(score: f64) -> HazardRiskLevel {
    if score >= 0.8 {
        HazardRiskLevel::Critical
    } else if score >= 0.6 {
        HazardRiskLevel::High
    } else if score >= 0.4 {
        HazardRiskLevel::Moderate
    } else {
        HazardRiskLevel::Low
    }
}

/// Conditions assumed on `day` (1-based) by persistence with drift
#[must_use]
pub fn project_weather(observed: &WeatherSnapshot, day: u8) -> WeatherSnapshot {
    let elapsed = f64::from(day.saturating_sub(1));
    WeatherSnapshot {
        temperature: observed
            .temperature
            .map(|t| t + TEMPERATURE_DRIFT_F * elapsed),
        humidity: observed.humidity.map(|h| {
            let floor = Percent::new(HUMIDITY_FLOOR_PCT.min(*h));
            (h - HUMIDITY_DRIFT_PCT * elapsed).max(floor)
        }),
        ..*observed
    }
}

/// Weather contribution to forecast risk
#[must_use]
pub fn weather_factor(weather: &WeatherSnapshot) -> f64 {
    weather.wind_speed_mph.map_or(0.0, |w| FORECAST_WIND.evaluate(*w))
        + weather.humidity.map_or(0.0, |h| FORECAST_HUMIDITY.evaluate(*h))
        + weather
            .temperature
            .map_or(0.0, |t| FORECAST_TEMPERATURE.evaluate(*t))
}

fn decayed_confidence(day_one: f64, day: u8) -> f64 {
    (day_one - CONFIDENCE_DECAY_PER_DAY * f64::from(day.saturating_sub(1))).max(CONFIDENCE_FLOOR)
}

/// Produces [`SpreadForecast`]s
#[derive(Debug, Clone, Default)]
pub struct SpreadForecaster {
    config: ForecastConfig,
}

impl SpreadForecaster {
    #[must_use]
    pub fn new(config: ForecastConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Forecast one unit
    ///
    /// # Errors
    /// - [`RiskError::InvalidParameter`] when the horizon is outside
    ///   `1..=max_days`, or no hazard is given and the origin is invalid.
    /// - [`RiskError::InvalidCoordinates`] when the hazard location is not a
    ///   valid latitude/longitude.
    pub fn forecast(&self, request: &ForecastRequest) -> Result<SpreadForecast> {
        let days = request.days.unwrap_or(self.config.default_days);
        if !(1..=self.config.max_days).contains(&days) {
            return Err(RiskError::InvalidParameter(format!(
                "forecast days must be between 1 and {}, got {days}",
                self.config.max_days
            )));
        }

        if let Some(hazard) = &request.hazard {
            if !hazard.location.is_valid() {
                return Err(RiskError::InvalidCoordinates {
                    hazard_id: hazard.id.clone(),
                    lat: hazard.location.lat,
                    lng: hazard.location.lng,
                });
            }
        } else if !request.origin.is_valid() {
            return Err(RiskError::InvalidParameter(format!(
                "forecast origin ({}, {}) is not a valid location",
                request.origin.lat, request.origin.lng
            )));
        }

        match (&request.hazard, &request.weather) {
            (Some(hazard), Some(weather)) => Ok(self.full_forecast(request, hazard, weather, days)),
            _ => {
                warn!(
                    unit_id = %request.unit_id,
                    has_hazard = request.hazard.is_some(),
                    has_weather = request.weather.is_some(),
                    "Incomplete forecast inputs, using limited forecast"
                );
                Ok(self.fallback_forecast(request, days))
            }
        }
    }

    fn daily_risk(&self, hazard: &HazardObservation, weather: &WeatherSnapshot, day: u8) -> f64 {
        let critical = if hazard.risk_level == HazardRiskLevel::Critical {
            CRITICAL_HAZARD_BONUS
        } else {
            0.0
        };
        let base = critical + DAILY_BASE_RISK + weather_factor(weather) + self.config.terrain_factor;
        let escalation = 1.0 + f64::from(day - 1) * DAILY_ESCALATION;
        (base * escalation).clamp(0.0, 1.0)
    }

    fn full_forecast(
        &self,
        request: &ForecastRequest,
        hazard: &HazardObservation,
        observed: &WeatherSnapshot,
        days: u8,
    ) -> SpreadForecast {
        let wind_speed = observed.wind_speed_or_calm();
        let wind_bearing = observed.wind_direction_deg;
        // Calm air has no downwind side
        let growth_bearing = wind_bearing.filter(|_| *wind_speed > 0.0);

        let mut polygon = SpreadPolygon::ring(
            hazard.location,
            self.config.vertex_count,
            INITIAL_RADIUS_KM + RADIUS_KM_PER_MPH * *wind_speed,
        );
        let base_growth = BASE_GROWTH_KM + GROWTH_KM_PER_MPH * *wind_speed;

        let mut forecast_days = Vec::with_capacity(usize::from(days));
        for day in 1..=days {
            let weather = project_weather(observed, day);
            let risk = self.daily_risk(hazard, &weather, day);
            if day > 1 {
                polygon = polygon.grown(base_growth * (GROWTH_RISK_OFFSET + risk), growth_bearing);
            }
            let threats = threat::assess_threats(
                weather.wind_speed_or_calm(),
                weather.wind_direction_deg,
            );
            debug!(
                unit_id = %request.unit_id,
                day,
                risk,
                area_km2 = polygon.area_km2(),
                "Forecast day"
            );
            forecast_days.push(SpreadForecastDay::new(
                day,
                risk,
                weather,
                &polygon,
                threats,
                decayed_confidence(FULL_CONFIDENCE_DAY_ONE, day),
            ));
        }

        let peak = forecast_days
            .iter()
            .fold(None::<&SpreadForecastDay>, |best, d| match best {
                Some(b) if b.risk_score >= d.risk_score => Some(b),
                _ => Some(d),
            });
        let (highest_risk_day, recommendations) = peak.map_or((1, Vec::new()), |d| {
            (
                d.day,
                recommendations::recommendations_for(d.risk_level, &d.threat_areas),
            )
        });
        let risk_trend = risk_trend(&forecast_days);

        SpreadForecast {
            unit_id: request.unit_id.clone(),
            hazard_id: Some(hazard.id.clone()),
            highest_risk_day,
            risk_trend,
            primary_risk_factors: self.primary_risk_factors(hazard, observed),
            recommendations,
            days: forecast_days,
            data_quality: DataQuality::Full,
            terrain_profile: self.config.terrain_profile.clone(),
            generated_at: Utc::now(),
        }
    }

    fn primary_risk_factors(&self, hazard: &HazardObservation, weather: &WeatherSnapshot) -> Vec<String> {
        let mut factors = Vec::new();
        if hazard.risk_level == HazardRiskLevel::Critical {
            factors.push("Critical hazard intensity".to_string());
        }
        if let Some(wind) = weather.wind_speed_mph.filter(|w| **w > 15.0) {
            factors.push(format!("Strong winds ({wind})"));
        }
        if let Some(humidity) = weather.humidity.filter(|h| **h < 30.0) {
            factors.push(format!("Low humidity ({humidity})"));
        }
        if let Some(temperature) = weather.temperature.filter(|t| **t > 85.0) {
            factors.push(format!("High temperature ({temperature})"));
        }
        if let Some(index) = weather
            .fire_weather_index
            .filter(|i| *i >= FireWeatherIndex::High)
        {
            factors.push(format!("{} fire weather index", index.label()));
        }
        if self.config.terrain_factor > 0.0 {
            factors.push(format!("Terrain: {}", self.config.terrain_profile));
        }
        factors
    }

    /// Fixed moderate-risk forecast for incomplete inputs
    #[must_use]
    pub fn fallback_forecast(&self, request: &ForecastRequest, days: u8) -> SpreadForecast {
        let center = request
            .hazard
            .as_ref()
            .map_or(request.origin, |h| h.location);
        let polygon = SpreadPolygon::ring(center, self.config.vertex_count, FALLBACK_RADIUS_KM);
        let weather = request.weather.unwrap_or_default();

        let forecast_days = (1..=days)
            .map(|day| {
                SpreadForecastDay::new(
                    day,
                    FALLBACK_RISK,
                    weather,
                    &polygon,
                    Vec::new(),
                    decayed_confidence(LIMITED_CONFIDENCE_DAY_ONE, day),
                )
            })
            .collect();

        SpreadForecast {
            unit_id: request.unit_id.clone(),
            hazard_id: request.hazard.as_ref().map(|h| h.id.clone()),
            days: forecast_days,
            highest_risk_day: 1,
            risk_trend: TrendDirection::Stable,
            primary_risk_factors: vec!["Insufficient data for risk factor analysis".to_string()],
            recommendations: recommendations::LIMITED_DATA_RECOMMENDATIONS
                .iter()
                .map(ToString::to_string)
                .collect(),
            data_quality: DataQuality::Limited,
            terrain_profile: self.config.terrain_profile.clone(),
            generated_at: Utc::now(),
        }
    }
}

fn risk_trend(days: &[SpreadForecastDay]) -> TrendDirection {
    match (days.first(), days.last()) {
        (Some(first), Some(last)) => {
            TrendDirection::from_change(last.risk_score - first.risk_score, RISK_TREND_BAND)
        }
        _ => TrendDirection::Stable,
    }
}
