//! Spread forecast geometry and threat behaviour under different winds

use chrono::Utc;
use hazard_risk_core::forecast::{CompassDirection, ThreatLevel};
use hazard_risk_core::{
    DataQuality, Degrees, ForecastRequest, GeoPoint, HazardObservation, HazardRiskLevel,
    MilesPerHour, Percent, RiskError, SpreadForecaster, WeatherSnapshot,
};
use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Index of the 270° vertex on the default 16-vertex ring
const WEST: usize = 12;
/// Index of the 90° vertex on the default 16-vertex ring
const EAST: usize = 4;

fn fire() -> HazardObservation {
    HazardObservation {
        id: "fire-7".to_string(),
        location: GeoPoint::new(38.5, -122.6),
        confidence_pct: 95.0,
        radiative_power: 140.0,
        distance_from_unit: None,
        risk_level: HazardRiskLevel::High,
        timestamp: Utc::now(),
    }
}

fn windy(speed: f64, bearing: Option<f64>) -> WeatherSnapshot {
    WeatherSnapshot {
        humidity: Some(Percent::new(25.0)),
        wind_speed_mph: Some(MilesPerHour::new(speed)),
        wind_direction_deg: bearing.map(Degrees::new),
        ..WeatherSnapshot::default()
    }
}

fn request(weather: WeatherSnapshot, days: u8) -> ForecastRequest {
    ForecastRequest::new("06097", GeoPoint::new(38.45, -122.7))
        .with_hazard(fire())
        .with_weather(weather)
        .with_days(days)
}

#[test]
fn test_west_wind_grows_west_side_more() {
    let forecast = SpreadForecaster::default()
        .forecast(&request(windy(20.0, Some(270.0)), 3))
        .unwrap();
    let day1 = &forecast.days[0];
    let day3 = &forecast.days[2];

    let west_growth = day3.vertex_radii_km[WEST] - day1.vertex_radii_km[WEST];
    let east_growth = day3.vertex_radii_km[EAST] - day1.vertex_radii_km[EAST];
    assert!(west_growth > east_growth, "west {west_growth} east {east_growth}");
    assert!(east_growth > 0.0);
}

#[test]
fn test_radii_never_shrink() {
    let forecaster = SpreadForecaster::default();
    for (speed, bearing) in [(5.0, Some(0.0)), (18.0, Some(135.0)), (40.0, Some(300.0)), (12.0, None)] {
        let forecast = forecaster.forecast(&request(windy(speed, bearing), 5)).unwrap();
        for pair in forecast.days.windows(2) {
            let (before, after) = (&pair[0], &pair[1]);
            assert_eq!(before.vertex_radii_km.len(), after.vertex_radii_km.len());
            for (r0, r1) in before.vertex_radii_km.iter().zip(&after.vertex_radii_km) {
                assert!(r1 >= r0, "wind {speed} {bearing:?}: {r0} -> {r1}");
            }
            assert!(after.area_km2 >= before.area_km2);
        }
    }
}

#[test]
fn test_vertex_count_is_constant() {
    let forecast = SpreadForecaster::default()
        .forecast(&request(windy(25.0, Some(45.0)), 4))
        .unwrap();
    assert!(forecast
        .days
        .iter()
        .all(|d| d.spread_polygon.len() == 16 && d.vertex_radii_km.len() == 16));
}

#[test]
fn test_calm_wind_grows_uniformly() {
    let forecast = SpreadForecaster::default()
        .forecast(&request(windy(0.0, Some(90.0)), 3))
        .unwrap();
    let day3 = &forecast.days[2];
    let first = day3.vertex_radii_km[0];
    assert!(day3
        .vertex_radii_km
        .iter()
        .all(|r| (r - first).abs() < 1e-9));
}

#[test]
fn test_strong_wind_threat_ladder() {
    let forecast = SpreadForecaster::default()
        .forecast(&request(windy(30.0, Some(270.0)), 1))
        .unwrap();
    let threats = &forecast.days[0].threat_areas;
    let find = |direction| threats.iter().find(|t| t.direction == direction).unwrap();

    let west = find(CompassDirection::W);
    assert_eq!(west.threat_level, ThreatLevel::Extreme);
    assert_eq!(west.eta_hours, 2.0);

    let northwest = find(CompassDirection::NW);
    assert_eq!(northwest.threat_level, ThreatLevel::High);
    assert_eq!(northwest.eta_hours, 6.0);

    let north = find(CompassDirection::N);
    assert_eq!(north.threat_level, ThreatLevel::Low);
    assert_eq!(north.eta_hours, 48.0);

    let east = find(CompassDirection::E);
    assert_eq!(east.eta_hours, 72.0);
}

#[test]
fn test_missing_weather_gives_limited_forecast() {
    let req = ForecastRequest::new("06097", GeoPoint::new(38.45, -122.7))
        .with_hazard(fire())
        .with_days(4);
    let forecast = SpreadForecaster::default().forecast(&req).unwrap();
    assert_eq!(forecast.data_quality, DataQuality::Limited);
    let confidences: Vec<f64> = forecast.days.iter().map(|d| d.confidence).collect();
    assert!((confidences[0] - 0.5).abs() < 1e-12);
    assert!((confidences[3] - 0.3).abs() < 1e-12);
    assert!(forecast.days.iter().all(|d| d.threat_areas.is_empty()));
    assert_eq!(forecast.recommendations.len(), 3);
}

#[test]
fn test_horizon_is_validated() {
    let err = SpreadForecaster::default()
        .forecast(&request(windy(10.0, Some(0.0)), 9))
        .unwrap_err();
    assert!(matches!(err, RiskError::InvalidParameter(_)));
    assert!(err.to_string().contains("between 1 and 5"));
}

#[test]
fn test_unresolvable_hazard_location() {
    let mut hazard = fire();
    hazard.location = GeoPoint::new(f64::NAN, -122.6);
    let req = request(windy(10.0, Some(0.0)), 2).with_hazard(hazard);
    let err = SpreadForecaster::default().forecast(&req).unwrap_err();
    assert!(matches!(err, RiskError::InvalidCoordinates { ref hazard_id, .. } if hazard_id == "fire-7"));
}
