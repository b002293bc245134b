//! Weather channel scorer

use super::ladder::{Ladder, LadderStep};
use super::ChannelScore;
use crate::core_types::weather::{FireWeatherIndex, WeatherSnapshot};

/// Score when no snapshot is available
pub const NO_DATA_BASELINE: f64 = 0.3;

/// Starting score for any present snapshot
pub const AMBIENT_BASE: f64 = 0.1;

/// Air temperature, °F
pub const TEMPERATURE: Ladder = Ladder::exceeds(&[
    LadderStep::new(100.0, 0.25),
    LadderStep::new(90.0, 0.15),
    LadderStep::new(80.0, 0.10),
    LadderStep::new(70.0, 0.05),
]);

/// Relative humidity, % (drier is worse)
pub const HUMIDITY: Ladder = Ladder::falls_below(&[
    LadderStep::new(15.0, 0.25),
    LadderStep::new(25.0, 0.15),
    LadderStep::new(35.0, 0.10),
    LadderStep::new(50.0, 0.05),
]);

/// Sustained wind, mph
pub const WIND: Ladder = Ladder::exceeds(&[
    LadderStep::new(25.0, 0.25),
    LadderStep::new(15.0, 0.15),
    LadderStep::new(10.0, 0.10),
    LadderStep::new(5.0, 0.05),
]);

/// Fixed increment per fire weather category
#[must_use]
pub fn fire_weather_increment(index: FireWeatherIndex) -> f64 {
    match index {
        FireWeatherIndex::Extreme => 0.25,
        FireWeatherIndex::VeryHigh => 0.20,
        FireWeatherIndex::High => 0.15,
        FireWeatherIndex::Moderate => 0.05,
        FireWeatherIndex::Low => 0.0,
    }
}

/// Score current conditions. Missing fields contribute nothing.
#[must_use]
pub fn score_weather(weather: Option<&WeatherSnapshot>) -> ChannelScore {
    let Some(weather) = weather else {
        return ChannelScore::new(NO_DATA_BASELINE, "Weather data unavailable - using baseline");
    };

    let mut score = AMBIENT_BASE;
    let mut parts = Vec::with_capacity(4);

    if let Some(temp) = weather.temperature {
        score += TEMPERATURE.evaluate(*temp);
        parts.push(temp.to_string());
    }
    if let Some(humidity) = weather.humidity {
        score += HUMIDITY.evaluate(*humidity);
        parts.push(format!("{humidity} humidity"));
    }
    if let Some(wind) = weather.wind_speed_mph {
        score += WIND.evaluate(*wind);
        parts.push(format!("{wind} wind"));
    }
    if let Some(fwi) = weather.fire_weather_index {
        score += fire_weather_increment(fwi);
        parts.push(format!("fire weather {}", fwi.label()));
    }

    let description = if parts.is_empty() {
        "Weather report contained no measurements".to_string()
    } else if weather.synthetic {
        format!("{} (regional estimate)", parts.join(", "))
    } else {
        parts.join(", ")
    };

    ChannelScore::new(score, description)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::units::{Fahrenheit, MilesPerHour, Percent};
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_missing_weather_is_baseline() {
        let score = score_weather(None);
        assert_eq!(score.score, NO_DATA_BASELINE);
        assert!(score.description.contains("unavailable"));
    }

    #[test]
    fn test_empty_snapshot_is_ambient_base() {
        let score = score_weather(Some(&WeatherSnapshot::default()));
        assert_abs_diff_eq!(score.score, AMBIENT_BASE);
    }

    #[test]
    fn test_dry_windy_day() {
        let weather = WeatherSnapshot {
            humidity: Some(Percent::new(10.0)),
            wind_speed_mph: Some(MilesPerHour::new(30.0)),
            ..WeatherSnapshot::default()
        };
        assert_abs_diff_eq!(score_weather(Some(&weather)).score, 0.6, epsilon = 1e-12);
    }

    #[test]
    fn test_worst_case_saturates() {
        let weather = WeatherSnapshot {
            temperature: Some(Fahrenheit::new(110.0)),
            humidity: Some(Percent::new(5.0)),
            wind_speed_mph: Some(MilesPerHour::new(45.0)),
            fire_weather_index: Some(FireWeatherIndex::Extreme),
            ..WeatherSnapshot::default()
        };
        assert_eq!(score_weather(Some(&weather)).score, 1.0);
    }

    #[test]
    fn test_mild_day() {
        let weather = WeatherSnapshot {
            temperature: Some(Fahrenheit::new(65.0)),
            humidity: Some(Percent::new(70.0)),
            wind_speed_mph: Some(MilesPerHour::new(3.0)),
            fire_weather_index: Some(FireWeatherIndex::Low),
            ..WeatherSnapshot::default()
        };
        assert_abs_diff_eq!(score_weather(Some(&weather)).score, AMBIENT_BASE);
    }
}
