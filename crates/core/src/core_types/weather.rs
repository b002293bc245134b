//! Weather snapshots and regional synthetic weather
//!
//! A [`WeatherSnapshot`] is the current-conditions record delivered by the weather
//! provider for a unit or a region. Every measurement is optional; providers
//! routinely drop fields.
//!
//! When a unit has no live observation, the pipeline reuses its region's base
//! snapshot adjusted by a [`RegionProfile`]: seasonal temperature and humidity
//! offsets plus a wind factor, the same idea as seasonal weather presets, applied
//! to a single observation instead of a monthly climatology.

use crate::core_types::units::{Degrees, Fahrenheit, MilesPerHour, Percent};
use serde::{Deserialize, Serialize};

/// Categorical fire weather index reported by the weather provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FireWeatherIndex {
    Low,
    Moderate,
    High,
    VeryHigh,
    Extreme,
}

impl FireWeatherIndex {
    /// Display label
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            FireWeatherIndex::Low => "Low",
            FireWeatherIndex::Moderate => "Moderate",
            FireWeatherIndex::High => "High",
            FireWeatherIndex::VeryHigh => "Very High",
            FireWeatherIndex::Extreme => "Extreme",
        }
    }
}

/// Current conditions for a unit or region
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSnapshot {
    #[serde(default)]
    pub temperature: Option<Fahrenheit>,
    #[serde(default)]
    pub humidity: Option<Percent>,
    #[serde(default)]
    pub wind_speed_mph: Option<MilesPerHour>,
    /// Bearing the wind drives spread toward (0 = north, clockwise)
    #[serde(default)]
    pub wind_direction_deg: Option<Degrees>,
    #[serde(default)]
    pub fire_weather_index: Option<FireWeatherIndex>,
    /// Derived from a regional base snapshot rather than observed for the unit
    #[serde(default)]
    pub synthetic: bool,
}

impl WeatherSnapshot {
    /// Number of the four core measurements present
    /// (temperature, humidity, wind speed, wind direction)
    #[must_use]
    pub fn populated_fields(&self) -> usize {
        [
            self.temperature.is_some(),
            self.humidity.is_some(),
            self.wind_speed_mph.is_some(),
            self.wind_direction_deg.is_some(),
        ]
        .into_iter()
        .filter(|present| *present)
        .count()
    }

    /// True when every present measurement is finite
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        [
            self.temperature.map(|t| *t),
            self.humidity.map(|h| *h),
            self.wind_speed_mph.map(|w| *w),
            self.wind_direction_deg.map(|d| *d),
        ]
        .into_iter()
        .flatten()
        .all(f64::is_finite)
    }

    /// Wind speed, zero when not reported
    #[must_use]
    pub fn wind_speed_or_calm(&self) -> MilesPerHour {
        self.wind_speed_mph.unwrap_or_default()
    }

    /// Derive a synthetic snapshot for a unit in `profile`'s region during `month` (1-12)
    #[must_use]
    pub fn synthesize_for(&self, profile: &RegionProfile, month: u32) -> WeatherSnapshot {
        let season = Season::from_month(month);
        let (temp_offset, humidity_offset) = profile.seasonal_offsets(season);

        WeatherSnapshot {
            temperature: self.temperature.map(|t| t + temp_offset),
            humidity: self.humidity.map(|h| (h + humidity_offset).clamped()),
            wind_speed_mph: self
                .wind_speed_mph
                .map(|w| MilesPerHour::new((*w * profile.wind_factor).max(0.0))),
            wind_direction_deg: self.wind_direction_deg,
            fire_weather_index: self.fire_weather_index,
            synthetic: true,
        }
    }
}

/// Northern-hemisphere meteorological season
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl Season {
    /// Season for a calendar month (1-12); out-of-range months wrap
    #[must_use]
    pub fn from_month(month: u32) -> Self {
        match (month.max(1) - 1) % 12 + 1 {
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Autumn,
            _ => Season::Winter,
        }
    }
}

/// Regional adjustment applied to a shared base snapshot
///
/// Offsets are relative to the base snapshot's region, not absolute climatology.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionProfile {
    pub name: String,
    /// Temperature offsets in °F for [winter, spring, summer, autumn]
    pub temp_offsets: [f64; 4],
    /// Humidity offsets in percentage points for [winter, spring, summer, autumn]
    pub humidity_offsets: [f64; 4],
    /// Multiplier on the base wind speed
    pub wind_factor: f64,
}

impl RegionProfile {
    fn seasonal_offsets(&self, season: Season) -> (f64, f64) {
        let idx = match season {
            Season::Winter => 0,
            Season::Spring => 1,
            Season::Summer => 2,
            Season::Autumn => 3,
        };
        (self.temp_offsets[idx], self.humidity_offsets[idx])
    }

    /// Coastal California and the Pacific Northwest coast
    ///
    /// Marine layer keeps summers mild and humid; autumn offshore wind events
    /// (Santa Ana, Diablo) bring the driest, windiest conditions of the year.
    #[must_use]
    pub fn pacific_coast() -> Self {
        Self {
            name: "Pacific Coast".to_string(),
            temp_offsets: [-4.0, -2.0, 0.0, 3.0],
            humidity_offsets: [10.0, 5.0, 5.0, -10.0],
            wind_factor: 1.15,
        }
    }

    /// Arizona, New Mexico, southern Nevada and inland southern California
    #[must_use]
    pub fn desert_southwest() -> Self {
        Self {
            name: "Desert Southwest".to_string(),
            temp_offsets: [2.0, 6.0, 10.0, 5.0],
            humidity_offsets: [-5.0, -12.0, -15.0, -10.0],
            wind_factor: 1.1,
        }
    }

    /// Great Plains grassland
    #[must_use]
    pub fn great_plains() -> Self {
        Self {
            name: "Great Plains".to_string(),
            temp_offsets: [-8.0, 0.0, 5.0, 0.0],
            humidity_offsets: [-5.0, -8.0, -3.0, -5.0],
            wind_factor: 1.3,
        }
    }

    /// Humid Southeast
    #[must_use]
    pub fn southeast() -> Self {
        Self {
            name: "Southeast".to_string(),
            temp_offsets: [2.0, 3.0, 4.0, 2.0],
            humidity_offsets: [10.0, 8.0, 15.0, 8.0],
            wind_factor: 0.85,
        }
    }

    /// Northeast and Great Lakes
    #[must_use]
    pub fn northeast() -> Self {
        Self {
            name: "Northeast".to_string(),
            temp_offsets: [-12.0, -5.0, -3.0, -5.0],
            humidity_offsets: [8.0, 0.0, 10.0, 5.0],
            wind_factor: 0.9,
        }
    }

    /// Look up a built-in profile by name (case-insensitive, `-`/`_`/space agnostic)
    #[must_use]
    pub fn by_name(name: &str) -> Option<Self> {
        let key: String = name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "pacificcoast" => Some(Self::pacific_coast()),
            "desertsouthwest" | "southwest" => Some(Self::desert_southwest()),
            "greatplains" | "plains" => Some(Self::great_plains()),
            "southeast" => Some(Self::southeast()),
            "northeast" => Some(Self::northeast()),
            _ => None,
        }
    }
}
