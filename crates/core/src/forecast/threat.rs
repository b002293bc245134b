//! Directional threat assessment around a spreading hazard

use crate::core_types::units::{Degrees, MilesPerHour};
use serde::{Deserialize, Serialize};

/// Half-width of the head-fire sector, in degrees from downwind
pub const HEAD_SECTOR_DEG: f64 = 22.5;

/// Half-width of the flanking sector, in degrees from downwind
pub const FLANK_SECTOR_DEG: f64 = 67.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ThreatLevel {
    Low,
    Moderate,
    High,
    Extreme,
}

impl ThreatLevel {
    /// Hours until the hazard is expected to reach a directly exposed area
    #[must_use]
    pub fn base_eta_hours(self) -> f64 {
        match self {
            ThreatLevel::Extreme => 2.0,
            ThreatLevel::High => 6.0,
            ThreatLevel::Moderate => 12.0,
            ThreatLevel::Low => 24.0,
        }
    }
}

/// The eight principal compass directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompassDirection {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl CompassDirection {
    pub const ALL: [CompassDirection; 8] = [
        CompassDirection::N,
        CompassDirection::NE,
        CompassDirection::E,
        CompassDirection::SE,
        CompassDirection::S,
        CompassDirection::SW,
        CompassDirection::W,
        CompassDirection::NW,
    ];

    #[must_use]
    pub fn bearing(self) -> Degrees {
        let index = CompassDirection::ALL
            .iter()
            .position(|&d| d == self)
            .unwrap_or_default();
        Degrees::new(index as f64 * 45.0)
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            CompassDirection::N => "north",
            CompassDirection::NE => "northeast",
            CompassDirection::E => "east",
            CompassDirection::SE => "southeast",
            CompassDirection::S => "south",
            CompassDirection::SW => "southwest",
            CompassDirection::W => "west",
            CompassDirection::NW => "northwest",
        }
    }
}

/// Exposure of one compass direction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreatArea {
    pub direction: CompassDirection,
    pub bearing: Degrees,
    pub threat_level: ThreatLevel,
    pub eta_hours: f64,
}

/// Threat level for a direction `delta_deg` away from downwind
#[must_use]
pub fn threat_level(delta_deg: f64, wind: MilesPerHour) -> ThreatLevel {
    let wind = *wind;
    if delta_deg <= HEAD_SECTOR_DEG {
        if wind > 25.0 {
            ThreatLevel::Extreme
        } else if wind > 15.0 {
            ThreatLevel::High
        } else {
            ThreatLevel::Moderate
        }
    } else if delta_deg <= FLANK_SECTOR_DEG {
        if wind > 25.0 {
            ThreatLevel::High
        } else if wind > 10.0 {
            ThreatLevel::Moderate
        } else {
            ThreatLevel::Low
        }
    } else {
        ThreatLevel::Low
    }
}

/// Arrival estimate, slowed for directions off the wind axis
#[must_use]
pub fn eta_hours(level: ThreatLevel, delta_deg: f64) -> f64 {
    let base = level.base_eta_hours();
    if delta_deg > 90.0 {
        base * 3.0
    } else if delta_deg > 45.0 {
        base * 2.0
    } else {
        base
    }
}

/// Rate all eight directions against the wind
///
/// Without a wind bearing there is no head or flank; every direction is rated
/// as a flank at the given speed, with no arrival slowdown.
#[must_use]
pub fn assess_threats(wind_speed: MilesPerHour, wind_bearing: Option<Degrees>) -> Vec<ThreatArea> {
    CompassDirection::ALL
        .iter()
        .map(|&direction| {
            let bearing = direction.bearing();
            let (level, eta) = match wind_bearing {
                Some(wind) => {
                    let delta = bearing.angular_distance(wind);
                    let level = threat_level(delta, wind_speed);
                    (level, eta_hours(level, delta))
                }
                None => {
                    let level = threat_level(FLANK_SECTOR_DEG, wind_speed);
                    (level, level.base_eta_hours())
                }
            };
            ThreatArea {
                direction,
                bearing,
                threat_level: level,
                eta_hours: eta,
            }
        })
        .collect()
}
