//! Geographic points and the local planar frame used by the spread model
//!
//! Spread polygons are grown in a local east/north frame (kilometers) centered on
//! the hazard origin and converted back to latitude/longitude for output. Over the
//! tens of kilometers a forecast covers, the equirectangular approximation is
//! well inside the error of the growth model itself.

use crate::core_types::units::{Degrees, Kilometers, Miles};
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Kilometers per degree of latitude
const KM_PER_DEGREE_LAT: f64 = 111.32;

/// A WGS84 latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// True when both coordinates are finite and inside their valid ranges
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// Great-circle distance using the haversine formula
    #[must_use]
    pub fn haversine_distance(&self, other: &GeoPoint) -> Kilometers {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let dlat = (other.lat - self.lat).to_radians();
        let dlng = (other.lng - self.lng).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        Kilometers::new(EARTH_RADIUS_KM * c)
    }

    /// Great-circle distance in miles
    #[must_use]
    pub fn distance_miles(&self, other: &GeoPoint) -> Miles {
        self.haversine_distance(other).into()
    }

    /// Point displaced by a local east/north offset in kilometers
    #[must_use]
    pub fn offset_by(&self, offset_km: Vector2<f64>) -> GeoPoint {
        let lat = self.lat + offset_km.y / KM_PER_DEGREE_LAT;
        let km_per_degree_lng = KM_PER_DEGREE_LAT * self.lat.to_radians().cos().max(1e-6);
        let lng = self.lng + offset_km.x / km_per_degree_lng;
        GeoPoint { lat, lng }
    }
}

/// Unit vector (east, north) pointing along a compass bearing
#[must_use]
pub fn bearing_vector(bearing: Degrees) -> Vector2<f64> {
    let rad = bearing.to_radians();
    Vector2::new(rad.sin(), rad.cos())
}

/// Compass bearing of a local east/north vector
#[must_use]
pub fn vector_bearing(v: Vector2<f64>) -> Degrees {
    Degrees::new(v.x.atan2(v.y).to_degrees()).normalized()
}
