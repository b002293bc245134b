//! Spread polygon on a fixed ring of bearings
//!
//! The polygon is stored as one radius per bearing around the hazard origin, in a
//! local east/north frame measured in kilometers. Growth only ever adds to a
//! radius, so the vertex count is fixed for the lifetime of a forecast and no
//! vertex can move inward.

use crate::core_types::spatial::{bearing_vector, vector_bearing, GeoPoint};
use crate::core_types::units::Degrees;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Minimum directional growth weight (backing spread)
const BACKING_WEIGHT: f64 = 0.25;

/// Radially-grown spread perimeter around a hazard origin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadPolygon {
    origin: GeoPoint,
    radii_km: Vec<f64>,
}

impl SpreadPolygon {
    /// Uniform ring of `vertex_count` vertices at `radius_km` around `origin`
    #[must_use]
    pub fn ring(origin: GeoPoint, vertex_count: usize, radius_km: f64) -> Self {
        Self {
            origin,
            radii_km: vec![radius_km.max(0.0); vertex_count],
        }
    }

    #[must_use]
    pub fn origin(&self) -> GeoPoint {
        self.origin
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.radii_km.len()
    }

    /// Radius of each vertex, indexed like [`Self::bearing`]
    #[must_use]
    pub fn radii_km(&self) -> &[f64] {
        &self.radii_km
    }

    /// Fixed bearing of vertex `index`
    #[must_use]
    pub fn bearing(&self, index: usize) -> Degrees {
        Degrees::new(index as f64 * 360.0 / self.radii_km.len().max(1) as f64)
    }

    /// Vertex positions in the local frame (km east, km north of the origin)
    #[must_use]
    pub fn local_vertices(&self) -> Vec<Vector2<f64>> {
        self.radii_km
            .iter()
            .enumerate()
            .map(|(i, &r)| bearing_vector(self.bearing(i)) * r)
            .collect()
    }

    /// Mean of the vertex positions in the local frame
    fn local_centroid(&self) -> Vector2<f64> {
        let vertices = self.local_vertices();
        if vertices.is_empty() {
            return Vector2::zeros();
        }
        vertices.iter().sum::<Vector2<f64>>() / vertices.len() as f64
    }

    /// Enclosed area by the shoelace formula, in km²
    #[must_use]
    pub fn area_km2(&self) -> f64 {
        let vertices = self.local_vertices();
        let n = vertices.len();
        if n < 3 {
            return 0.0;
        }
        let twice_area: f64 = (0..n)
            .map(|i| {
                let a = vertices[i];
                let b = vertices[(i + 1) % n];
                a.x * b.y - b.x * a.y
            })
            .sum();
        twice_area.abs() / 2.0
    }

    /// Vertices converted to latitude/longitude
    #[must_use]
    pub fn geo_vertices(&self) -> Vec<GeoPoint> {
        self.local_vertices()
            .into_iter()
            .map(|v| self.origin.offset_by(v))
            .collect()
    }

    /// Polygon after one step of wind-biased growth
    ///
    /// Each vertex radius grows by `growth_km * w`, where `w` runs from 0.25
    /// (vertex directly upwind of the current centroid) to 1.0 (directly
    /// downwind). Without a wind bearing every vertex gets `w = 1`.
    #[must_use]
    pub fn grown(&self, growth_km: f64, wind_bearing: Option<Degrees>) -> SpreadPolygon {
        let growth_km = growth_km.max(0.0);
        let centroid = self.local_centroid();
        let radii_km = self
            .local_vertices()
            .into_iter()
            .zip(&self.radii_km)
            .map(|(vertex, &radius)| {
                let weight = wind_bearing.map_or(1.0, |wind| {
                    let offset = vertex - centroid;
                    if offset.norm() <= f64::EPSILON {
                        return 1.0;
                    }
                    directional_weight(vector_bearing(offset).angular_distance(wind))
                });
                radius + growth_km * weight
            })
            .collect();
        SpreadPolygon {
            origin: self.origin,
            radii_km,
        }
    }
}

/// Growth weight for a vertex `delta_deg` away from the downwind bearing
#[must_use]
pub fn directional_weight(delta_deg: f64) -> f64 {
    let alignment = delta_deg.to_radians().cos();
    BACKING_WEIGHT + (1.0 - BACKING_WEIGHT) * (1.0 + alignment) / 2.0
}
