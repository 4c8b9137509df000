//! Geometry value types
//!
//! Coordinates travel as `[longitude, latitude]` pairs, the same order the
//! map provider and GeoJSON use.

use geo::{Centroid, Contains, LineString, Point, Polygon};
use serde::{Deserialize, Serialize};

/// Minimum number of distinct vertices a ring needs to describe an area
pub const MIN_RING_VERTICES: usize = 3;

/// A `[longitude, latitude]` coordinate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// Build from a GeoJSON position; positions with fewer than two ordinates are rejected
    pub fn from_position(position: &[f64]) -> Option<Self> {
        match position {
            [lng, lat, ..] if lng.is_finite() && lat.is_finite() => Some(Self::new(*lng, *lat)),
            _ => None,
        }
    }

    /// GeoJSON position (`[lng, lat]`)
    pub fn to_position(self) -> Vec<f64> {
        vec![self.lng, self.lat]
    }
}

impl From<[f64; 2]> for LngLat {
    fn from([lng, lat]: [f64; 2]) -> Self {
        Self { lng, lat }
    }
}

impl From<LngLat> for [f64; 2] {
    fn from(c: LngLat) -> Self {
        [c.lng, c.lat]
    }
}

impl std::fmt::Display for LngLat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.lng, self.lat)
    }
}

/// Ordered, implicitly closed polygon boundary
///
/// The vertex sequence is kept exactly as drawn; a trailing copy of the first
/// vertex is allowed but not required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ring(Vec<LngLat>);

impl Ring {
    pub fn new(vertices: Vec<LngLat>) -> Self {
        Self(vertices)
    }

    pub fn vertices(&self) -> &[LngLat] {
        &self.0
    }

    pub fn into_vertices(self) -> Vec<LngLat> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Last vertex repeats the first
    pub fn is_closed(&self) -> bool {
        self.0.len() >= 2 && self.0.first() == self.0.last()
    }

    /// Number of distinct vertices (the closing repeat is not counted)
    pub fn distinct_vertices(&self) -> usize {
        let mut seen: Vec<LngLat> = Vec::with_capacity(self.0.len());
        for v in &self.0 {
            if !seen.contains(v) {
                seen.push(*v);
            }
        }
        seen.len()
    }

    /// At least [`MIN_RING_VERTICES`] distinct vertices
    pub fn is_valid(&self) -> bool {
        self.distinct_vertices() >= MIN_RING_VERTICES
    }

    /// Copy of the ring with the closing vertex appended when missing
    pub fn closed(&self) -> Self {
        let mut vertices = self.0.clone();
        if !self.is_closed()
            && let Some(first) = vertices.first().copied()
        {
            vertices.push(first);
        }
        Self(vertices)
    }

    fn polygon(&self) -> Polygon<f64> {
        let exterior: Vec<(f64, f64)> = self.0.iter().map(|c| (c.lng, c.lat)).collect();
        Polygon::new(LineString::from(exterior), vec![])
    }

    /// Area centroid, falling back to the first vertex for degenerate rings
    pub fn centroid(&self) -> Option<LngLat> {
        if !self.is_valid() {
            return self.0.first().copied();
        }
        self.polygon()
            .centroid()
            .map(|p| LngLat::new(p.x(), p.y()))
            .filter(|c| c.lng.is_finite() && c.lat.is_finite())
            .or_else(|| self.0.first().copied())
    }

    /// Strict interior containment; points on the boundary are outside
    pub fn contains(&self, coord: LngLat) -> bool {
        if !self.is_valid() {
            return false;
        }
        self.polygon().contains(&Point::new(coord.lng, coord.lat))
    }

    /// GeoJSON polygon coordinates (single closed outer ring)
    pub fn to_polygon_positions(&self) -> Vec<Vec<Vec<f64>>> {
        vec![self.closed().0.into_iter().map(LngLat::to_position).collect()]
    }
}

impl From<Vec<LngLat>> for Ring {
    fn from(v: Vec<LngLat>) -> Self {
        Self(v)
    }
}

impl FromIterator<LngLat> for Ring {
    fn from_iter<I: IntoIterator<Item = LngLat>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
