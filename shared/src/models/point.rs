//! Point Model

use serde::{Deserialize, Serialize};

use crate::geometry::LngLat;
use crate::types::{PointId, ZoneId};

/// What a point anchors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointType {
    Element,
    Zone,
    Other,
}

/// Point entity (geographic anchor)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub id: PointId,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "type")]
    pub point_type: PointType,
    pub zone_id: ZoneId,
}

impl Point {
    pub fn coord(&self) -> LngLat {
        LngLat::new(self.longitude, self.latitude)
    }

    pub fn is_element_anchor(&self) -> bool {
        self.point_type == PointType::Element
    }
}

/// Create point payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointCreate {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "type")]
    pub point_type: PointType,
    pub zone_id: ZoneId,
}

impl PointCreate {
    /// Element anchor at `coord` inside `zone_id`
    pub fn element_anchor(coord: LngLat, zone_id: ZoneId) -> Self {
        Self {
            latitude: coord.lat,
            longitude: coord.lng,
            point_type: PointType::Element,
            zone_id,
        }
    }
}
