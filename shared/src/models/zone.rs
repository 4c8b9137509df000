//! Zone Model

use serde::{Deserialize, Serialize};

use crate::geometry::{LngLat, Ring};
use crate::types::{ContractId, ZoneId};

/// Zone entity (named polygonal area owned by a contract)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub contract_id: ContractId,
    /// Outer ring, `[lng, lat]` pairs
    pub coordinates: Ring,
}

impl Zone {
    /// Coordinate used to centre the viewport on this zone
    pub fn representative_coord(&self) -> Option<LngLat> {
        self.coordinates.centroid()
    }

    pub fn contains(&self, coord: LngLat) -> bool {
        self.coordinates.contains(coord)
    }
}

/// Create zone payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneCreate {
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub contract_id: ContractId,
    pub coordinates: Ring,
}

/// Update zone payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
}
