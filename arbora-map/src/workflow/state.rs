//! Page state

use serde::{Deserialize, Serialize};
use shared::types::ZoneId;
use shared::{LngLat, Ring};

/// 地图页面状态
///
/// Zone drawing and element placement are two tracks that both start and
/// end at `Idle`; only one is active at a time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PageState {
    /// 空闲
    #[default]
    Idle,
    /// 已选中区域 (视图已飞到该区域)
    ZoneSelected { zone_id: ZoneId },

    // === Zone creation ===
    /// Drawing enabled, no valid ring yet
    DrawingZone,
    /// Valid ring drawn, "save zone" enabled
    RingValidated { ring: Ring },
    /// Zone create request in flight
    SavingZone { ring: Ring },

    // === Element creation ===
    /// Waiting for a map click inside the target zone
    CreatingElement { zone_id: ZoneId },
    /// Coordinate picked, element form open
    PlacingPoint { zone_id: ZoneId, coord: LngLat },
    /// Point then element create in flight
    SavingElement { zone_id: ZoneId, coord: LngLat },
}

impl PageState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::ZoneSelected { .. } => "zone selected",
            Self::DrawingZone => "drawing a zone",
            Self::RingValidated { .. } => "ring validated",
            Self::SavingZone { .. } => "saving a zone",
            Self::CreatingElement { .. } => "creating an element",
            Self::PlacingPoint { .. } => "placing a point",
            Self::SavingElement { .. } => "saving an element",
        }
    }

    /// A request is in flight
    pub fn is_saving(&self) -> bool {
        matches!(self, Self::SavingZone { .. } | Self::SavingElement { .. })
    }

    /// Drawing tool is listening
    pub fn is_drawing(&self) -> bool {
        matches!(self, Self::DrawingZone | Self::RingValidated { .. })
    }

    pub fn is_creating_element(&self) -> bool {
        matches!(
            self,
            Self::CreatingElement { .. } | Self::PlacingPoint { .. } | Self::SavingElement { .. }
        )
    }

    /// Zone the current state refers to, if any
    pub fn zone_id(&self) -> Option<ZoneId> {
        match self {
            Self::ZoneSelected { zone_id }
            | Self::CreatingElement { zone_id }
            | Self::PlacingPoint { zone_id, .. }
            | Self::SavingElement { zone_id, .. } => Some(*zone_id),
            _ => None,
        }
    }
}
