//! Element Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ElementId, ElementTypeId, PointId, TreeTypeId};

/// Element entity (inventoried physical item anchored to a point)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    pub description: Option<String>,
    pub element_type_id: ElementTypeId,
    pub tree_type_id: Option<TreeTypeId>,
    pub point_id: PointId,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Create element payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementCreate {
    pub description: Option<String>,
    pub element_type_id: ElementTypeId,
    pub tree_type_id: Option<TreeTypeId>,
    pub point_id: PointId,
}
