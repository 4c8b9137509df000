//! Element Type Model

use serde::{Deserialize, Serialize};

use crate::types::ElementTypeId;

/// Element type (lookup data)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementType {
    pub id: ElementTypeId,
    pub name: String,
    /// Icon identifier understood by the renderer (e.g. "tree", "bench")
    pub icon: Option<String>,
    pub color: Option<String>,
    /// Elements of this type must carry a tree type
    #[serde(default)]
    pub requires_tree_type: bool,
    pub description: Option<String>,
}
