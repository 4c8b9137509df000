//! Form payloads collected by the page

use serde::{Deserialize, Serialize};
use shared::LngLat;
use shared::models::ElementType;
use shared::types::{ContractId, ElementTypeId, TreeTypeId, ZoneId};

use crate::error::{WorkflowError, WorkflowResult};

/// Zone save form (the ring comes from the drawing tool)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneForm {
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub contract_id: ContractId,
}

/// Element save form, pre-filled with the clicked coordinate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementForm {
    pub coord: LngLat,
    pub zone_id: ZoneId,
    pub description: Option<String>,
    pub element_type_id: Option<ElementTypeId>,
    pub tree_type_id: Option<TreeTypeId>,
}

impl ElementForm {
    pub fn at(coord: LngLat, zone_id: ZoneId) -> Self {
        Self {
            coord,
            zone_id,
            description: None,
            element_type_id: None,
            tree_type_id: None,
        }
    }

    pub fn with_type(mut self, element_type_id: ElementTypeId) -> Self {
        self.element_type_id = Some(element_type_id);
        self
    }

    pub fn with_tree_type(mut self, tree_type_id: TreeTypeId) -> Self {
        self.tree_type_id = Some(tree_type_id);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncidenceForm {
    pub name: String,
    pub description: Option<String>,
}

/// Save-enablement check; never touches the network
///
/// Returns the selected element type id.
pub fn validate_element_form(form: &ElementForm, element_types: &[ElementType]) -> WorkflowResult<ElementTypeId> {
    let element_type = form
        .element_type_id
        .and_then(|id| element_types.iter().find(|t| t.id == id))
        .ok_or(WorkflowError::UnknownElementType)?;

    if element_type.requires_tree_type && form.tree_type_id.is_none() {
        return Err(WorkflowError::MissingTreeType {
            element_type_id: element_type.id,
        });
    }
    Ok(element_type.id)
}
