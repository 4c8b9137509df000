//! Tree Type Model

use serde::{Deserialize, Serialize};

use crate::types::TreeTypeId;

/// Tree type (botanical lookup data)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeType {
    pub id: TreeTypeId,
    pub family: String,
    pub genus: String,
    pub species: String,
}

impl TreeType {
    /// "Genus species (Family)"
    pub fn display_name(&self) -> String {
        format!("{} {} ({})", self.genus, self.species, self.family)
    }
}
