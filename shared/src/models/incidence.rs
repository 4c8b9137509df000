//! Incidence Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ElementId, IncidenceId};

/// Incidence status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidenceStatus {
    #[default]
    Open,
    Closed,
}

/// Incidence entity (ticket attached to an element)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incidence {
    pub id: IncidenceId,
    pub name: String,
    pub description: Option<String>,
    pub status: IncidenceStatus,
    pub element_id: ElementId,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Create incidence payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidenceCreate {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub status: IncidenceStatus,
    pub element_id: ElementId,
}
