//! Common types for the shared crate
//!
//! Identifier aliases and the user role used to gate map editing.

use serde::{Deserialize, Serialize};

/// Zone primary key
pub type ZoneId = i64;
/// Point primary key
pub type PointId = i64;
/// Element primary key
pub type ElementId = i64;
/// Element type primary key
pub type ElementTypeId = i64;
/// Tree type primary key
pub type TreeTypeId = i64;
/// Incidence primary key
pub type IncidenceId = i64;
/// Contract primary key
pub type ContractId = i64;

/// Role of the signed-in user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Manager,
    Worker,
    Customer,
}

impl UserRole {
    /// Whether this role may draw zones and create or delete inventory
    pub fn can_edit_map(&self) -> bool {
        matches!(self, Self::Admin | Self::Manager)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Manager => write!(f, "manager"),
            Self::Worker => write!(f, "worker"),
            Self::Customer => write!(f, "customer"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_rights() {
        assert!(UserRole::Admin.can_edit_map());
        assert!(UserRole::Manager.can_edit_map());
        assert!(!UserRole::Worker.can_edit_map());
        assert!(!UserRole::Customer.can_edit_map());
    }

    #[test]
    fn test_role_serde() {
        let json = serde_json::to_string(&UserRole::Worker).unwrap();
        assert_eq!(json, "\"worker\"");
        let role: UserRole = serde_json::from_str("\"manager\"").unwrap();
        assert_eq!(role, UserRole::Manager);
    }
}
