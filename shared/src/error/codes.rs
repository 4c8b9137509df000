//! Unified error codes for Arbora
//!
//! Codes are shared by the backend error bodies, the REST client and the map
//! core. Organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 4xxx: Zone errors
//! - 5xxx: Point / element errors
//! - 6xxx: Incidence errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Serialized as a bare `u16`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    Success = 0,
    Unknown = 1,
    ValidationFailed = 2,
    NotFound = 3,
    AlreadyExists = 4,
    InvalidRequest = 5,
    RequiredField = 7,

    // ==================== 1xxx: Auth ====================
    NotAuthenticated = 1001,
    TokenExpired = 1003,
    TokenInvalid = 1004,

    // ==================== 2xxx: Permission ====================
    PermissionDenied = 2001,
    /// Map editing requires an editor role
    EditorRequired = 2002,

    // ==================== 4xxx: Zone ====================
    ZoneNotFound = 4001,
    /// Ring has fewer than three distinct vertices
    ZoneInvalidRing = 4002,
    ZoneNameExists = 4003,

    // ==================== 5xxx: Point / Element ====================
    PointNotFound = 5001,
    /// Point lies outside every zone
    PointOutsideZone = 5002,
    ElementNotFound = 5101,
    ElementTypeNotFound = 5102,
    /// Element type demands a tree type
    ElementTreeTypeRequired = 5103,
    TreeTypeNotFound = 5201,

    // ==================== 6xxx: Incidence ====================
    IncidenceNotFound = 6001,

    // ==================== 9xxx: System ====================
    InternalError = 9001,
    DatabaseError = 9002,
    NetworkError = 9003,
    TimeoutError = 9004,
    ConfigError = 9005,
}

impl ErrorCode {
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::RequiredField => "Required field is missing",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::EditorRequired => "Editor role required",

            // Zone
            ErrorCode::ZoneNotFound => "Zone not found",
            ErrorCode::ZoneInvalidRing => "Zone outline needs at least three vertices",
            ErrorCode::ZoneNameExists => "Zone name already exists",

            // Point / Element
            ErrorCode::PointNotFound => "Point not found",
            ErrorCode::PointOutsideZone => "Cannot create an element outside a zone",
            ErrorCode::ElementNotFound => "Element not found",
            ErrorCode::ElementTypeNotFound => "Element type not found",
            ErrorCode::ElementTreeTypeRequired => "This element type requires a tree type",
            ErrorCode::TreeTypeNotFound => "Tree type not found",

            // Incidence
            ErrorCode::IncidenceNotFound => "Incidence not found",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Request timed out",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            7 => Ok(ErrorCode::RequiredField),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::EditorRequired),

            // Zone
            4001 => Ok(ErrorCode::ZoneNotFound),
            4002 => Ok(ErrorCode::ZoneInvalidRing),
            4003 => Ok(ErrorCode::ZoneNameExists),

            // Point / Element
            5001 => Ok(ErrorCode::PointNotFound),
            5002 => Ok(ErrorCode::PointOutsideZone),
            5101 => Ok(ErrorCode::ElementNotFound),
            5102 => Ok(ErrorCode::ElementTypeNotFound),
            5103 => Ok(ErrorCode::ElementTreeTypeRequired),
            5201 => Ok(ErrorCode::TreeTypeNotFound),

            // Incidence
            6001 => Ok(ErrorCode::IncidenceNotFound),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::NotFound.code(), 3);
        assert_eq!(ErrorCode::ZoneInvalidRing.code(), 4002);
        assert_eq!(ErrorCode::ElementTreeTypeRequired.code(), 5103);
        assert_eq!(ErrorCode::try_from(999), Err(InvalidErrorCode(999)));
        assert_eq!(ErrorCode::try_from(6), Err(InvalidErrorCode(6)));
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::PointOutsideZone).unwrap();
        assert_eq!(json, "5002");
        let parsed: ErrorCode = serde_json::from_str("4001").unwrap();
        assert_eq!(parsed, ErrorCode::ZoneNotFound);
        assert!(serde_json::from_str::<ErrorCode>("4999").is_err());
    }

    #[test]
    fn test_every_code_roundtrips_through_u16() {
        let codes = [
            ErrorCode::Success,
            ErrorCode::RequiredField,
            ErrorCode::TokenInvalid,
            ErrorCode::EditorRequired,
            ErrorCode::ZoneNameExists,
            ErrorCode::TreeTypeNotFound,
            ErrorCode::IncidenceNotFound,
            ErrorCode::ConfigError,
        ];
        for code in codes {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }
}
