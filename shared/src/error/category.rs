//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Authentication errors (1xxx)
    Auth,
    /// Permission errors (2xxx)
    Permission,
    /// Zone errors (4xxx)
    Zone,
    /// Point / element errors (5xxx)
    Element,
    /// Incidence errors (6xxx)
    Incidence,
    /// System errors (9xxx)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Auth,
            2000..3000 => Self::Permission,
            4000..5000 => Self::Zone,
            5000..6000 => Self::Element,
            6000..7000 => Self::Incidence,
            _ => Self::System,
        }
    }
}

impl ErrorCode {
    /// Category of this code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_ranges() {
        assert_eq!(ErrorCode::NotFound.category(), ErrorCategory::General);
        assert_eq!(ErrorCode::TokenExpired.category(), ErrorCategory::Auth);
        assert_eq!(ErrorCode::EditorRequired.category(), ErrorCategory::Permission);
        assert_eq!(ErrorCode::ZoneInvalidRing.category(), ErrorCategory::Zone);
        assert_eq!(ErrorCode::ElementTreeTypeRequired.category(), ErrorCategory::Element);
        assert_eq!(ErrorCode::IncidenceNotFound.category(), ErrorCategory::Incidence);
        assert_eq!(ErrorCode::NetworkError.category(), ErrorCategory::System);
    }
}
