//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            Self::NotFound
            | Self::ZoneNotFound
            | Self::PointNotFound
            | Self::ElementNotFound
            | Self::ElementTypeNotFound
            | Self::TreeTypeNotFound
            | Self::IncidenceNotFound => StatusCode::NOT_FOUND,

            Self::AlreadyExists | Self::ZoneNameExists => StatusCode::CONFLICT,

            Self::NotAuthenticated | Self::TokenExpired | Self::TokenInvalid => {
                StatusCode::UNAUTHORIZED
            }

            Self::PermissionDenied | Self::EditorRequired => StatusCode::FORBIDDEN,

            Self::ValidationFailed
            | Self::InvalidRequest
            | Self::RequiredField
            | Self::ZoneInvalidRing
            | Self::PointOutsideZone
            | Self::ElementTreeTypeRequired => StatusCode::BAD_REQUEST,

            Self::TimeoutError => StatusCode::GATEWAY_TIMEOUT,

            Self::Unknown
            | Self::InternalError
            | Self::DatabaseError
            | Self::NetworkError
            | Self::ConfigError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ErrorCode::ZoneNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::EditorRequired.http_status(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorCode::ZoneInvalidRing.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::InternalError.http_status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
