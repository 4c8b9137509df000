//! Map core error types

use arbora_client::ClientError;
use shared::ErrorCode;
use shared::types::{ElementId, ElementTypeId, ZoneId};
use thiserror::Error;

/// Renderer / session errors
#[derive(Debug, Error)]
pub enum MapError {
    #[error("Map provider access token is missing")]
    MissingAccessToken,

    #[error("Map container has no layout ({width}x{height})")]
    ContainerNotReady { width: u32, height: u32 },

    #[error("Map style is not loaded yet")]
    StyleNotLoaded,

    #[error("Map session has been destroyed")]
    Disposed,

    #[error("Source already exists: {0}")]
    SourceExists(String),

    #[error("Source not found: {0}")]
    SourceNotFound(String),

    #[error("Layer already exists: {0}")]
    LayerExists(String),

    #[error("Layer not found: {0}")]
    LayerNotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Zone / element workflow errors
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Editor role required")]
    NotEditor,

    #[error("Cannot create an element outside a zone")]
    NoTargetZone,

    #[error("Cannot create an element outside a zone")]
    OutsideZone,

    #[error("Zone {0} not found")]
    ZoneNotFound(ZoneId),

    #[error("Element {0} not found")]
    ElementNotFound(ElementId),

    #[error("No element selected for the incident")]
    NoIncidentTarget,

    #[error("Element type {element_type_id} requires a tree type")]
    MissingTreeType { element_type_id: ElementTypeId },

    #[error("Element type not selected or unknown")]
    UnknownElementType,

    #[error("Cannot {action} while {from}")]
    InvalidTransition { from: &'static str, action: &'static str },

    #[error(transparent)]
    Map(#[from] MapError),

    #[error(transparent)]
    Api(#[from] ClientError),
}

impl WorkflowError {
    /// Shared error code for this failure
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::NotEditor => ErrorCode::EditorRequired,
            Self::NoTargetZone | Self::OutsideZone => ErrorCode::PointOutsideZone,
            Self::ZoneNotFound(_) => ErrorCode::ZoneNotFound,
            Self::ElementNotFound(_) => ErrorCode::ElementNotFound,
            Self::NoIncidentTarget => ErrorCode::RequiredField,
            Self::MissingTreeType { .. } => ErrorCode::ElementTreeTypeRequired,
            Self::UnknownElementType => ErrorCode::ElementTypeNotFound,
            Self::InvalidTransition { .. } => ErrorCode::InvalidRequest,
            Self::Map(_) => ErrorCode::InternalError,
            Self::Api(e) => e.error_code().unwrap_or(ErrorCode::NetworkError),
        }
    }

    /// Message suitable for a toast
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}

pub type MapResult<T> = Result<T, MapError>;
pub type WorkflowResult<T> = Result<T, WorkflowError>;
