//! Shared types for Arbora
//!
//! Domain models, geometry value types and the unified error system used by
//! the REST client, the map core and the mock backend.

pub mod error;
pub mod geometry;
pub mod models;
pub mod notification;
pub mod types;

// Re-exports
pub use geometry::{LngLat, Ring};
pub use serde::{Deserialize, Serialize};

pub use error::{ApiErrorBody, AppError, AppResult, ErrorCode};
pub use notification::{NotificationLevel, Toast};
