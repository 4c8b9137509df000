//! Unified error system for Arbora
//!
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`ErrorCategory`]: Classification of errors by domain
//! - [`AppError`]: Rich error type with codes, messages, and details
//! - [`ApiErrorBody`]: JSON body the backend returns for failed requests
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 4xxx: Zone errors
//! - 5xxx: Point / element errors
//! - 6xxx: Incidence errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode, ApiErrorBody};
//!
//! let err = AppError::not_found("Zone 7");
//! assert_eq!(err.code, ErrorCode::NotFound);
//!
//! let err = AppError::validation("Ring needs three vertices")
//!     .with_detail("field", "coordinates");
//!
//! let body = ApiErrorBody::from(&err);
//! assert_eq!(body.code, 2);
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiErrorBody, AppError, AppResult};
