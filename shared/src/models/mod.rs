//! Data models
//!
//! Shared between the REST client, the map core and the mock backend.
//! All IDs are `i64`.

pub mod element;
pub mod element_type;
pub mod incidence;
pub mod point;
pub mod tree_type;
pub mod zone;

// Re-exports
pub use element::*;
pub use element_type::*;
pub use incidence::*;
pub use point::*;
pub use tree_type::*;
pub use zone::*;
