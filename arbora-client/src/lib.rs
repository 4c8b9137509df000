//! Arbora Client - HTTP client for the inventory backend
//!
//! Provides the bearer-token REST client and the typed [`ForestApi`] used by
//! the map core to read and persist zones, points, elements and incidences.

pub mod api;
pub mod config;
pub mod error;
pub mod http;

pub use api::{ForestApi, paths};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::HttpClient;
