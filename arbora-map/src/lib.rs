//! Arbora Map - interactive map core
//!
//! Coordinates a map renderer, a polygon drawing tool and element markers
//! for the zone/element editing page. The renderer itself sits behind the
//! [`MapRenderer`] seam; [`headless`] provides an in-memory one.
//!
//! # Modules
//!
//! - [`session`] - renderer lifecycle and the style-load gate
//! - [`draw`] - drawing controller (ring validation)
//! - [`markers`] - element markers
//! - [`popup`] - element detail view
//! - [`zones`] - zone fill/outline layers
//! - [`workflow`] - page state machine
//!
//! # Example
//!
//! ```ignore
//! let config = MapConfig::from_env();
//! let api = ClientConfig::new("http://localhost:3900").build_http_client()?;
//! let mut page = MapPage::<HeadlessRenderer, _, _>::mount(
//!     MapContainer::new("map", 1280, 720),
//!     config,
//!     api,
//!     ToastQueue::new(),
//!     UserRole::Manager,
//! )?;
//! page.load().await?;
//! page.style_loaded();
//! ```

pub mod config;
pub mod draw;
pub mod error;
pub mod events;
pub mod headless;
pub mod logger;
pub mod markers;
pub mod notify;
pub mod popup;
pub mod renderer;
pub mod session;
pub mod store;
pub mod workflow;
pub mod zones;

// Re-exports
pub use config::MapConfig;
pub use draw::DrawingController;
pub use error::{MapError, MapResult, WorkflowError, WorkflowResult};
pub use events::{EventEmitter, PageEvent, PageEvents};
pub use markers::{MarkerBindings, MarkerManager, RenderReport};
pub use notify::{Notifier, ToastQueue};
pub use popup::{PopupAction, PopupView, render_popup};
pub use renderer::{
    ControlPosition, DrawEvent, DrawTool, DrawToolOptions, LayerKind, LayerSpec, MapContainer, MapControl,
    MapOptions, MapRenderer, MarkerSpec,
};
pub use session::MapSession;
pub use store::EntityStore;
pub use workflow::{ElementForm, IncidenceForm, MapPage, PageState, ZoneForm};
