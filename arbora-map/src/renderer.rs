//! Renderer seam
//!
//! The map core never talks to a concrete mapping library. A host (web
//! binding, native view, headless) implements [`MapRenderer`] and
//! [`DrawTool`] and forwards the library's events back into the core:
//!
//! ```text
//!  host event                      core hook
//!  ───────────────────────────     ─────────────────────────────────
//!  style "load"                 ─▶ MapSession::notify_style_loaded
//!  draw.create/update/delete    ─▶ DrawingController::handle_event
//!  marker click                 ─▶ MarkerManager::dispatch_click
//!  container resized            ─▶ MapSession::set_layout
//! ```

use geojson::{FeatureCollection, GeoJson};
use shared::LngLat;
use shared::types::{ElementId, ZoneId};

use crate::error::MapResult;
use crate::popup::PopupView;

/// DOM node (or native view) the renderer is bound to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapContainer {
    pub id: String,
    pub width: u32,
    pub height: u32,
}

impl MapContainer {
    pub fn new(id: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            id: id.into(),
            width,
            height,
        }
    }

    /// Non-zero layout in both dimensions
    pub fn has_layout(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Renderer construction options
#[derive(Debug, Clone, PartialEq)]
pub struct MapOptions {
    pub access_token: String,
    pub style_url: String,
    pub center: LngLat,
    pub zoom: f64,
}

/// Standard map affordances
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapControl {
    Navigation,
    Scale,
    Fullscreen,
    Geolocate,
    /// Place search bound to the provider token
    Geocoder { access_token: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Layer paint description
#[derive(Debug, Clone, PartialEq)]
pub enum LayerKind {
    Fill { color: String, opacity: f64 },
    Line { color: String, width: f64 },
}

/// Layer bound to a source
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSpec {
    pub id: String,
    pub source: String,
    pub kind: LayerKind,
    pub visible: bool,
}

/// Point marker for one element
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    pub element_id: ElementId,
    pub zone_id: ZoneId,
    pub position: LngLat,
    pub color: String,
    pub icon: Option<String>,
}

/// Which drawing affordances the tool shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawToolOptions {
    pub polygon: bool,
    pub trash: bool,
    pub point: bool,
    pub line: bool,
}

impl DrawToolOptions {
    /// "draw polygon" and "trash" only
    pub const fn polygon_only() -> Self {
        Self {
            polygon: true,
            trash: true,
            point: false,
            line: false,
        }
    }
}

/// Drawing-tool change notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawEvent {
    Create,
    Update,
    Delete,
}

/// Polygon drawing plugin
pub trait DrawTool {
    /// Every feature currently drawn, in drawing order
    fn get_all(&self) -> FeatureCollection;
    /// Remove one feature from the tool's internal state
    fn delete(&mut self, feature_id: &str);
    /// Remove every drawn feature, keeping the tool attached
    fn delete_all(&mut self);
}

/// Map renderer bound to a container
///
/// Source and layer mutations are only valid once the style has loaded;
/// removing an id that does not exist is an error.
pub trait MapRenderer: Sized {
    type Draw: DrawTool;
    type Marker;

    fn create(container: &MapContainer, options: &MapOptions) -> MapResult<Self>;

    fn is_style_loaded(&self) -> bool;

    fn add_control(&mut self, control: MapControl, position: ControlPosition);

    fn attach_draw_tool(&mut self, options: DrawToolOptions) -> Self::Draw;
    fn detach_draw_tool(&mut self, tool: Self::Draw);

    fn has_source(&self, id: &str) -> bool;
    fn has_layer(&self, id: &str) -> bool;
    fn source_ids(&self) -> Vec<String>;
    fn layer_ids(&self) -> Vec<String>;
    fn add_source(&mut self, id: &str, data: GeoJson) -> MapResult<()>;
    fn add_layer(&mut self, layer: LayerSpec) -> MapResult<()>;
    fn remove_layer(&mut self, id: &str) -> MapResult<()>;
    fn remove_source(&mut self, id: &str) -> MapResult<()>;
    fn set_layer_visibility(&mut self, id: &str, visible: bool) -> MapResult<()>;

    /// Animated viewport transition
    fn fly_to(&mut self, center: LngLat, zoom: f64);
    /// Re-measure the container
    fn resize(&mut self);

    fn add_marker(&mut self, spec: &MarkerSpec) -> Self::Marker;
    fn remove_marker(&mut self, marker: Self::Marker);
    fn set_marker_visible(&mut self, marker: &Self::Marker, visible: bool);

    fn show_popup(&mut self, at: LngLat, content: &PopupView);
    fn close_popup(&mut self);

    /// Release the renderer and all of its controls
    fn remove(&mut self);
}
