//! Headless renderer
//!
//! In-memory [`MapRenderer`] / [`DrawTool`] pair that records every call.
//! Used by tests and by hosts that run the workflow without a display.
//! [`HeadlessProbe`] shares the renderer's state so it stays readable after
//! the session has released the renderer.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use geojson::{Feature, FeatureCollection, GeoJson, Geometry, Value, feature::Id};
use shared::LngLat;

use crate::error::{MapError, MapResult};
use crate::popup::PopupView;
use crate::renderer::{
    ControlPosition, DrawTool, DrawToolOptions, LayerSpec, MapContainer, MapControl, MapOptions,
    MapRenderer, MarkerSpec,
};

// ========== Draw tool ==========

#[derive(Debug, Default)]
struct DrawState {
    features: Vec<Feature>,
    deleted: Vec<String>,
    next_id: u64,
}

/// Drawing tool whose features are pushed by the caller
#[derive(Debug, Clone, Default)]
pub struct HeadlessDrawTool {
    state: Rc<RefCell<DrawState>>,
}

impl HeadlessDrawTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a feature as if the user had drawn it; returns its id
    pub fn push_feature(&self, mut feature: Feature) -> String {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let id = format!("draw-{}", state.next_id);
        if feature.id.is_none() {
            feature.id = Some(Id::String(id.clone()));
        }
        let id = match &feature.id {
            Some(Id::String(s)) => s.clone(),
            Some(Id::Number(n)) => n.to_string(),
            None => id,
        };
        state.features.push(feature);
        id
    }

    /// Polygon with `vertices` as its outer ring, kept exactly as given
    pub fn draw_polygon(&self, vertices: &[[f64; 2]]) -> String {
        let ring = vertices.iter().map(|[lng, lat]| vec![*lng, *lat]).collect();
        self.push_feature(feature(Value::Polygon(vec![ring])))
    }

    pub fn draw_line(&self, vertices: &[[f64; 2]]) -> String {
        let line = vertices.iter().map(|[lng, lat]| vec![*lng, *lat]).collect();
        self.push_feature(feature(Value::LineString(line)))
    }

    /// Replace the geometry of an existing feature (vertex drag)
    pub fn update_polygon(&self, feature_id: &str, vertices: &[[f64; 2]]) -> bool {
        let ring = vertices.iter().map(|[lng, lat]| vec![*lng, *lat]).collect();
        let mut state = self.state.borrow_mut();
        match state.features.iter_mut().find(|f| id_matches(f, feature_id)) {
            Some(f) => {
                f.geometry = Some(Geometry::new(Value::Polygon(vec![ring])));
                true
            }
            None => false,
        }
    }

    pub fn feature_count(&self) -> usize {
        self.state.borrow().features.len()
    }

    /// Ids removed through [`DrawTool::delete`]
    pub fn deleted_ids(&self) -> Vec<String> {
        self.state.borrow().deleted.clone()
    }
}

fn feature(value: Value) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(value)),
        id: None,
        properties: None,
        foreign_members: None,
    }
}

fn id_matches(feature: &Feature, id: &str) -> bool {
    match &feature.id {
        Some(Id::String(s)) => s == id,
        Some(Id::Number(n)) => n.to_string() == id,
        None => false,
    }
}

impl DrawTool for HeadlessDrawTool {
    fn get_all(&self) -> FeatureCollection {
        FeatureCollection {
            bbox: None,
            features: self.state.borrow().features.clone(),
            foreign_members: None,
        }
    }

    fn delete(&mut self, feature_id: &str) {
        let mut state = self.state.borrow_mut();
        state.features.retain(|f| !id_matches(f, feature_id));
        state.deleted.push(feature_id.to_string());
    }

    fn delete_all(&mut self) {
        self.state.borrow_mut().features.clear();
    }
}

// ========== Renderer ==========

#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessMarker {
    pub spec: MarkerSpec,
    pub visible: bool,
}

#[derive(Debug)]
struct HeadlessState {
    container: MapContainer,
    options: MapOptions,
    style_loaded: bool,
    controls: Vec<(MapControl, ControlPosition)>,
    sources: BTreeMap<String, GeoJson>,
    layers: Vec<LayerSpec>,
    markers: BTreeMap<u64, HeadlessMarker>,
    next_marker: u64,
    popup: Option<(LngLat, PopupView)>,
    fly_to_calls: Vec<(LngLat, f64)>,
    resize_count: usize,
    draw: HeadlessDrawTool,
    draw_options: Option<DrawToolOptions>,
    removed: bool,
}

/// Opaque marker handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkerHandle(u64);

#[derive(Debug)]
pub struct HeadlessRenderer {
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessRenderer {
    pub fn probe(&self) -> HeadlessProbe {
        HeadlessProbe {
            state: self.state.clone(),
        }
    }

    fn ensure_style(&self) -> MapResult<()> {
        if self.state.borrow().style_loaded {
            Ok(())
        } else {
            Err(MapError::StyleNotLoaded)
        }
    }
}

impl MapRenderer for HeadlessRenderer {
    type Draw = HeadlessDrawTool;
    type Marker = MarkerHandle;

    fn create(container: &MapContainer, options: &MapOptions) -> MapResult<Self> {
        Ok(Self {
            state: Rc::new(RefCell::new(HeadlessState {
                container: container.clone(),
                options: options.clone(),
                style_loaded: false,
                controls: Vec::new(),
                sources: BTreeMap::new(),
                layers: Vec::new(),
                markers: BTreeMap::new(),
                next_marker: 0,
                popup: None,
                fly_to_calls: Vec::new(),
                resize_count: 0,
                draw: HeadlessDrawTool::new(),
                draw_options: None,
                removed: false,
            })),
        })
    }

    fn is_style_loaded(&self) -> bool {
        self.state.borrow().style_loaded
    }

    fn add_control(&mut self, control: MapControl, position: ControlPosition) {
        self.state.borrow_mut().controls.push((control, position));
    }

    fn attach_draw_tool(&mut self, options: DrawToolOptions) -> HeadlessDrawTool {
        let mut state = self.state.borrow_mut();
        state.draw_options = Some(options);
        state.draw.clone()
    }

    fn detach_draw_tool(&mut self, mut tool: HeadlessDrawTool) {
        tool.delete_all();
        self.state.borrow_mut().draw_options = None;
    }

    fn has_source(&self, id: &str) -> bool {
        self.state.borrow().sources.contains_key(id)
    }

    fn has_layer(&self, id: &str) -> bool {
        self.state.borrow().layers.iter().any(|l| l.id == id)
    }

    fn source_ids(&self) -> Vec<String> {
        self.state.borrow().sources.keys().cloned().collect()
    }

    fn layer_ids(&self) -> Vec<String> {
        self.state.borrow().layers.iter().map(|l| l.id.clone()).collect()
    }

    fn add_source(&mut self, id: &str, data: GeoJson) -> MapResult<()> {
        self.ensure_style()?;
        let mut state = self.state.borrow_mut();
        if state.sources.contains_key(id) {
            return Err(MapError::SourceExists(id.to_string()));
        }
        state.sources.insert(id.to_string(), data);
        Ok(())
    }

    fn add_layer(&mut self, layer: LayerSpec) -> MapResult<()> {
        self.ensure_style()?;
        let mut state = self.state.borrow_mut();
        if state.layers.iter().any(|l| l.id == layer.id) {
            return Err(MapError::LayerExists(layer.id));
        }
        if !state.sources.contains_key(&layer.source) {
            return Err(MapError::SourceNotFound(layer.source));
        }
        state.layers.push(layer);
        Ok(())
    }

    fn remove_layer(&mut self, id: &str) -> MapResult<()> {
        let mut state = self.state.borrow_mut();
        let before = state.layers.len();
        state.layers.retain(|l| l.id != id);
        if state.layers.len() == before {
            return Err(MapError::LayerNotFound(id.to_string()));
        }
        Ok(())
    }

    fn remove_source(&mut self, id: &str) -> MapResult<()> {
        let mut state = self.state.borrow_mut();
        if state.layers.iter().any(|l| l.source == id) {
            return Err(MapError::SourceExists(id.to_string()));
        }
        state
            .sources
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| MapError::SourceNotFound(id.to_string()))
    }

    fn set_layer_visibility(&mut self, id: &str, visible: bool) -> MapResult<()> {
        let mut state = self.state.borrow_mut();
        let layer = state
            .layers
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| MapError::LayerNotFound(id.to_string()))?;
        layer.visible = visible;
        Ok(())
    }

    fn fly_to(&mut self, center: LngLat, zoom: f64) {
        self.state.borrow_mut().fly_to_calls.push((center, zoom));
    }

    fn resize(&mut self) {
        self.state.borrow_mut().resize_count += 1;
    }

    fn add_marker(&mut self, spec: &MarkerSpec) -> MarkerHandle {
        let mut state = self.state.borrow_mut();
        state.next_marker += 1;
        let handle = state.next_marker;
        state.markers.insert(
            handle,
            HeadlessMarker {
                spec: spec.clone(),
                visible: true,
            },
        );
        MarkerHandle(handle)
    }

    fn remove_marker(&mut self, marker: MarkerHandle) {
        self.state.borrow_mut().markers.remove(&marker.0);
    }

    fn set_marker_visible(&mut self, marker: &MarkerHandle, visible: bool) {
        if let Some(m) = self.state.borrow_mut().markers.get_mut(&marker.0) {
            m.visible = visible;
        }
    }

    fn show_popup(&mut self, at: LngLat, content: &PopupView) {
        self.state.borrow_mut().popup = Some((at, content.clone()));
    }

    fn close_popup(&mut self) {
        self.state.borrow_mut().popup = None;
    }

    fn remove(&mut self) {
        let mut state = self.state.borrow_mut();
        state.markers.clear();
        state.layers.clear();
        state.sources.clear();
        state.popup = None;
        state.draw_options = None;
        state.removed = true;
    }
}

// ========== Probe ==========

/// Read side of a [`HeadlessRenderer`]
#[derive(Debug, Clone)]
pub struct HeadlessProbe {
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessProbe {
    /// Simulate the style finishing (or not) loading
    pub fn set_style_loaded(&self, loaded: bool) {
        self.state.borrow_mut().style_loaded = loaded;
    }

    pub fn container(&self) -> MapContainer {
        self.state.borrow().container.clone()
    }

    pub fn options(&self) -> MapOptions {
        self.state.borrow().options.clone()
    }

    pub fn controls(&self) -> Vec<(MapControl, ControlPosition)> {
        self.state.borrow().controls.clone()
    }

    pub fn source_ids(&self) -> Vec<String> {
        self.state.borrow().sources.keys().cloned().collect()
    }

    pub fn source(&self, id: &str) -> Option<GeoJson> {
        self.state.borrow().sources.get(id).cloned()
    }

    pub fn layer_ids(&self) -> Vec<String> {
        self.state.borrow().layers.iter().map(|l| l.id.clone()).collect()
    }

    pub fn layer(&self, id: &str) -> Option<LayerSpec> {
        self.state.borrow().layers.iter().find(|l| l.id == id).cloned()
    }

    pub fn markers(&self) -> Vec<HeadlessMarker> {
        self.state.borrow().markers.values().cloned().collect()
    }

    pub fn marker_count(&self) -> usize {
        self.state.borrow().markers.len()
    }

    pub fn visible_marker_count(&self) -> usize {
        self.state.borrow().markers.values().filter(|m| m.visible).count()
    }

    pub fn popup(&self) -> Option<(LngLat, PopupView)> {
        self.state.borrow().popup.clone()
    }

    pub fn fly_to_calls(&self) -> Vec<(LngLat, f64)> {
        self.state.borrow().fly_to_calls.clone()
    }

    pub fn resize_count(&self) -> usize {
        self.state.borrow().resize_count
    }

    /// The drawing tool handed out by `attach_draw_tool`
    pub fn draw_tool(&self) -> HeadlessDrawTool {
        self.state.borrow().draw.clone()
    }

    pub fn draw_options(&self) -> Option<DrawToolOptions> {
        self.state.borrow().draw_options
    }

    pub fn is_removed(&self) -> bool {
        self.state.borrow().removed
    }
}
