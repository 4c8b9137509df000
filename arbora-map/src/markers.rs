//! Marker/Overlay Manager
//!
//! One marker per element whose anchor point resolves. Rendering is always
//! a full clear-and-rebuild; single markers can be removed or hidden
//! afterwards without touching the rest.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use shared::LngLat;
use shared::models::{Element, ElementType, Point, TreeType};
use shared::types::{ElementId, PointId, ZoneId};

use crate::popup::{ElementCallback, PopupView, render_popup};
use crate::renderer::{MapRenderer, MarkerSpec};
use crate::session::MapSession;

/// Invoked with the clicked element
pub type ClickCallback = Arc<dyn Fn(&Element) + Send + Sync>;

/// Callbacks wired into every marker and its popup
#[derive(Clone, Default)]
pub struct MarkerBindings {
    pub on_click: Option<ClickCallback>,
    pub on_delete: Option<ElementCallback>,
    pub on_add_incident: Option<ElementCallback>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderReport {
    pub rendered: usize,
    /// Elements whose anchor point was not found
    pub skipped: usize,
}

struct MarkerEntry<M> {
    handle: M,
    element: Element,
    zone_id: ZoneId,
    position: LngLat,
    visible: bool,
}

pub struct MarkerManager<M> {
    entries: BTreeMap<ElementId, MarkerEntry<M>>,
    tree_types: Vec<TreeType>,
    element_types: Vec<ElementType>,
    bindings: MarkerBindings,
    default_color: String,
}

impl<M> MarkerManager<M> {
    pub fn new(default_color: impl Into<String>) -> Self {
        Self {
            entries: BTreeMap::new(),
            tree_types: Vec::new(),
            element_types: Vec::new(),
            bindings: MarkerBindings::default(),
            default_color: default_color.into(),
        }
    }

    /// Replace every marker with one per resolvable element
    pub fn render_elements<R>(
        &mut self,
        session: &mut MapSession<R>,
        elements: &[Element],
        points: &[Point],
        tree_types: &[TreeType],
        element_types: &[ElementType],
        bindings: MarkerBindings,
    ) -> RenderReport
    where
        R: MapRenderer<Marker = M>,
    {
        self.clear(session);
        self.tree_types = tree_types.to_vec();
        self.element_types = element_types.to_vec();
        self.bindings = bindings;

        let Ok(renderer) = session.renderer_mut() else {
            tracing::debug!("Map session destroyed, markers not rendered");
            return RenderReport::default();
        };

        let anchors: HashMap<PointId, &Point> = points
            .iter()
            .filter(|p| p.is_element_anchor())
            .map(|p| (p.id, p))
            .collect();

        let mut report = RenderReport::default();
        for element in elements {
            let Some(point) = anchors.get(&element.point_id) else {
                tracing::warn!(
                    element_id = element.id,
                    point_id = element.point_id,
                    "Element anchor point not found, marker skipped"
                );
                report.skipped += 1;
                continue;
            };

            let element_type = self.element_types.iter().find(|t| t.id == element.element_type_id);
            let spec = MarkerSpec {
                element_id: element.id,
                zone_id: point.zone_id,
                position: point.coord(),
                color: element_type
                    .and_then(|t| t.color.clone())
                    .unwrap_or_else(|| self.default_color.clone()),
                icon: element_type.and_then(|t| t.icon.clone()),
            };

            // 同一元素只保留一个标记
            if let Some(previous) = self.entries.remove(&element.id) {
                renderer.remove_marker(previous.handle);
                report.rendered -= 1;
            }

            let handle = renderer.add_marker(&spec);
            self.entries.insert(
                element.id,
                MarkerEntry {
                    handle,
                    element: element.clone(),
                    zone_id: spec.zone_id,
                    position: spec.position,
                    visible: true,
                },
            );
            report.rendered += 1;
        }

        tracing::debug!(rendered = report.rendered, skipped = report.skipped, "Markers rendered");
        report
    }

    /// Remove one marker; `false` when it does not exist
    pub fn remove_one<R>(&mut self, session: &mut MapSession<R>, element_id: ElementId) -> bool
    where
        R: MapRenderer<Marker = M>,
    {
        let Some(entry) = self.entries.remove(&element_id) else {
            return false;
        };
        match session.renderer_mut() {
            Ok(renderer) => renderer.remove_marker(entry.handle),
            Err(_) => tracing::debug!(element_id, "Map session destroyed, marker dropped"),
        }
        true
    }

    /// Show or hide one marker without destroying it
    pub fn set_visible<R>(&mut self, session: &mut MapSession<R>, element_id: ElementId, visible: bool) -> bool
    where
        R: MapRenderer<Marker = M>,
    {
        let Ok(renderer) = session.renderer_mut() else {
            tracing::debug!(element_id, "Map session destroyed, visibility ignored");
            return false;
        };
        match self.entries.get_mut(&element_id) {
            Some(entry) => {
                renderer.set_marker_visible(&entry.handle, visible);
                entry.visible = visible;
                true
            }
            None => false,
        }
    }

    /// Apply [`Self::set_visible`] to every marker anchored in `zone_id`
    pub fn set_zone_visible<R>(&mut self, session: &mut MapSession<R>, zone_id: ZoneId, visible: bool) -> usize
    where
        R: MapRenderer<Marker = M>,
    {
        let ids = self.ids_in_zone(zone_id);
        ids.into_iter()
            .filter(|id| self.set_visible(session, *id, visible))
            .count()
    }

    /// Remove every marker anchored in `zone_id`
    pub fn remove_zone<R>(&mut self, session: &mut MapSession<R>, zone_id: ZoneId) -> usize
    where
        R: MapRenderer<Marker = M>,
    {
        let ids = self.ids_in_zone(zone_id);
        ids.into_iter().filter(|id| self.remove_one(session, *id)).count()
    }

    /// Remove all markers and forget their handles
    pub fn clear<R>(&mut self, session: &mut MapSession<R>)
    where
        R: MapRenderer<Marker = M>,
    {
        let entries = std::mem::take(&mut self.entries);
        match session.renderer_mut() {
            Ok(renderer) => {
                for entry in entries.into_values() {
                    renderer.remove_marker(entry.handle);
                }
            }
            Err(_) if !entries.is_empty() => {
                tracing::debug!(count = entries.len(), "Map session destroyed, markers dropped");
            }
            Err(_) => {}
        }
    }

    /// Host hook for a marker click: runs `on_click` and opens the popup
    pub fn dispatch_click<R>(&mut self, session: &mut MapSession<R>, element_id: ElementId) -> Option<PopupView>
    where
        R: MapRenderer<Marker = M>,
    {
        let entry = self.entries.get(&element_id)?;
        let Ok(renderer) = session.renderer_mut() else {
            tracing::debug!(element_id, "Map session destroyed, click ignored");
            return None;
        };

        if let Some(on_click) = &self.bindings.on_click {
            on_click(&entry.element);
        }
        let view = render_popup(
            &entry.element,
            &self.tree_types,
            &self.element_types,
            self.bindings.on_delete.clone(),
            self.bindings.on_add_incident.clone(),
        );
        renderer.show_popup(entry.position, &view);
        Some(view)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, element_id: ElementId) -> bool {
        self.entries.contains_key(&element_id)
    }

    pub fn is_visible(&self, element_id: ElementId) -> Option<bool> {
        self.entries.get(&element_id).map(|e| e.visible)
    }

    pub fn element_ids(&self) -> Vec<ElementId> {
        self.entries.keys().copied().collect()
    }

    pub fn handle(&self, element_id: ElementId) -> Option<&M> {
        self.entries.get(&element_id).map(|e| &e.handle)
    }

    fn ids_in_zone(&self, zone_id: ZoneId) -> Vec<ElementId> {
        self.entries
            .iter()
            .filter(|(_, e)| e.zone_id == zone_id)
            .map(|(id, _)| *id)
            .collect()
    }
}
