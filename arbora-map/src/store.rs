//! Client-side entity cache
//!
//! Mirrors the backend collections the map page works with, keyed by id.
//! Written only after a successful fetch or mutation.

use std::collections::BTreeMap;

use shared::models::{Element, ElementType, Incidence, Point, TreeType, Zone};
use shared::types::{ElementId, ElementTypeId, IncidenceId, PointId, TreeTypeId, ZoneId};

#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    zones: BTreeMap<ZoneId, Zone>,
    points: BTreeMap<PointId, Point>,
    elements: BTreeMap<ElementId, Element>,
    element_types: BTreeMap<ElementTypeId, ElementType>,
    tree_types: BTreeMap<TreeTypeId, TreeType>,
    incidences: BTreeMap<IncidenceId, Incidence>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Replace ==========

    pub fn replace_zones(&mut self, zones: Vec<Zone>) {
        self.zones = zones.into_iter().map(|z| (z.id, z)).collect();
    }

    pub fn replace_points(&mut self, points: Vec<Point>) {
        self.points = points.into_iter().map(|p| (p.id, p)).collect();
    }

    pub fn replace_elements(&mut self, elements: Vec<Element>) {
        self.elements = elements.into_iter().map(|e| (e.id, e)).collect();
    }

    pub fn replace_element_types(&mut self, types: Vec<ElementType>) {
        self.element_types = types.into_iter().map(|t| (t.id, t)).collect();
    }

    pub fn replace_tree_types(&mut self, types: Vec<TreeType>) {
        self.tree_types = types.into_iter().map(|t| (t.id, t)).collect();
    }

    pub fn replace_incidences(&mut self, incidences: Vec<Incidence>) {
        self.incidences = incidences.into_iter().map(|i| (i.id, i)).collect();
    }

    // ========== Upsert ==========

    pub fn upsert_zone(&mut self, zone: Zone) {
        self.zones.insert(zone.id, zone);
    }

    pub fn upsert_point(&mut self, point: Point) {
        self.points.insert(point.id, point);
    }

    pub fn upsert_element(&mut self, element: Element) {
        self.elements.insert(element.id, element);
    }

    pub fn upsert_incidence(&mut self, incidence: Incidence) {
        self.incidences.insert(incidence.id, incidence);
    }

    // ========== Remove ==========

    /// Drops the zone together with its points and their elements
    pub fn remove_zone(&mut self, zone_id: ZoneId) -> Option<Zone> {
        let zone = self.zones.remove(&zone_id)?;
        let point_ids: Vec<PointId> = self
            .points
            .values()
            .filter(|p| p.zone_id == zone_id)
            .map(|p| p.id)
            .collect();
        for point_id in &point_ids {
            self.points.remove(point_id);
        }
        let element_ids: Vec<ElementId> = self
            .elements
            .values()
            .filter(|e| point_ids.contains(&e.point_id))
            .map(|e| e.id)
            .collect();
        for element_id in element_ids {
            self.remove_element(element_id);
        }
        Some(zone)
    }

    /// Drops the element and its incidences
    pub fn remove_element(&mut self, element_id: ElementId) -> Option<Element> {
        let element = self.elements.remove(&element_id)?;
        self.incidences.retain(|_, i| i.element_id != element_id);
        Some(element)
    }

    // ========== Read ==========

    pub fn zone(&self, id: ZoneId) -> Option<&Zone> {
        self.zones.get(&id)
    }

    pub fn point(&self, id: PointId) -> Option<&Point> {
        self.points.get(&id)
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    pub fn element_type(&self, id: ElementTypeId) -> Option<&ElementType> {
        self.element_types.get(&id)
    }

    pub fn zones(&self) -> Vec<Zone> {
        self.zones.values().cloned().collect()
    }

    pub fn points(&self) -> Vec<Point> {
        self.points.values().cloned().collect()
    }

    pub fn elements(&self) -> Vec<Element> {
        self.elements.values().cloned().collect()
    }

    pub fn element_types(&self) -> Vec<ElementType> {
        self.element_types.values().cloned().collect()
    }

    pub fn tree_types(&self) -> Vec<TreeType> {
        self.tree_types.values().cloned().collect()
    }

    pub fn incidences(&self) -> Vec<Incidence> {
        self.incidences.values().cloned().collect()
    }

    /// Zone owning the element's anchor point
    pub fn zone_of_element(&self, element_id: ElementId) -> Option<ZoneId> {
        let element = self.elements.get(&element_id)?;
        self.points.get(&element.point_id).map(|p| p.zone_id)
    }

    pub fn elements_in_zone(&self, zone_id: ZoneId) -> Vec<&Element> {
        self.elements
            .values()
            .filter(|e| self.points.get(&e.point_id).is_some_and(|p| p.zone_id == zone_id))
            .collect()
    }

    pub fn incidences_for(&self, element_id: ElementId) -> Vec<&Incidence> {
        self.incidences.values().filter(|i| i.element_id == element_id).collect()
    }
}
