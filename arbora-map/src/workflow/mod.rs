//! Zone/Element Workflow Orchestrator
//!
//! `MapPage` owns everything the map page touches and sequences the two
//! editing tracks:
//!
//! ```text
//! Idle ─▶ ZoneSelected ─▶ DrawingZone ⇄ RingValidated ─▶ SavingZone ─▶ Idle
//!   │                                                     (failure ─▶ RingValidated)
//!   └──▶ CreatingElement(zone) ─▶ PlacingPoint ─▶ SavingElement ─▶ Idle
//!                                 (point failure ─▶ PlacingPoint)
//! ```
//!
//! Host hooks: [`MapPage::style_loaded`], [`MapPage::handle_draw_event`],
//! [`MapPage::handle_marker_click`], [`MapPage::place_element_at`] (map
//! click) and [`MapPage::resize`]. Callbacks given to the map never borrow
//! the page; they post [`PageEvent`]s that [`MapPage::process_events`]
//! applies.

mod forms;
mod state;

pub use forms::{ElementForm, IncidenceForm, ZoneForm, validate_element_form};
pub use state::PageState;

use std::collections::BTreeSet;
use std::sync::Arc;

use arbora_client::ForestApi;
use shared::models::{
    Element, ElementCreate, Incidence, IncidenceCreate, IncidenceStatus, PointCreate, Zone, ZoneCreate,
};
use shared::types::{ElementId, UserRole, ZoneId};
use shared::{LngLat, Ring, Toast};

use crate::config::MapConfig;
use crate::draw::DrawingController;
use crate::error::{MapResult, WorkflowError, WorkflowResult};
use crate::events::{PageEvent, PageEvents};
use crate::markers::{MarkerBindings, MarkerManager, RenderReport};
use crate::notify::Notifier;
use crate::popup::{ElementCallback, PopupView};
use crate::renderer::{DrawEvent, MapContainer, MapRenderer};
use crate::session::MapSession;
use crate::store::EntityStore;
use crate::zones;

pub struct MapPage<R, A, N>
where
    R: MapRenderer,
    A: ForestApi,
    N: Notifier,
{
    session: MapSession<R>,
    drawing: DrawingController<R::Draw>,
    markers: MarkerManager<R::Marker>,
    store: EntityStore,
    events: PageEvents,
    api: A,
    notifier: N,
    config: MapConfig,
    role: UserRole,
    state: PageState,
    hidden_zones: BTreeSet<ZoneId>,
    /// Marker render deferred until the style loads
    markers_pending: bool,
    incident_target: Option<ElementId>,
}

impl<R, A, N> MapPage<R, A, N>
where
    R: MapRenderer,
    A: ForestApi,
    N: Notifier,
{
    pub fn new(session: MapSession<R>, api: A, notifier: N, config: MapConfig, role: UserRole) -> Self {
        let markers = MarkerManager::new(config.default_marker_color.clone());
        Self {
            session,
            drawing: DrawingController::new(),
            markers,
            store: EntityStore::new(),
            events: PageEvents::new(),
            api,
            notifier,
            config,
            role,
            state: PageState::Idle,
            hidden_zones: BTreeSet::new(),
            markers_pending: false,
            incident_target: None,
        }
    }

    /// Create the session on `container` with the standard controls
    pub fn mount(container: MapContainer, config: MapConfig, api: A, notifier: N, role: UserRole) -> MapResult<Self> {
        let mut session = MapSession::create(container, &config)?;
        session.add_basic_controls()?;
        session.add_geocoder()?;
        tracing::info!(%role, "Map page mounted");
        Ok(Self::new(session, api, notifier, config, role))
    }

    // ========== Accessors ==========

    pub fn state(&self) -> &PageState {
        &self.state
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn session(&self) -> &MapSession<R> {
        &self.session
    }

    pub fn markers(&self) -> &MarkerManager<R::Marker> {
        &self.markers
    }

    pub fn drawing(&self) -> &DrawingController<R::Draw> {
        &self.drawing
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn role(&self) -> UserRole {
        self.role
    }

    pub fn is_editor(&self) -> bool {
        self.role.can_edit_map()
    }

    pub fn is_mounted(&self) -> bool {
        !self.session.is_disposed()
    }

    pub fn is_zone_hidden(&self, zone_id: ZoneId) -> bool {
        self.hidden_zones.contains(&zone_id)
    }

    pub fn incident_target(&self) -> Option<ElementId> {
        self.incident_target
    }

    // ========== Loading ==========

    /// Fetch every collection, then draw zones and markers once the style allows
    pub async fn load(&mut self) -> WorkflowResult<()> {
        let api = &self.api;
        let fetched = tokio::try_join!(
            api.list_zones(),
            api.list_points(),
            api.list_elements(),
            api.list_element_types(),
            api.list_tree_types(),
            api.list_incidences(),
        );
        let (zones, points, elements, element_types, tree_types, incidences) = match fetched {
            Ok(lists) => lists,
            Err(e) => return self.fail("Failed to load map data", e.into()),
        };

        tracing::info!(
            zones = zones.len(),
            points = points.len(),
            elements = elements.len(),
            "Map data loaded"
        );
        self.store.replace_zones(zones);
        self.store.replace_points(points);
        self.store.replace_elements(elements);
        self.store.replace_element_types(element_types);
        self.store.replace_tree_types(tree_types);
        self.store.replace_incidences(incidences);

        if let Err(e) = self.render_zones() {
            return self.fail("Failed to draw zones", e.into());
        }
        self.render_markers();
        Ok(())
    }

    /// Host hook for the renderer's style "load" event
    pub fn style_loaded(&mut self) {
        self.session.notify_style_loaded();
        self.apply_hidden_zones();
        if self.markers_pending {
            self.render_markers();
        }
    }

    // ========== Host hooks ==========

    /// Forward a drawing-tool event; the ring arrives through `process_events`
    pub fn handle_draw_event(&mut self, event: DrawEvent) -> Option<Vec<LngLat>> {
        self.drawing.handle_event(event)
    }

    pub fn handle_marker_click(&mut self, element_id: ElementId) -> Option<PopupView> {
        self.markers.dispatch_click(&mut self.session, element_id)
    }

    /// Apply every queued page event; returns how many were handled
    pub async fn process_events(&mut self) -> usize {
        let events = self.events.drain();
        let count = events.len();
        for event in events {
            match event {
                PageEvent::RingUpdated(vertices) => self.apply_ring(vertices),
                PageEvent::MarkerClicked(element_id) => {
                    tracing::debug!(element_id, "Marker clicked");
                }
                PageEvent::DeleteElementRequested(element_id) => {
                    if let Err(e) = self.delete_element(element_id).await {
                        tracing::debug!(element_id, error = %e, "Delete from popup failed");
                    }
                }
                PageEvent::AddIncidentRequested(element_id) => {
                    if let Err(e) = self.open_incident_form(element_id) {
                        tracing::debug!(element_id, error = %e, "Incident form not opened");
                    }
                }
            }
        }
        count
    }

    /// Container size changed
    pub fn resize(&mut self, width: u32, height: u32) -> WorkflowResult<bool> {
        Ok(self.session.set_layout(width, height)?)
    }

    // ========== Zones ==========

    /// Fly to the zone and drop any in-progress drawing or element creation
    pub fn select_zone(&mut self, zone_id: ZoneId) -> WorkflowResult<()> {
        if self.state.is_saving() {
            return self.fail("Cannot select zone", self.invalid("select a zone"));
        }
        let target = match self.store.zone(zone_id) {
            Some(zone) => zone.representative_coord(),
            None => return self.fail("Cannot select zone", WorkflowError::ZoneNotFound(zone_id)),
        };

        if self.state.is_drawing() {
            self.drawing.disable();
        }
        if let Some(coord) = target
            && let Err(e) = self.session.fly_to(coord, None)
        {
            return self.fail("Cannot select zone", e.into());
        }
        self.transition(PageState::ZoneSelected { zone_id });
        Ok(())
    }

    /// Enable the drawing tool; a previous attempt's shape is cleared
    pub fn start_zone_creation(&mut self) -> WorkflowResult<()> {
        self.require_editor("Cannot draw zone")?;
        match self.state {
            PageState::Idle
            | PageState::ZoneSelected { .. }
            | PageState::DrawingZone
            | PageState::RingValidated { .. } => {}
            _ => return self.fail("Cannot draw zone", self.invalid("start drawing a zone")),
        }

        let emitter = self.events.emitter();
        let enabled = self.drawing.enable(&mut self.session, true, move |ring| {
            emitter.emit(PageEvent::RingUpdated(ring));
        });
        if let Err(e) = enabled {
            return self.fail("Cannot draw zone", e.into());
        }
        self.transition(PageState::DrawingZone);
        Ok(())
    }

    pub fn cancel_drawing(&mut self) -> WorkflowResult<()> {
        match self.state {
            PageState::DrawingZone | PageState::RingValidated { .. } => {
                self.drawing.disable();
                self.transition(PageState::Idle);
                Ok(())
            }
            PageState::SavingZone { .. } => self.fail("Cannot cancel", self.invalid("cancel drawing")),
            _ => Ok(()),
        }
    }

    /// "Save zone" enabled
    pub fn can_save_zone(&self) -> bool {
        self.is_editor() && matches!(self.state, PageState::RingValidated { .. })
    }

    /// Persist the drawn ring; on failure the ring is kept for a retry
    pub async fn save_zone(&mut self, form: ZoneForm) -> WorkflowResult<Zone> {
        self.require_editor("Cannot save zone")?;
        let ring = match &self.state {
            PageState::RingValidated { ring } => ring.clone(),
            _ => return self.fail("Cannot save zone", self.invalid("save a zone")),
        };
        self.transition(PageState::SavingZone { ring: ring.clone() });

        let payload = ZoneCreate {
            name: form.name,
            description: form.description,
            color: form.color,
            contract_id: form.contract_id,
            coordinates: ring.clone(),
        };
        let zone = match self.api.create_zone(&payload).await {
            Ok(zone) => zone,
            Err(e) => {
                self.transition(PageState::RingValidated { ring });
                return self.fail("Failed to save zone", e.into());
            }
        };
        tracing::info!(zone_id = zone.id, name = %zone.name, "Zone created");

        self.drawing.disable();
        match self.api.list_zones().await {
            Ok(zones) => self.store.replace_zones(zones),
            Err(e) => {
                tracing::warn!(error = %e, "Zone list refresh failed, keeping local copy");
                self.store.upsert_zone(zone.clone());
            }
        }
        self.transition(PageState::Idle);
        if let Err(e) = self.render_zones() {
            tracing::warn!(error = %e, "Zones not redrawn");
        }

        self.notifier
            .notify(Toast::success("Zone saved", format!("Zone \"{}\" created", zone.name)));
        Ok(zone)
    }

    /// Delete on the backend, then drop its layers, markers and cached children
    pub async fn delete_zone(&mut self, zone_id: ZoneId) -> WorkflowResult<()> {
        self.require_editor("Cannot delete zone")?;
        if self.state.is_saving() {
            return self.fail("Cannot delete zone", self.invalid("delete a zone"));
        }
        if self.store.zone(zone_id).is_none() {
            return self.fail("Cannot delete zone", WorkflowError::ZoneNotFound(zone_id));
        }
        if let Err(e) = self.api.delete_zone(zone_id).await {
            return self.fail("Failed to delete zone", e.into());
        }
        tracing::info!(zone_id, "Zone deleted");

        let removed_markers = self.markers.remove_zone(&mut self.session, zone_id);
        self.store.remove_zone(zone_id);
        self.hidden_zones.remove(&zone_id);

        if self.session.is_style_loaded() {
            let prefix = self.config.zone_layer_prefix.clone();
            if let Ok(renderer) = self.session.styled_renderer_mut()
                && let Err(e) = zones::remove_zone_layers(renderer, zone_id, &prefix)
            {
                tracing::warn!(zone_id, error = %e, "Zone layers not removed");
            }
        } else if let Err(e) = self.render_zones() {
            tracing::debug!(error = %e, "Zone redraw not queued");
        }

        if self.state.zone_id() == Some(zone_id) {
            self.transition(PageState::Idle);
        }
        tracing::debug!(zone_id, removed_markers, "Zone removed from map");
        self.notifier.notify(Toast::success("Zone deleted", ""));
        Ok(())
    }

    /// Show or hide a zone's layers and markers
    pub fn set_zone_visible(&mut self, zone_id: ZoneId, visible: bool) -> WorkflowResult<()> {
        if self.store.zone(zone_id).is_none() {
            return self.fail("Cannot change zone visibility", WorkflowError::ZoneNotFound(zone_id));
        }
        if visible {
            self.hidden_zones.remove(&zone_id);
        } else {
            self.hidden_zones.insert(zone_id);
        }

        let prefix = self.config.zone_layer_prefix.clone();
        let toggled = match self.session.styled_renderer_mut() {
            Ok(renderer) => zones::set_zone_layers_visible(renderer, zone_id, visible, &prefix).map(|_| ()),
            // 样式未加载时由 style_loaded 统一应用
            Err(_) => Ok(()),
        };
        if let Err(e) = toggled {
            return self.fail("Cannot change zone visibility", e.into());
        }
        self.markers.set_zone_visible(&mut self.session, zone_id, visible);
        Ok(())
    }

    // ========== Elements ==========

    /// Start element placement in `zone_id`, or in the selected zone
    pub fn begin_element_creation(&mut self, zone_id: Option<ZoneId>) -> WorkflowResult<()> {
        match self.state {
            PageState::Idle
            | PageState::ZoneSelected { .. }
            | PageState::CreatingElement { .. }
            | PageState::PlacingPoint { .. } => {}
            _ => return self.fail("Cannot add element", self.invalid("add an element")),
        }
        let Some(zone_id) = zone_id.or(self.state.zone_id()) else {
            return self.fail("Cannot add element", WorkflowError::NoTargetZone);
        };
        if self.store.zone(zone_id).is_none() {
            return self.fail("Cannot add element", WorkflowError::ZoneNotFound(zone_id));
        }
        self.transition(PageState::CreatingElement { zone_id });
        Ok(())
    }

    /// Host hook for a map click; opens the element form at `coord`
    pub fn place_element_at(&mut self, coord: LngLat) -> WorkflowResult<ElementForm> {
        let zone_id = match self.state {
            PageState::CreatingElement { zone_id } | PageState::PlacingPoint { zone_id, .. } => zone_id,
            _ => return self.fail("Cannot add element", WorkflowError::NoTargetZone),
        };
        match self.store.zone(zone_id).map(|z| z.contains(coord)) {
            Some(true) => {}
            Some(false) => return self.fail("Cannot add element", WorkflowError::OutsideZone),
            None => return self.fail("Cannot add element", WorkflowError::ZoneNotFound(zone_id)),
        }
        self.transition(PageState::PlacingPoint { zone_id, coord });
        Ok(ElementForm::at(coord, zone_id))
    }

    /// "Save element" enabled
    pub fn can_save_element(&self, form: &ElementForm) -> bool {
        matches!(self.state, PageState::PlacingPoint { .. })
            && validate_element_form(form, &self.store.element_types()).is_ok()
    }

    /// Create the anchor point, then the element referencing it
    ///
    /// A point create failure keeps the form open. An element create failure
    /// leaves the new point on the backend without an element.
    pub async fn save_element(&mut self, form: ElementForm) -> WorkflowResult<Element> {
        let (zone_id, coord) = match self.state {
            PageState::PlacingPoint { zone_id, coord } => (zone_id, coord),
            _ => return self.fail("Cannot save element", self.invalid("save an element")),
        };
        let element_type_id = match validate_element_form(&form, &self.store.element_types()) {
            Ok(id) => id,
            Err(e) => return self.fail("Cannot save element", e),
        };
        self.transition(PageState::SavingElement { zone_id, coord });

        let point = match self.api.create_point(&PointCreate::element_anchor(coord, zone_id)).await {
            Ok(point) => point,
            Err(e) => {
                self.transition(PageState::PlacingPoint { zone_id, coord });
                return self.fail("Failed to save element", e.into());
            }
        };
        self.store.upsert_point(point.clone());

        let payload = ElementCreate {
            description: form.description,
            element_type_id,
            tree_type_id: form.tree_type_id,
            point_id: point.id,
        };
        let element = match self.api.create_element(&payload).await {
            Ok(element) => element,
            Err(e) => {
                tracing::warn!(
                    point_id = point.id,
                    zone_id,
                    error = %e,
                    "Element create failed, point left without element"
                );
                self.transition(PageState::Idle);
                return self.fail("Failed to save element", e.into());
            }
        };
        tracing::info!(element_id = element.id, point_id = point.id, "Element created");

        self.store.upsert_element(element.clone());
        self.transition(PageState::Idle);
        self.render_markers();
        self.notifier.notify(Toast::success("Element saved", ""));
        Ok(element)
    }

    pub fn cancel_element_creation(&mut self) -> WorkflowResult<()> {
        match self.state {
            PageState::CreatingElement { .. } | PageState::PlacingPoint { .. } => {
                self.transition(PageState::Idle);
                Ok(())
            }
            PageState::SavingElement { .. } => self.fail("Cannot cancel", self.invalid("cancel element creation")),
            _ => Ok(()),
        }
    }

    pub async fn delete_element(&mut self, element_id: ElementId) -> WorkflowResult<()> {
        self.require_editor("Cannot delete element")?;
        if self.store.element(element_id).is_none() {
            return self.fail("Cannot delete element", WorkflowError::ElementNotFound(element_id));
        }
        if let Err(e) = self.api.delete_element(element_id).await {
            return self.fail("Failed to delete element", e.into());
        }
        tracing::info!(element_id, "Element deleted");

        self.markers.remove_one(&mut self.session, element_id);
        self.store.remove_element(element_id);
        if let Ok(renderer) = self.session.renderer_mut() {
            renderer.close_popup();
        }
        if self.incident_target == Some(element_id) {
            self.incident_target = None;
        }
        self.notifier.notify(Toast::success("Element deleted", ""));
        Ok(())
    }

    // ========== Incidences ==========

    /// Open the incident form for an element (popup "add incident")
    pub fn open_incident_form(&mut self, element_id: ElementId) -> WorkflowResult<IncidenceForm> {
        if self.store.element(element_id).is_none() {
            return self.fail("Cannot add incident", WorkflowError::ElementNotFound(element_id));
        }
        self.incident_target = Some(element_id);
        Ok(IncidenceForm::default())
    }

    pub fn close_incident_form(&mut self) {
        self.incident_target = None;
    }

    pub async fn submit_incident(&mut self, form: IncidenceForm) -> WorkflowResult<Incidence> {
        let Some(element_id) = self.incident_target else {
            return self.fail("Cannot add incident", WorkflowError::NoIncidentTarget);
        };
        let payload = IncidenceCreate {
            name: form.name,
            description: form.description,
            status: IncidenceStatus::Open,
            element_id,
        };
        match self.api.create_incidence(&payload).await {
            Ok(incidence) => {
                tracing::info!(incidence_id = incidence.id, element_id, "Incidence created");
                self.store.upsert_incidence(incidence.clone());
                self.incident_target = None;
                self.notifier.notify(Toast::success("Incident reported", ""));
                Ok(incidence)
            }
            Err(e) => self.fail("Failed to report incident", e.into()),
        }
    }

    // ========== Teardown ==========

    /// Stop listening, drop markers and release the renderer
    pub fn unmount(&mut self) {
        self.drawing.detach(&mut self.session);
        self.events.close();
        self.markers.clear(&mut self.session);
        self.session.destroy();
        self.markers_pending = false;
        self.incident_target = None;
        self.state = PageState::Idle;
        tracing::info!("Map page unmounted");
    }

    // ========== Internal ==========

    fn transition(&mut self, next: PageState) {
        tracing::debug!(from = self.state.name(), to = next.name(), "Page state");
        self.state = next;
    }

    fn invalid(&self, action: &'static str) -> WorkflowError {
        WorkflowError::InvalidTransition {
            from: self.state.name(),
            action,
        }
    }

    fn require_editor(&self, title: &str) -> WorkflowResult<()> {
        if self.is_editor() {
            Ok(())
        } else {
            self.fail(title, WorkflowError::NotEditor)
        }
    }

    /// Toast the error and hand it back
    fn fail<T>(&self, title: &str, err: WorkflowError) -> WorkflowResult<T> {
        match &err {
            WorkflowError::Api(e) => tracing::error!(error = %e, "{}", title),
            other => tracing::debug!(error = %other, "{}", title),
        }
        self.notifier.notify(Toast::error(title, err.user_message()));
        Err(err)
    }

    fn apply_ring(&mut self, vertices: Vec<LngLat>) {
        if !self.state.is_drawing() {
            tracing::debug!(state = self.state.name(), "Ring update ignored");
            return;
        }
        let ring = Ring::new(vertices);
        if ring.is_valid() {
            self.transition(PageState::RingValidated { ring });
        } else {
            self.transition(PageState::DrawingZone);
        }
    }

    /// Queue a full zone redraw behind the style gate
    fn render_zones(&mut self) -> MapResult<()> {
        let zones = self.store.zones();
        let prefix = self.config.zone_layer_prefix.clone();
        self.session.on_style_load(move |renderer| {
            if let Err(e) = zones::render_zones(renderer, &zones, &prefix) {
                tracing::error!(error = %e, "Zone layers not rendered");
            }
        })?;
        self.apply_hidden_zones();
        Ok(())
    }

    fn apply_hidden_zones(&mut self) {
        let prefix = self.config.zone_layer_prefix.clone();
        let Ok(renderer) = self.session.styled_renderer_mut() else {
            return;
        };
        for zone_id in &self.hidden_zones {
            if let Err(e) = zones::set_zone_layers_visible(renderer, *zone_id, false, &prefix) {
                tracing::warn!(zone_id, error = %e, "Zone not hidden");
            }
        }
    }

    fn marker_bindings(&self) -> MarkerBindings {
        let click = self.events.emitter();
        let incident = self.events.emitter();
        let on_delete: Option<ElementCallback> = if self.is_editor() {
            let delete = self.events.emitter();
            Some(Arc::new(move |id: ElementId| {
                delete.emit(PageEvent::DeleteElementRequested(id));
            }))
        } else {
            None
        };

        MarkerBindings {
            on_click: Some(Arc::new(move |element: &Element| {
                click.emit(PageEvent::MarkerClicked(element.id));
            })),
            on_delete,
            on_add_incident: Some(Arc::new(move |id: ElementId| {
                incident.emit(PageEvent::AddIncidentRequested(id));
            })),
        }
    }

    /// Full marker rebuild, deferred while the style is loading
    fn render_markers(&mut self) -> Option<RenderReport> {
        if self.session.is_disposed() {
            tracing::debug!("Map page unmounted, markers not rendered");
            return None;
        }
        if !self.session.is_style_loaded() {
            self.markers_pending = true;
            return None;
        }
        self.markers_pending = false;

        let bindings = self.marker_bindings();
        let report = self.markers.render_elements(
            &mut self.session,
            &self.store.elements(),
            &self.store.points(),
            &self.store.tree_types(),
            &self.store.element_types(),
            bindings,
        );
        for zone_id in &self.hidden_zones {
            self.markers.set_zone_visible(&mut self.session, *zone_id, false);
        }
        Some(report)
    }
}
