//! Drawing Controller
//!
//! Wraps the polygon drawing tool and reduces every draw event to either a
//! valid outer ring or an empty result. Shapes with fewer than three
//! distinct vertices are deleted from the tool as soon as they appear.

use geojson::{Feature, Value, feature::Id};
use shared::{LngLat, Ring};

use crate::error::MapResult;
use crate::renderer::{DrawEvent, DrawTool, DrawToolOptions, MapRenderer};
use crate::session::MapSession;

type RingCallback = Box<dyn FnMut(Vec<LngLat>)>;

pub struct DrawingController<D: DrawTool> {
    tool: Option<D>,
    on_update: Option<RingCallback>,
}

impl<D: DrawTool> Default for DrawingController<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: DrawTool> DrawingController<D> {
    pub fn new() -> Self {
        Self {
            tool: None,
            on_update: None,
        }
    }

    /// Attach the polygon-only tool and start listening
    ///
    /// Returns `false` without touching the map when `is_editor` is false.
    /// Enabling again clears previous shapes and replaces the callback.
    pub fn enable<R, F>(&mut self, session: &mut MapSession<R>, is_editor: bool, on_update: F) -> MapResult<bool>
    where
        R: MapRenderer<Draw = D>,
        F: FnMut(Vec<LngLat>) + 'static,
    {
        if !is_editor {
            tracing::debug!("Drawing not enabled, editor role required");
            return Ok(false);
        }

        match self.tool.as_mut() {
            Some(tool) => tool.delete_all(),
            None => {
                let tool = session.renderer_mut()?.attach_draw_tool(DrawToolOptions::polygon_only());
                self.tool = Some(tool);
            }
        }
        self.on_update = Some(Box::new(on_update));
        tracing::debug!("Drawing enabled");
        Ok(true)
    }

    pub fn is_enabled(&self) -> bool {
        self.tool.is_some()
    }

    pub fn is_listening(&self) -> bool {
        self.on_update.is_some()
    }

    pub fn tool(&self) -> Option<&D> {
        self.tool.as_ref()
    }

    /// Host hook for the tool's create/update/delete events
    ///
    /// Returns the reported ring, or `None` when nobody is listening.
    pub fn handle_event(&mut self, event: DrawEvent) -> Option<Vec<LngLat>> {
        let tool = self.tool.as_mut()?;
        let on_update = self.on_update.as_mut()?;

        let features = tool.get_all().features;
        let ring = match features.first() {
            None => Vec::new(),
            Some(feature) => {
                if features.len() > 1 {
                    tracing::debug!(ignored = features.len() - 1, "Only the first drawn shape is used");
                }
                match outer_ring(feature) {
                    Some(ring) if ring.is_valid() => ring.into_vertices(),
                    _ => {
                        tracing::debug!(?event, "Drawn shape rejected");
                        match feature_id(feature) {
                            Some(id) => tool.delete(&id),
                            None => tool.delete_all(),
                        }
                        Vec::new()
                    }
                }
            }
        };

        on_update(ring.clone());
        Some(ring)
    }

    /// Remove every drawn shape, keeping the tool attached
    pub fn clear(&mut self) {
        if let Some(tool) = self.tool.as_mut() {
            tool.delete_all();
        }
    }

    /// Clear and stop reporting rings
    pub fn disable(&mut self) {
        self.clear();
        if self.on_update.take().is_some() {
            tracing::debug!("Drawing disabled");
        }
    }

    /// Hand the tool back to the renderer
    pub fn detach<R>(&mut self, session: &mut MapSession<R>)
    where
        R: MapRenderer<Draw = D>,
    {
        self.disable();
        if let Some(tool) = self.tool.take()
            && let Ok(renderer) = session.renderer_mut()
        {
            renderer.detach_draw_tool(tool);
        }
    }
}

/// First ring of a polygon feature, vertices in drawing order
///
/// Any unreadable position rejects the whole ring.
fn outer_ring(feature: &Feature) -> Option<Ring> {
    let geometry = feature.geometry.as_ref()?;
    match &geometry.value {
        Value::Polygon(rings) => rings.first()?.iter().map(|p| LngLat::from_position(p)).collect(),
        _ => None,
    }
}

fn feature_id(feature: &Feature) -> Option<String> {
    match feature.id.as_ref()? {
        Id::String(s) => Some(s.clone()),
        Id::Number(n) => Some(n.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapConfig;
    use crate::headless::{HeadlessDrawTool, HeadlessRenderer};
    use crate::renderer::MapContainer;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Reports = Rc<RefCell<Vec<Vec<LngLat>>>>;

    fn setup() -> (MapSession<HeadlessRenderer>, DrawingController<HeadlessDrawTool>, Reports) {
        let session = MapSession::create(
            MapContainer::new("map", 640, 480),
            &MapConfig::default().with_access_token("pk.test"),
        )
        .unwrap();
        (session, DrawingController::new(), Rc::new(RefCell::new(Vec::new())))
    }

    fn recorder(reports: &Reports) -> impl FnMut(Vec<LngLat>) + 'static {
        let reports = reports.clone();
        move |ring| reports.borrow_mut().push(ring)
    }

    #[test]
    fn test_non_editor_is_noop() {
        let (mut session, mut draw, reports) = setup();
        assert!(!draw.enable(&mut session, false, recorder(&reports)).unwrap());
        assert!(!draw.is_enabled());
        assert!(session.renderer().unwrap().probe().draw_options().is_none());
        assert_eq!(draw.handle_event(DrawEvent::Create), None);
    }

    #[test]
    fn test_polygon_only_tool() {
        let (mut session, mut draw, reports) = setup();
        assert!(draw.enable(&mut session, true, recorder(&reports)).unwrap());
        let options = session.renderer().unwrap().probe().draw_options().unwrap();
        assert!(options.polygon && options.trash);
        assert!(!options.point && !options.line);
    }

    #[test]
    fn test_line_feature_is_rejected_and_deleted() {
        let (mut session, mut draw, reports) = setup();
        draw.enable(&mut session, true, recorder(&reports)).unwrap();
        let tool = session.renderer().unwrap().probe().draw_tool();
        let id = tool.draw_line(&[[0.0, 0.0], [1.0, 1.0], [2.0, 0.0]]);

        assert_eq!(draw.handle_event(DrawEvent::Create), Some(vec![]));
        assert_eq!(tool.deleted_ids(), vec![id]);
        assert_eq!(tool.feature_count(), 0);
    }

    #[test]
    fn test_unreadable_vertex_rejects_whole_shape() {
        let (mut session, mut draw, reports) = setup();
        draw.enable(&mut session, true, recorder(&reports)).unwrap();
        let tool = session.renderer().unwrap().probe().draw_tool();
        // still four good corners without the NaN vertex
        let id = tool.draw_polygon(&[[0.0, 0.0], [1.0, 0.0], [f64::NAN, 0.5], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]);

        assert_eq!(draw.handle_event(DrawEvent::Create), Some(vec![]));
        assert_eq!(tool.deleted_ids(), vec![id]);
        assert_eq!(*reports.borrow(), vec![Vec::<LngLat>::new()]);
    }

    #[test]
    fn test_empty_tool_reports_empty() {
        let (mut session, mut draw, reports) = setup();
        draw.enable(&mut session, true, recorder(&reports)).unwrap();
        draw.handle_event(DrawEvent::Delete);
        assert_eq!(*reports.borrow(), vec![Vec::<LngLat>::new()]);
    }

    #[test]
    fn test_reenable_clears_previous_attempt() {
        let (mut session, mut draw, reports) = setup();
        draw.enable(&mut session, true, recorder(&reports)).unwrap();
        let tool = session.renderer().unwrap().probe().draw_tool();
        tool.draw_polygon(&[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]);

        draw.enable(&mut session, true, recorder(&reports)).unwrap();
        assert_eq!(tool.feature_count(), 0);
    }

    #[test]
    fn test_disable_stops_listening() {
        let (mut session, mut draw, reports) = setup();
        draw.enable(&mut session, true, recorder(&reports)).unwrap();
        draw.disable();
        assert!(draw.is_enabled());
        assert!(!draw.is_listening());
        assert_eq!(draw.handle_event(DrawEvent::Update), None);
        assert!(reports.borrow().is_empty());

        draw.detach(&mut session);
        assert!(!draw.is_enabled());
    }
}
