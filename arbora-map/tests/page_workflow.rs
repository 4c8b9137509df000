// arbora-map/tests/page_workflow.rs
// 页面流程集成测试: MapPage + headless renderer + mock backend

use arbora_client::{ClientConfig, HttpClient};
use arbora_map::headless::{HeadlessProbe, HeadlessRenderer};
use arbora_map::{
    DrawEvent, DrawTool, ElementForm, IncidenceForm, MapConfig, MapContainer, MapPage, PageState, PopupAction, ToastQueue,
    WorkflowError, ZoneForm,
};
use arbora_mock::{MockRoute, MockState};
use shared::models::{Element, Point, PointType, Zone};
use shared::types::UserRole;
use shared::{LngLat, NotificationLevel, Ring};

type Page = MapPage<HeadlessRenderer, HttpClient, ToastQueue>;

// seeded by MockState::seeded()
const TREE_TYPE: i64 = 1;
const BENCH_TYPE: i64 = 2;
const PLANE_TREE: i64 = 3;

struct Fixture {
    page: Page,
    probe: HeadlessProbe,
    toasts: ToastQueue,
    mock: MockState,
}

fn square(min: f64, max: f64) -> Ring {
    Ring::new(vec![
        LngLat::new(min, min),
        LngLat::new(max, min),
        LngLat::new(max, max),
        LngLat::new(min, max),
    ])
}

async fn fixture(role: UserRole) -> Fixture {
    let mock = MockState::seeded().await;
    mock.seed(|d| {
        d.zones.insert(
            7,
            Zone {
                id: 7,
                name: "Parc Central".into(),
                description: None,
                color: "#2196f3".into(),
                contract_id: 1,
                coordinates: square(0.0, 2.0),
            },
        );
        d.points.insert(
            70,
            Point {
                id: 70,
                latitude: 0.5,
                longitude: 0.5,
                point_type: PointType::Element,
                zone_id: 7,
            },
        );
        d.elements.insert(
            700,
            Element {
                id: 700,
                description: Some("Old bench".into()),
                element_type_id: BENCH_TYPE,
                tree_type_id: None,
                point_id: 70,
                created_at: None,
            },
        );
        d.set_next_id(100);
    })
    .await;

    let (addr, _server) = arbora_mock::spawn_ephemeral(mock.clone()).await.unwrap();
    let api = ClientConfig::new(format!("http://{}", addr))
        .with_token("field-token")
        .with_timeout(5)
        .build_http_client()
        .unwrap();

    let toasts = ToastQueue::new();
    let page = Page::mount(
        MapContainer::new("map", 1280, 720),
        MapConfig::default().with_access_token("pk.test"),
        api,
        toasts.clone(),
        role,
    )
    .unwrap();
    let probe = page.session().renderer().unwrap().probe();

    Fixture {
        page,
        probe,
        toasts,
        mock,
    }
}

/// Fixture with data loaded and the style ready
async fn loaded(role: UserRole) -> Fixture {
    let mut f = fixture(role).await;
    f.page.load().await.unwrap();
    f.probe.set_style_loaded(true);
    f.page.style_loaded();
    f
}

fn zone_form(name: &str) -> ZoneForm {
    ZoneForm {
        name: name.into(),
        description: None,
        color: "#ff9800".into(),
        contract_id: 1,
    }
}

async fn draw_triangle(f: &mut Fixture) {
    f.page.start_zone_creation().unwrap();
    f.probe
        .draw_tool()
        .draw_polygon(&[[3.0, 3.0], [4.0, 3.0], [4.0, 4.0], [3.0, 3.0]]);
    f.page.handle_draw_event(DrawEvent::Create);
    assert_eq!(f.page.process_events().await, 1);
}

// ========== Loading ==========

#[tokio::test]
async fn test_load_defers_rendering_until_style_loads() {
    let mut f = fixture(UserRole::Manager).await;
    f.page.load().await.unwrap();

    assert!(f.probe.source_ids().is_empty());
    assert_eq!(f.probe.marker_count(), 0);
    assert_eq!(f.page.session().pending_callbacks(), 1);

    f.probe.set_style_loaded(true);
    f.page.style_loaded();

    assert_eq!(f.probe.source_ids(), vec!["zone-7".to_string()]);
    assert!(f.probe.layer("zone-7-fill").is_some());
    assert!(f.probe.layer("zone-7-outline").is_some());
    assert_eq!(f.probe.marker_count(), 1);
    assert_eq!(f.probe.controls().len(), 5);
}

#[tokio::test]
async fn test_zone_saved_before_load_hook_survives_queued_redraw() {
    let mut f = fixture(UserRole::Manager).await;
    f.page.load().await.unwrap();
    assert_eq!(f.page.session().pending_callbacks(), 1);

    // renderer reports ready before the host fires the load hook
    f.probe.set_style_loaded(true);
    draw_triangle(&mut f).await;
    let zone = f.page.save_zone(zone_form("Nova")).await.unwrap();
    f.page.style_loaded();

    let new_source = format!("zone-{}", zone.id);
    let sources = f.probe.source_ids();
    assert!(sources.contains(&new_source), "{:?}", sources);
    assert!(sources.contains(&"zone-7".to_string()), "{:?}", sources);
    assert!(f.probe.layer(&format!("zone-{}-outline", zone.id)).is_some());
    assert_eq!(f.page.session().pending_callbacks(), 0);
}

// ========== Zones ==========

#[tokio::test]
async fn test_select_zone_flies_to_centroid_and_clears_element_creation() {
    let mut f = loaded(UserRole::Manager).await;
    f.page.begin_element_creation(Some(7)).unwrap();
    assert_eq!(f.page.state(), &PageState::CreatingElement { zone_id: 7 });

    f.page.select_zone(7).unwrap();

    assert_eq!(f.page.state(), &PageState::ZoneSelected { zone_id: 7 });
    let (center, zoom) = *f.probe.fly_to_calls().last().unwrap();
    assert!((center.lng - 1.0).abs() < 1e-9 && (center.lat - 1.0).abs() < 1e-9);
    assert_eq!(zoom, 18.0);
}

#[tokio::test]
async fn test_save_zone_success() {
    let mut f = loaded(UserRole::Manager).await;
    draw_triangle(&mut f).await;
    assert!(f.page.can_save_zone());

    let zone = f.page.save_zone(zone_form("Plaça Nova")).await.unwrap();

    assert_eq!(f.page.state(), &PageState::Idle);
    assert_eq!(zone.coordinates.len(), 4);
    assert!(f.page.store().zone(zone.id).is_some());
    assert!(f.probe.layer(&format!("zone-{}-fill", zone.id)).is_some());
    assert_eq!(f.probe.draw_tool().feature_count(), 0);
    assert!(!f.page.drawing().is_listening());
    assert_eq!(f.toasts.take().last().unwrap().level, NotificationLevel::Success);
}

#[tokio::test]
async fn test_save_zone_failure_keeps_ring() {
    let mut f = loaded(UserRole::Manager).await;
    draw_triangle(&mut f).await;
    let ring_before = f.page.state().clone();

    f.mock.fail_next(MockRoute::CreateZone).await;
    let err = f.page.save_zone(zone_form("Plaça Nova")).await.unwrap_err();

    assert!(matches!(err, WorkflowError::Api(_)));
    assert_eq!(f.page.state(), &ring_before);
    assert!(f.page.can_save_zone());
    assert!(f.toasts.take().iter().any(|t| t.is_error()));

    // retry with the preserved ring
    f.page.save_zone(zone_form("Plaça Nova")).await.unwrap();
    assert_eq!(f.page.state(), &PageState::Idle);
}

#[tokio::test]
async fn test_invalid_ring_disables_save() {
    let mut f = loaded(UserRole::Manager).await;
    draw_triangle(&mut f).await;
    assert!(f.page.can_save_zone());

    let mut tool = f.probe.draw_tool();
    tool.delete_all();
    tool.draw_polygon(&[[0.0, 0.0], [1.0, 1.0], [0.0, 0.0]]);
    f.page.handle_draw_event(DrawEvent::Update);
    f.page.process_events().await;

    assert_eq!(f.page.state(), &PageState::DrawingZone);
    assert!(!f.page.can_save_zone());
    assert_eq!(tool.feature_count(), 0);
    // silently reset, no toast
    assert!(f.toasts.is_empty());
}

#[tokio::test]
async fn test_delete_zone_removes_layers_and_markers() {
    let mut f = loaded(UserRole::Admin).await;
    assert_eq!(f.probe.marker_count(), 1);

    f.page.delete_zone(7).await.unwrap();

    assert!(f.probe.layer_ids().is_empty());
    assert_eq!(f.probe.marker_count(), 0);
    assert!(f.page.store().zone(7).is_none());
    assert!(f.page.store().element(700).is_none());
    assert!(f.mock.data().await.zones.is_empty());
}

#[tokio::test]
async fn test_hide_zone_hides_layers_and_markers() {
    let mut f = loaded(UserRole::Manager).await;
    f.page.set_zone_visible(7, false).unwrap();

    assert!(!f.probe.layer("zone-7-fill").unwrap().visible);
    assert!(!f.probe.layer("zone-7-outline").unwrap().visible);
    assert_eq!(f.probe.visible_marker_count(), 0);
    assert!(f.page.is_zone_hidden(7));

    f.page.set_zone_visible(7, true).unwrap();
    assert_eq!(f.probe.visible_marker_count(), 1);
}

#[tokio::test]
async fn test_worker_cannot_edit_zones() {
    let mut f = loaded(UserRole::Worker).await;
    let err = f.page.start_zone_creation().unwrap_err();
    assert!(matches!(err, WorkflowError::NotEditor));
    assert!(f.probe.draw_options().is_none());
    assert!(f.toasts.take()[0].is_error());

    let view = f.page.handle_marker_click(700).unwrap();
    assert_eq!(view.actions, vec![PopupAction::AddIncident]);
}

// ========== Elements ==========

#[tokio::test]
async fn test_click_outside_zone_is_rejected() {
    let mut f = loaded(UserRole::Manager).await;

    // no target zone at all
    let err = f.page.place_element_at(LngLat::new(1.0, 1.0)).unwrap_err();
    assert!(matches!(err, WorkflowError::NoTargetZone));
    assert_eq!(f.page.state(), &PageState::Idle);

    f.page.begin_element_creation(Some(7)).unwrap();
    let err = f.page.place_element_at(LngLat::new(5.0, 5.0)).unwrap_err();
    assert!(matches!(err, WorkflowError::OutsideZone));
    assert_eq!(f.page.state(), &PageState::CreatingElement { zone_id: 7 });

    let toasts = f.toasts.take();
    assert_eq!(toasts.len(), 2);
    assert!(toasts.iter().all(|t| t.message == "Cannot create an element outside a zone"));
    assert_eq!(f.mock.data().await.points.len(), 1);
}

#[tokio::test]
async fn test_save_element_two_phase() {
    let mut f = loaded(UserRole::Manager).await;
    f.page.begin_element_creation(Some(7)).unwrap();
    let form = f.page.place_element_at(LngLat::new(1.5, 1.5)).unwrap();
    assert_eq!(form.coord, LngLat::new(1.5, 1.5));
    assert_eq!(form.zone_id, 7);

    let form = form.with_type(TREE_TYPE);
    assert!(!f.page.can_save_element(&form));
    let form = form.with_tree_type(PLANE_TREE).with_description("Young plane tree");
    assert!(f.page.can_save_element(&form));

    let element = f.page.save_element(form).await.unwrap();

    assert_eq!(f.page.state(), &PageState::Idle);
    assert_eq!(f.probe.marker_count(), 2);
    assert_eq!(f.page.store().zone_of_element(element.id), Some(7));
    let data = f.mock.data().await;
    assert_eq!(data.points[&element.point_id].zone_id, 7);
    assert_eq!(data.elements[&element.id].tree_type_id, Some(PLANE_TREE));
}

#[tokio::test]
async fn test_missing_tree_type_blocks_save_without_network() {
    let mut f = loaded(UserRole::Manager).await;
    f.page.begin_element_creation(Some(7)).unwrap();
    let form = f.page.place_element_at(LngLat::new(1.0, 1.0)).unwrap().with_type(TREE_TYPE);

    let err = f.page.save_element(form).await.unwrap_err();
    assert!(matches!(err, WorkflowError::MissingTreeType { element_type_id: TREE_TYPE }));
    assert!(matches!(f.page.state(), PageState::PlacingPoint { zone_id: 7, .. }));
    assert_eq!(f.mock.data().await.points.len(), 1);
}

#[tokio::test]
async fn test_element_failure_leaves_orphan_point() {
    let mut f = loaded(UserRole::Manager).await;
    f.page.begin_element_creation(Some(7)).unwrap();
    let form = f.page.place_element_at(LngLat::new(1.0, 1.0)).unwrap().with_type(BENCH_TYPE);

    f.mock.seed(|d| d.set_next_id(42)).await;
    f.mock.fail_next(MockRoute::CreateElement).await;
    let err = f.page.save_element(form).await.unwrap_err();

    assert!(matches!(err, WorkflowError::Api(_)));
    assert_eq!(f.page.state(), &PageState::Idle);
    assert!(f.toasts.take().last().unwrap().is_error());

    let data = f.mock.data().await;
    assert!(data.points.contains_key(&42));
    assert!(data.elements.values().all(|e| e.point_id != 42));
    assert!(f.page.store().point(42).is_some());
    assert_eq!(f.probe.marker_count(), 1);
}

#[tokio::test]
async fn test_point_failure_keeps_form_open() {
    let mut f = loaded(UserRole::Manager).await;
    f.page.begin_element_creation(Some(7)).unwrap();
    let form = f.page.place_element_at(LngLat::new(1.0, 1.0)).unwrap().with_type(BENCH_TYPE);

    f.mock.fail_next(MockRoute::CreatePoint).await;
    assert!(f.page.save_element(form.clone()).await.is_err());
    assert!(matches!(f.page.state(), PageState::PlacingPoint { zone_id: 7, .. }));
    assert_eq!(f.mock.data().await.points.len(), 1);

    f.page.save_element(form).await.unwrap();
    assert_eq!(f.page.state(), &PageState::Idle);
}

// ========== Popup actions ==========

#[tokio::test]
async fn test_popup_delete_and_incident() {
    let mut f = loaded(UserRole::Manager).await;
    let view = f.page.handle_marker_click(700).unwrap();
    assert_eq!(view.title, "Bench");
    assert_eq!(view.actions, vec![PopupAction::AddIncident, PopupAction::Delete]);

    assert!(view.trigger(PopupAction::AddIncident));
    f.page.process_events().await;
    assert_eq!(f.page.incident_target(), Some(700));

    let incidence = f
        .page
        .submit_incident(IncidenceForm {
            name: "Broken slat".into(),
            description: Some("Left side".into()),
        })
        .await
        .unwrap();
    assert_eq!(incidence.element_id, 700);
    assert_eq!(f.page.incident_target(), None);

    assert!(view.trigger(PopupAction::Delete));
    f.page.process_events().await;
    assert_eq!(f.probe.marker_count(), 0);
    assert!(f.probe.popup().is_none());
    assert!(f.mock.data().await.elements.is_empty());
}

// ========== Teardown ==========

#[tokio::test]
async fn test_unmount_abandons_pending_work() {
    let mut f = fixture(UserRole::Manager).await;
    f.page.load().await.unwrap();
    f.page.start_zone_creation().unwrap();
    assert_eq!(f.page.session().pending_callbacks(), 1);

    f.page.unmount();
    f.probe.set_style_loaded(true);
    f.page.style_loaded();

    assert!(!f.page.is_mounted());
    assert!(f.probe.is_removed());
    assert!(f.probe.source_ids().is_empty());
    assert_eq!(f.probe.marker_count(), 0);

    // late drawing events go nowhere
    f.probe
        .draw_tool()
        .draw_polygon(&[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]);
    assert_eq!(f.page.handle_draw_event(DrawEvent::Create), None);
    assert_eq!(f.page.process_events().await, 0);

    let err = f.page.select_zone(7).unwrap_err();
    assert!(matches!(err, WorkflowError::Map(_)));
}

#[test]
fn test_element_form_builder() {
    let form: ElementForm = ElementForm::at(LngLat::new(1.0, 2.0), 3).with_type(BENCH_TYPE);
    assert_eq!(form.element_type_id, Some(BENCH_TYPE));
    assert_eq!(form.tree_type_id, None);
}
