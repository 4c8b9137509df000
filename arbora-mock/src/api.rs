//! Mock REST handlers
//!
//! Mirrors the paths consumed by `arbora-client`. Bodies are plain JSON;
//! errors use the shared `ApiErrorBody`.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, put},
};
use chrono::Utc;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{
    Element, ElementCreate, ElementType, Incidence, IncidenceCreate, Point, PointCreate,
    TreeType, Zone, ZoneCreate, ZoneUpdate,
};

use crate::state::{MockRoute, MockState};

/// Build the mock router
pub fn router(state: MockState) -> Router {
    Router::new()
        .route("/api/zones", get(list_zones).post(create_zone))
        .route("/api/zones/{id}", put(update_zone).delete(delete_zone))
        .route("/api/points", get(list_points).post(create_point))
        .route("/api/points/{id}", axum::routing::delete(delete_point))
        .route("/api/elements", get(list_elements).post(create_element))
        .route("/api/elements/{id}", axum::routing::delete(delete_element))
        .route("/api/element_types", get(list_element_types))
        .route("/api/tree_types", get(list_tree_types))
        .route("/api/incidences", get(list_incidences).post(create_incidence))
        .with_state(state)
}

/// Record the caller's token and honour injected failures
async fn enter(state: &MockState, headers: &HeaderMap, route: MockRoute) -> AppResult<()> {
    let auth = headers
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string);
    state.record_authorization(auth).await;

    if state.take_failure(route).await {
        tracing::warn!(?route, "Injected failure");
        return Err(AppError::internal(format!("Injected failure on {:?}", route)));
    }
    Ok(())
}

// ========== Zones ==========

async fn list_zones(State(state): State<MockState>, headers: HeaderMap) -> AppResult<Json<Vec<Zone>>> {
    enter(&state, &headers, MockRoute::ListZones).await?;
    let data = state.data().await;
    Ok(Json(data.zones.values().cloned().collect()))
}

async fn create_zone(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(payload): Json<ZoneCreate>,
) -> AppResult<Json<Zone>> {
    enter(&state, &headers, MockRoute::CreateZone).await?;
    if !payload.coordinates.is_valid() {
        return Err(AppError::new(ErrorCode::ZoneInvalidRing));
    }
    let mut data = state.data().await;
    if data.zones.values().any(|z| z.name == payload.name) {
        return Err(AppError::new(ErrorCode::ZoneNameExists).with_detail("name", payload.name));
    }
    let id = data.next_id();
    let zone = Zone {
        id,
        name: payload.name,
        description: payload.description,
        color: payload.color,
        contract_id: payload.contract_id,
        coordinates: payload.coordinates,
    };
    data.zones.insert(id, zone.clone());
    tracing::info!(zone_id = id, "Zone created");
    Ok(Json(zone))
}

async fn update_zone(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(payload): Json<ZoneUpdate>,
) -> AppResult<Json<Zone>> {
    enter(&state, &headers, MockRoute::UpdateZone).await?;
    let mut data = state.data().await;
    let zone = data
        .zones
        .get_mut(&id)
        .ok_or_else(|| AppError::with_message(ErrorCode::ZoneNotFound, format!("Zone {} not found", id)))?;
    if let Some(name) = payload.name {
        zone.name = name;
    }
    if let Some(description) = payload.description {
        zone.description = Some(description);
    }
    if let Some(color) = payload.color {
        zone.color = color;
    }
    Ok(Json(zone.clone()))
}

async fn delete_zone(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    enter(&state, &headers, MockRoute::DeleteZone).await?;
    let deleted = state.data().await.delete_zone_cascade(id);
    Ok(Json(deleted))
}

// ========== Points ==========

async fn list_points(State(state): State<MockState>, headers: HeaderMap) -> AppResult<Json<Vec<Point>>> {
    enter(&state, &headers, MockRoute::ListPoints).await?;
    let data = state.data().await;
    Ok(Json(data.points.values().cloned().collect()))
}

async fn create_point(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(payload): Json<PointCreate>,
) -> AppResult<Json<Point>> {
    enter(&state, &headers, MockRoute::CreatePoint).await?;
    let mut data = state.data().await;
    if !data.zones.contains_key(&payload.zone_id) {
        return Err(AppError::with_message(
            ErrorCode::ZoneNotFound,
            format!("Zone {} not found", payload.zone_id),
        ));
    }
    let id = data.next_id();
    let point = Point {
        id,
        latitude: payload.latitude,
        longitude: payload.longitude,
        point_type: payload.point_type,
        zone_id: payload.zone_id,
    };
    data.points.insert(id, point.clone());
    Ok(Json(point))
}

async fn delete_point(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    enter(&state, &headers, MockRoute::DeletePoint).await?;
    let mut data = state.data().await;
    let deleted = data.points.remove(&id).is_some();
    if deleted {
        data.elements.retain(|_, e| e.point_id != id);
    }
    Ok(Json(deleted))
}

// ========== Elements ==========

async fn list_elements(State(state): State<MockState>, headers: HeaderMap) -> AppResult<Json<Vec<Element>>> {
    enter(&state, &headers, MockRoute::ListElements).await?;
    let data = state.data().await;
    Ok(Json(data.elements.values().cloned().collect()))
}

async fn create_element(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(payload): Json<ElementCreate>,
) -> AppResult<Json<Element>> {
    enter(&state, &headers, MockRoute::CreateElement).await?;
    let mut data = state.data().await;
    if !data.points.contains_key(&payload.point_id) {
        return Err(AppError::new(ErrorCode::PointNotFound));
    }
    let element_type = data
        .element_types
        .get(&payload.element_type_id)
        .ok_or_else(|| AppError::new(ErrorCode::ElementTypeNotFound))?;
    if element_type.requires_tree_type && payload.tree_type_id.is_none() {
        return Err(AppError::new(ErrorCode::ElementTreeTypeRequired));
    }
    let id = data.next_id();
    let element = Element {
        id,
        description: payload.description,
        element_type_id: payload.element_type_id,
        tree_type_id: payload.tree_type_id,
        point_id: payload.point_id,
        created_at: Some(Utc::now()),
    };
    data.elements.insert(id, element.clone());
    tracing::info!(element_id = id, point_id = payload.point_id, "Element created");
    Ok(Json(element))
}

async fn delete_element(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    enter(&state, &headers, MockRoute::DeleteElement).await?;
    let mut data = state.data().await;
    if data.elements.remove(&id).is_none() {
        return Err(AppError::with_message(
            ErrorCode::ElementNotFound,
            format!("Element {} not found", id),
        ));
    }
    data.incidences.retain(|_, i| i.element_id != id);
    Ok(StatusCode::NO_CONTENT)
}

// ========== Lookup data ==========

async fn list_element_types(
    State(state): State<MockState>,
    headers: HeaderMap,
) -> AppResult<Json<Vec<ElementType>>> {
    enter(&state, &headers, MockRoute::ListElementTypes).await?;
    let data = state.data().await;
    Ok(Json(data.element_types.values().cloned().collect()))
}

async fn list_tree_types(State(state): State<MockState>, headers: HeaderMap) -> AppResult<Json<Vec<TreeType>>> {
    enter(&state, &headers, MockRoute::ListTreeTypes).await?;
    let data = state.data().await;
    Ok(Json(data.tree_types.values().cloned().collect()))
}

// ========== Incidences ==========

async fn list_incidences(
    State(state): State<MockState>,
    headers: HeaderMap,
) -> AppResult<Json<Vec<Incidence>>> {
    enter(&state, &headers, MockRoute::ListIncidences).await?;
    let data = state.data().await;
    Ok(Json(data.incidences.values().cloned().collect()))
}

async fn create_incidence(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(payload): Json<IncidenceCreate>,
) -> AppResult<Json<Incidence>> {
    enter(&state, &headers, MockRoute::CreateIncidence).await?;
    let mut data = state.data().await;
    if !data.elements.contains_key(&payload.element_id) {
        return Err(AppError::new(ErrorCode::ElementNotFound));
    }
    let id = data.next_id();
    let incidence = Incidence {
        id,
        name: payload.name,
        description: payload.description,
        status: payload.status,
        element_id: payload.element_id,
        created_at: Some(Utc::now()),
    };
    data.incidences.insert(id, incidence.clone());
    Ok(Json(incidence))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http::Request;
    use tower::ServiceExt;

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::post(uri)
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_zone_rejects_short_ring() {
        let app = router(MockState::new());
        let (status, body) = send(
            app,
            post_json(
                "/api/zones",
                serde_json::json!({
                    "name": "Line",
                    "description": null,
                    "color": "#ff0000",
                    "contract_id": 1,
                    "coordinates": [[0.0, 0.0], [1.0, 0.0]]
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], 4002);
    }

    #[tokio::test]
    async fn test_element_requires_tree_type() {
        let state = MockState::seeded().await;
        state
            .seed(|d| {
                d.points.insert(
                    50,
                    Point {
                        id: 50,
                        latitude: 1.0,
                        longitude: 1.0,
                        point_type: shared::models::PointType::Element,
                        zone_id: 1,
                    },
                );
            })
            .await;
        let app = router(state);
        // id 1 is the seeded "Tree" type
        let (status, body) = send(
            app,
            post_json(
                "/api/elements",
                serde_json::json!({
                    "description": "Plane tree",
                    "element_type_id": 1,
                    "tree_type_id": null,
                    "point_id": 50
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], 5103);
    }

    #[tokio::test]
    async fn test_injected_failure_returns_error_body() {
        let state = MockState::new();
        state.fail_next(MockRoute::ListZones).await;
        let app = router(state.clone());
        let req = Request::get("/api/zones")
            .header(http::header::AUTHORIZATION, "Bearer abc")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app, req).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], 9001);
        assert_eq!(state.last_authorization().await.as_deref(), Some("Bearer abc"));
    }
}
