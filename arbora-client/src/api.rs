//! Typed inventory API
//!
//! [`ForestApi`] is the seam between the map core and the backend. The
//! network implementation lives on [`HttpClient`]; hosts and tests may plug
//! in their own.

use async_trait::async_trait;
use shared::models::{
    Element, ElementCreate, ElementType, Incidence, IncidenceCreate, Point, PointCreate,
    TreeType, Zone, ZoneCreate, ZoneUpdate,
};
use shared::types::{ElementId, PointId, ZoneId};

use crate::{ClientError, ClientResult, HttpClient};

/// REST resource paths
pub mod paths {
    pub const ZONES: &str = "api/zones";
    pub const POINTS: &str = "api/points";
    pub const ELEMENTS: &str = "api/elements";
    pub const ELEMENT_TYPES: &str = "api/element_types";
    pub const TREE_TYPES: &str = "api/tree_types";
    pub const INCIDENCES: &str = "api/incidences";

    /// `{collection}/{id}`
    pub fn item(collection: &str, id: i64) -> String {
        format!("{}/{}", collection, id)
    }
}

/// Inventory backend operations used by the map page
#[async_trait]
pub trait ForestApi: Send + Sync {
    // ========== Zones ==========
    async fn list_zones(&self) -> ClientResult<Vec<Zone>>;
    async fn create_zone(&self, zone: &ZoneCreate) -> ClientResult<Zone>;
    async fn update_zone(&self, id: ZoneId, update: &ZoneUpdate) -> ClientResult<Zone>;
    /// Backend cascades to the zone's points and their elements
    async fn delete_zone(&self, id: ZoneId) -> ClientResult<()>;

    // ========== Points ==========
    async fn list_points(&self) -> ClientResult<Vec<Point>>;
    async fn create_point(&self, point: &PointCreate) -> ClientResult<Point>;
    async fn delete_point(&self, id: PointId) -> ClientResult<()>;

    // ========== Elements ==========
    async fn list_elements(&self) -> ClientResult<Vec<Element>>;
    async fn create_element(&self, element: &ElementCreate) -> ClientResult<Element>;
    async fn delete_element(&self, id: ElementId) -> ClientResult<()>;

    // ========== Lookup data ==========
    async fn list_element_types(&self) -> ClientResult<Vec<ElementType>>;
    async fn list_tree_types(&self) -> ClientResult<Vec<TreeType>>;

    // ========== Incidences ==========
    async fn list_incidences(&self) -> ClientResult<Vec<Incidence>>;
    async fn create_incidence(&self, incidence: &IncidenceCreate) -> ClientResult<Incidence>;
}

impl HttpClient {
    async fn delete_item(&self, collection: &str, id: i64) -> ClientResult<()> {
        let path = paths::item(collection, id);
        // 空响应体视为成功, 只有明确的 false 才算未找到
        match self.delete::<bool>(&path).await? {
            Some(false) => Err(ClientError::NotFound(path)),
            Some(true) | None => Ok(()),
        }
    }
}

#[async_trait]
impl ForestApi for HttpClient {
    async fn list_zones(&self) -> ClientResult<Vec<Zone>> {
        self.get(paths::ZONES).await
    }

    async fn create_zone(&self, zone: &ZoneCreate) -> ClientResult<Zone> {
        self.post(paths::ZONES, zone).await
    }

    async fn update_zone(&self, id: ZoneId, update: &ZoneUpdate) -> ClientResult<Zone> {
        self.put(&paths::item(paths::ZONES, id), update).await
    }

    async fn delete_zone(&self, id: ZoneId) -> ClientResult<()> {
        self.delete_item(paths::ZONES, id).await
    }

    async fn list_points(&self) -> ClientResult<Vec<Point>> {
        self.get(paths::POINTS).await
    }

    async fn create_point(&self, point: &PointCreate) -> ClientResult<Point> {
        self.post(paths::POINTS, point).await
    }

    async fn delete_point(&self, id: PointId) -> ClientResult<()> {
        self.delete_item(paths::POINTS, id).await
    }

    async fn list_elements(&self) -> ClientResult<Vec<Element>> {
        self.get(paths::ELEMENTS).await
    }

    async fn create_element(&self, element: &ElementCreate) -> ClientResult<Element> {
        self.post(paths::ELEMENTS, element).await
    }

    async fn delete_element(&self, id: ElementId) -> ClientResult<()> {
        self.delete_item(paths::ELEMENTS, id).await
    }

    async fn list_element_types(&self) -> ClientResult<Vec<ElementType>> {
        self.get(paths::ELEMENT_TYPES).await
    }

    async fn list_tree_types(&self) -> ClientResult<Vec<TreeType>> {
        self.get(paths::TREE_TYPES).await
    }

    async fn list_incidences(&self) -> ClientResult<Vec<Incidence>> {
        self.get(paths::INCIDENCES).await
    }

    async fn create_incidence(&self, incidence: &IncidenceCreate) -> ClientResult<Incidence> {
        self.post(paths::INCIDENCES, incidence).await
    }
}
