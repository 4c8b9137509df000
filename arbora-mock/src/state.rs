//! In-memory backend state

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use shared::models::{Element, ElementType, Incidence, Point, TreeType, Zone};
use tokio::sync::{RwLock, RwLockWriteGuard};

/// Routes that can be made to fail on demand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockRoute {
    ListZones,
    CreateZone,
    UpdateZone,
    DeleteZone,
    ListPoints,
    CreatePoint,
    DeletePoint,
    ListElements,
    CreateElement,
    DeleteElement,
    ListElementTypes,
    ListTreeTypes,
    ListIncidences,
    CreateIncidence,
}

/// Backend tables keyed by id
#[derive(Debug, Default)]
pub struct MockData {
    pub zones: BTreeMap<i64, Zone>,
    pub points: BTreeMap<i64, Point>,
    pub elements: BTreeMap<i64, Element>,
    pub element_types: BTreeMap<i64, ElementType>,
    pub tree_types: BTreeMap<i64, TreeType>,
    pub incidences: BTreeMap<i64, Incidence>,
    next_id: i64,
}

impl MockData {
    /// Sequential ids shared by every table
    pub fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    /// Bump the id sequence so the next id is `id`
    pub fn set_next_id(&mut self, id: i64) {
        self.next_id = id - 1;
    }

    /// Remove a zone with its points and their elements
    pub fn delete_zone_cascade(&mut self, zone_id: i64) -> bool {
        if self.zones.remove(&zone_id).is_none() {
            return false;
        }
        let point_ids: HashSet<i64> = self
            .points
            .values()
            .filter(|p| p.zone_id == zone_id)
            .map(|p| p.id)
            .collect();
        self.points.retain(|id, _| !point_ids.contains(id));
        self.elements.retain(|_, e| !point_ids.contains(&e.point_id));
        true
    }
}

#[derive(Debug, Default)]
struct Inner {
    data: RwLock<MockData>,
    failures: RwLock<HashSet<MockRoute>>,
    last_authorization: RwLock<Option<String>>,
}

/// Shared handle to the mock backend
#[derive(Debug, Clone, Default)]
pub struct MockState {
    inner: Arc<Inner>,
}

impl MockState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State pre-filled with the element and tree type catalogue
    pub async fn seeded() -> Self {
        let state = Self::new();
        state
            .seed(|d| {
                let tree = d.next_id();
                d.element_types.insert(
                    tree,
                    ElementType {
                        id: tree,
                        name: "Tree".into(),
                        icon: Some("tree".into()),
                        color: Some("#2e7d32".into()),
                        requires_tree_type: true,
                        description: None,
                    },
                );
                let bench = d.next_id();
                d.element_types.insert(
                    bench,
                    ElementType {
                        id: bench,
                        name: "Bench".into(),
                        icon: Some("bench".into()),
                        color: Some("#795548".into()),
                        requires_tree_type: false,
                        description: Some("Urban furniture".into()),
                    },
                );
                let plane = d.next_id();
                d.tree_types.insert(
                    plane,
                    TreeType {
                        id: plane,
                        family: "Platanaceae".into(),
                        genus: "Platanus".into(),
                        species: "hispanica".into(),
                    },
                );
            })
            .await;
        state
    }

    /// Mutate the tables directly
    pub async fn seed(&self, f: impl FnOnce(&mut MockData)) {
        let mut data = self.inner.data.write().await;
        f(&mut data);
    }

    pub async fn data(&self) -> RwLockWriteGuard<'_, MockData> {
        self.inner.data.write().await
    }

    /// Make the next request on `route` answer 500
    pub async fn fail_next(&self, route: MockRoute) {
        self.inner.failures.write().await.insert(route);
    }

    /// Consume a pending failure for `route`
    pub(crate) async fn take_failure(&self, route: MockRoute) -> bool {
        self.inner.failures.write().await.remove(&route)
    }

    pub(crate) async fn record_authorization(&self, value: Option<String>) {
        *self.inner.last_authorization.write().await = value;
    }

    /// Authorization header of the most recent request
    pub async fn last_authorization(&self) -> Option<String> {
        self.inner.last_authorization.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::PointType;
    use shared::Ring;

    #[tokio::test]
    async fn test_zone_delete_cascades() {
        let state = MockState::new();
        state
            .seed(|d| {
                d.zones.insert(
                    1,
                    Zone {
                        id: 1,
                        name: "Park".into(),
                        description: None,
                        color: "#00ff00".into(),
                        contract_id: 1,
                        coordinates: Ring::default(),
                    },
                );
                for (pid, zone_id) in [(10, 1), (11, 2)] {
                    d.points.insert(
                        pid,
                        Point {
                            id: pid,
                            latitude: 0.0,
                            longitude: 0.0,
                            point_type: PointType::Element,
                            zone_id,
                        },
                    );
                    d.elements.insert(
                        pid + 10,
                        Element {
                            id: pid + 10,
                            description: None,
                            element_type_id: 1,
                            tree_type_id: None,
                            point_id: pid,
                            created_at: None,
                        },
                    );
                }
            })
            .await;

        let mut data = state.data().await;
        assert!(data.delete_zone_cascade(1));
        assert!(!data.delete_zone_cascade(1));
        assert_eq!(data.points.keys().copied().collect::<Vec<_>>(), vec![11]);
        assert_eq!(data.elements.keys().copied().collect::<Vec<_>>(), vec![21]);
    }

    #[tokio::test]
    async fn test_failures_are_one_shot() {
        let state = MockState::new();
        state.fail_next(MockRoute::CreateElement).await;
        assert!(state.take_failure(MockRoute::CreateElement).await);
        assert!(!state.take_failure(MockRoute::CreateElement).await);
    }
}
