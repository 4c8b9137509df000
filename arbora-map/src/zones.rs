//! Zone layers
//!
//! Each zone is one GeoJSON source `{prefix}{id}` with a fill layer and an
//! outline layer on top of it. Re-rendering sweeps every `prefix*` id first.
//! These functions need a renderer whose style has loaded; callers gate
//! them behind `MapSession::on_style_load`.

use geojson::{Feature, GeoJson, Geometry, JsonObject, Value};
use shared::models::Zone;
use shared::types::ZoneId;

use crate::error::MapResult;
use crate::renderer::{LayerKind, LayerSpec, MapRenderer};
use crate::session::sweep_prefix;

pub const ZONE_FILL_OPACITY: f64 = 0.3;
pub const ZONE_OUTLINE_WIDTH: f64 = 2.0;

pub fn zone_source_id(prefix: &str, zone_id: ZoneId) -> String {
    format!("{}{}", prefix, zone_id)
}

pub fn zone_fill_layer_id(prefix: &str, zone_id: ZoneId) -> String {
    format!("{}{}-fill", prefix, zone_id)
}

pub fn zone_outline_layer_id(prefix: &str, zone_id: ZoneId) -> String {
    format!("{}{}-outline", prefix, zone_id)
}

/// Polygon feature with `id`, `name` and `color` properties; `None` for an invalid ring
pub fn zone_feature(zone: &Zone) -> Option<Feature> {
    if !zone.coordinates.is_valid() {
        return None;
    }
    let mut properties = JsonObject::new();
    properties.insert("id".into(), zone.id.into());
    properties.insert("name".into(), zone.name.clone().into());
    properties.insert("color".into(), zone.color.clone().into());

    Some(Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Polygon(
            zone.coordinates.to_polygon_positions(),
        ))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    })
}

/// Replace every zone layer; returns the number of zones drawn
pub fn render_zones<R: MapRenderer>(renderer: &mut R, zones: &[Zone], prefix: &str) -> MapResult<usize> {
    sweep_prefix(renderer, prefix)?;

    let mut rendered = 0;
    for zone in zones {
        let Some(feature) = zone_feature(zone) else {
            tracing::warn!(zone_id = zone.id, vertices = zone.coordinates.len(), "Zone ring invalid, not drawn");
            continue;
        };

        let source = zone_source_id(prefix, zone.id);
        renderer.add_source(&source, GeoJson::Feature(feature))?;
        renderer.add_layer(LayerSpec {
            id: zone_fill_layer_id(prefix, zone.id),
            source: source.clone(),
            kind: LayerKind::Fill {
                color: zone.color.clone(),
                opacity: ZONE_FILL_OPACITY,
            },
            visible: true,
        })?;
        renderer.add_layer(LayerSpec {
            id: zone_outline_layer_id(prefix, zone.id),
            source,
            kind: LayerKind::Line {
                color: zone.color.clone(),
                width: ZONE_OUTLINE_WIDTH,
            },
            visible: true,
        })?;
        rendered += 1;
    }

    tracing::debug!(rendered, total = zones.len(), "Zones rendered");
    Ok(rendered)
}

/// Toggle both layers of one zone; `false` when the zone is not drawn
pub fn set_zone_layers_visible<R: MapRenderer>(
    renderer: &mut R,
    zone_id: ZoneId,
    visible: bool,
    prefix: &str,
) -> MapResult<bool> {
    let mut found = false;
    for layer in [zone_fill_layer_id(prefix, zone_id), zone_outline_layer_id(prefix, zone_id)] {
        if renderer.has_layer(&layer) {
            renderer.set_layer_visibility(&layer, visible)?;
            found = true;
        }
    }
    Ok(found)
}

/// Remove one zone's layers and source
pub fn remove_zone_layers<R: MapRenderer>(renderer: &mut R, zone_id: ZoneId, prefix: &str) -> MapResult<()> {
    for layer in [zone_fill_layer_id(prefix, zone_id), zone_outline_layer_id(prefix, zone_id)] {
        if renderer.has_layer(&layer) {
            renderer.remove_layer(&layer)?;
        }
    }
    let source = zone_source_id(prefix, zone_id);
    if renderer.has_source(&source) {
        renderer.remove_source(&source)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessRenderer;
    use crate::renderer::{MapContainer, MapOptions};
    use shared::{LngLat, Ring};

    fn renderer() -> HeadlessRenderer {
        let r = HeadlessRenderer::create(
            &MapContainer::new("map", 100, 100),
            &MapOptions {
                access_token: "pk".into(),
                style_url: "style".into(),
                center: LngLat::new(0.0, 0.0),
                zoom: 10.0,
            },
        )
        .unwrap();
        r.probe().set_style_loaded(true);
        r
    }

    fn zone(id: ZoneId, vertices: Vec<LngLat>) -> Zone {
        Zone {
            id,
            name: format!("Zone {}", id),
            description: None,
            color: "#ff8800".into(),
            contract_id: 1,
            coordinates: Ring::new(vertices),
        }
    }

    fn square() -> Vec<LngLat> {
        vec![
            LngLat::new(0.0, 0.0),
            LngLat::new(1.0, 0.0),
            LngLat::new(1.0, 1.0),
            LngLat::new(0.0, 1.0),
        ]
    }

    #[test]
    fn test_render_zones_adds_fill_and_outline() {
        let mut r = renderer();
        let zones = vec![zone(7, square()), zone(8, vec![LngLat::new(0.0, 0.0), LngLat::new(1.0, 1.0)])];
        assert_eq!(render_zones(&mut r, &zones, "zone-").unwrap(), 1);

        let probe = r.probe();
        assert_eq!(probe.source_ids(), vec!["zone-7".to_string()]);
        assert_eq!(probe.layer_ids(), vec!["zone-7-fill".to_string(), "zone-7-outline".to_string()]);
        let fill = probe.layer("zone-7-fill").unwrap();
        assert_eq!(
            fill.kind,
            LayerKind::Fill {
                color: "#ff8800".into(),
                opacity: 0.3
            }
        );
    }

    #[test]
    fn test_rerender_replaces_previous_zones() {
        let mut r = renderer();
        render_zones(&mut r, &[zone(1, square()), zone(2, square())], "zone-").unwrap();
        render_zones(&mut r, &[zone(2, square())], "zone-").unwrap();
        assert_eq!(r.probe().source_ids(), vec!["zone-2".to_string()]);
    }

    #[test]
    fn test_visibility_and_removal() {
        let mut r = renderer();
        render_zones(&mut r, &[zone(3, square())], "zone-").unwrap();

        assert!(set_zone_layers_visible(&mut r, 3, false, "zone-").unwrap());
        assert!(!r.probe().layer("zone-3-outline").unwrap().visible);
        assert!(!set_zone_layers_visible(&mut r, 4, false, "zone-").unwrap());

        remove_zone_layers(&mut r, 3, "zone-").unwrap();
        assert!(r.probe().source_ids().is_empty());
        // second removal is a no-op
        remove_zone_layers(&mut r, 3, "zone-").unwrap();
    }

    #[test]
    fn test_feature_ring_is_closed() {
        let feature = zone_feature(&zone(5, square())).unwrap();
        let Some(Geometry {
            value: Value::Polygon(rings),
            ..
        }) = feature.geometry
        else {
            panic!("expected polygon");
        };
        assert_eq!(rings[0].len(), 5);
        assert_eq!(rings[0].first(), rings[0].last());
        assert_eq!(feature.properties.unwrap()["name"], "Zone 5");
    }
}
