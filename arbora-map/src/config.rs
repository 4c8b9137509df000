//! Map configuration

use std::path::Path;

use serde::{Deserialize, Serialize};
use shared::LngLat;

use crate::error::{MapError, MapResult};

/// Zoom used by `fly_to` when the caller gives none
pub const DEFAULT_FLY_TO_ZOOM: f64 = 18.0;
/// Prefix shared by every per-zone source and layer id
pub const DEFAULT_ZONE_PREFIX: &str = "zone-";

fn default_style_url() -> String {
    "mapbox://styles/mapbox/streets-v12".to_string()
}

fn default_center() -> LngLat {
    LngLat::new(2.1734, 41.3851)
}

fn default_zoom() -> f64 {
    13.0
}

fn default_fly_to_zoom() -> f64 {
    DEFAULT_FLY_TO_ZOOM
}

fn default_zone_prefix() -> String {
    DEFAULT_ZONE_PREFIX.to_string()
}

fn default_marker_color() -> String {
    "#4caf50".to_string()
}

/// 地图配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    /// Map provider access token
    #[serde(default)]
    pub access_token: String,
    #[serde(default = "default_style_url")]
    pub style_url: String,
    /// Initial viewport centre
    #[serde(default = "default_center")]
    pub center: LngLat,
    #[serde(default = "default_zoom")]
    pub zoom: f64,
    #[serde(default = "default_fly_to_zoom")]
    pub fly_to_zoom: f64,
    #[serde(default = "default_zone_prefix")]
    pub zone_layer_prefix: String,
    /// Marker colour for elements whose type is unknown
    #[serde(default = "default_marker_color")]
    pub default_marker_color: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            style_url: default_style_url(),
            center: default_center(),
            zoom: default_zoom(),
            fly_to_zoom: default_fly_to_zoom(),
            zone_layer_prefix: default_zone_prefix(),
            default_marker_color: default_marker_color(),
        }
    }
}

impl MapConfig {
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = token.into();
        self
    }

    /// Defaults overridden by `ARBORA_MAP_*` variables (and `.env`)
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let mut config = Self::default();

        if let Ok(token) = std::env::var("ARBORA_MAP_TOKEN") {
            config.access_token = token;
        }
        if let Ok(style) = std::env::var("ARBORA_MAP_STYLE") {
            config.style_url = style;
        }
        if let Ok(raw) = std::env::var("ARBORA_MAP_CENTER") {
            match parse_center(&raw) {
                Some(center) => config.center = center,
                None => tracing::warn!(value = %raw, "Invalid ARBORA_MAP_CENTER, using default"),
            }
        }
        if let Ok(raw) = std::env::var("ARBORA_MAP_ZOOM") {
            match raw.trim().parse::<f64>() {
                Ok(zoom) if zoom.is_finite() => config.zoom = zoom,
                _ => tracing::warn!(value = %raw, "Invalid ARBORA_MAP_ZOOM, using default"),
            }
        }
        config
    }

    /// 从文件加载配置
    pub fn load(path: &Path) -> MapResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str(&content).map_err(|e| MapError::Config(e.to_string()))
        } else {
            Ok(Self::default())
        }
    }

    /// 保存配置到文件
    pub fn save(&self, path: &Path) -> MapResult<()> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| MapError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// `"lng,lat"`
fn parse_center(raw: &str) -> Option<LngLat> {
    let (lng, lat) = raw.split_once(',')?;
    let lng: f64 = lng.trim().parse().ok()?;
    let lat: f64 = lat.trim().parse().ok()?;
    LngLat::from_position(&[lng, lat])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_center() {
        assert_eq!(parse_center("-3.70, 40.41"), Some(LngLat::new(-3.70, 40.41)));
        assert_eq!(parse_center("abc"), None);
        assert_eq!(parse_center("1,"), None);
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = MapConfig::load(&dir.path().join("map.json")).unwrap();
        assert_eq!(config, MapConfig::default());
        assert_eq!(config.fly_to_zoom, 18.0);
        assert_eq!(config.zone_layer_prefix, "zone-");
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.json");
        let config = MapConfig::default().with_access_token("pk.test");
        config.save(&path).unwrap();
        assert_eq!(MapConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.json");
        std::fs::write(&path, r#"{"access_token":"pk.1","zoom":9.5}"#).unwrap();
        let config = MapConfig::load(&path).unwrap();
        assert_eq!(config.access_token, "pk.1");
        assert_eq!(config.zoom, 9.5);
        assert_eq!(config.fly_to_zoom, DEFAULT_FLY_TO_ZOOM);
    }

    #[test]
    fn test_corrupt_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(MapConfig::load(&path), Err(MapError::Config(_))));
    }
}
