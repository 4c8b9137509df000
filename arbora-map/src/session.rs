//! Map Session Wrapper
//!
//! Owns one renderer bound to a container. Source and layer work queued
//! through [`MapSession::on_style_load`] runs once the host reports the
//! style as loaded; work still queued at [`MapSession::destroy`] is dropped
//! without being run.

use shared::LngLat;

use crate::config::MapConfig;
use crate::error::{MapError, MapResult};
use crate::renderer::{ControlPosition, MapContainer, MapControl, MapOptions, MapRenderer};

type StyleCallback<R> = Box<dyn FnOnce(&mut R)>;

pub struct MapSession<R: MapRenderer> {
    renderer: Option<R>,
    container: MapContainer,
    access_token: String,
    fly_to_zoom: f64,
    pending: Vec<StyleCallback<R>>,
    style_loaded: bool,
    basic_controls: bool,
    geocoder: bool,
}

impl<R: MapRenderer> MapSession<R> {
    /// Bind a renderer to `container`
    pub fn create(container: MapContainer, config: &MapConfig) -> MapResult<Self> {
        if config.access_token.trim().is_empty() {
            return Err(MapError::MissingAccessToken);
        }
        if !container.has_layout() {
            return Err(MapError::ContainerNotReady {
                width: container.width,
                height: container.height,
            });
        }

        let options = MapOptions {
            access_token: config.access_token.clone(),
            style_url: config.style_url.clone(),
            center: config.center,
            zoom: config.zoom,
        };
        let renderer = R::create(&container, &options)?;
        let style_loaded = renderer.is_style_loaded();

        tracing::info!(
            container = %container.id,
            width = container.width,
            height = container.height,
            "Map session created"
        );

        Ok(Self {
            renderer: Some(renderer),
            container,
            access_token: config.access_token.clone(),
            fly_to_zoom: config.fly_to_zoom,
            pending: Vec::new(),
            style_loaded,
            basic_controls: false,
            geocoder: false,
        })
    }

    pub fn container(&self) -> &MapContainer {
        &self.container
    }

    pub fn is_disposed(&self) -> bool {
        self.renderer.is_none()
    }

    pub fn renderer(&self) -> MapResult<&R> {
        self.renderer.as_ref().ok_or(MapError::Disposed)
    }

    pub fn renderer_mut(&mut self) -> MapResult<&mut R> {
        self.renderer.as_mut().ok_or(MapError::Disposed)
    }

    /// Renderer, only once the style is ready
    ///
    /// Callbacks still queued from before the style loaded run first.
    pub fn styled_renderer_mut(&mut self) -> MapResult<&mut R> {
        if !self.is_style_loaded() {
            return Err(if self.is_disposed() {
                MapError::Disposed
            } else {
                MapError::StyleNotLoaded
            });
        }
        self.flush_pending();
        self.renderer_mut()
    }

    pub fn is_style_loaded(&self) -> bool {
        match &self.renderer {
            Some(renderer) => self.style_loaded || renderer.is_style_loaded(),
            None => false,
        }
    }

    /// Number of callbacks waiting for the style
    pub fn pending_callbacks(&self) -> usize {
        self.pending.len()
    }

    /// Run `callback` now if the style is loaded, otherwise once it is
    pub fn on_style_load<F>(&mut self, callback: F) -> MapResult<()>
    where
        F: FnOnce(&mut R) + 'static,
    {
        if self.is_disposed() {
            return Err(MapError::Disposed);
        }
        if self.is_style_loaded() {
            callback(self.styled_renderer_mut()?);
        } else {
            self.pending.push(Box::new(callback));
        }
        Ok(())
    }

    /// Host hook for the renderer's style "load" event
    pub fn notify_style_loaded(&mut self) {
        if self.is_disposed() {
            tracing::debug!("Style load after destroy, ignored");
            return;
        }
        self.style_loaded = true;
        tracing::debug!(callbacks = self.pending.len(), "Map style loaded");
        self.flush_pending();
    }

    /// Run queued callbacks in FIFO order
    fn flush_pending(&mut self) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        for callback in std::mem::take(&mut self.pending) {
            callback(renderer);
        }
    }

    /// Navigation, scale, fullscreen and geolocate, added once
    pub fn add_basic_controls(&mut self) -> MapResult<()> {
        if self.basic_controls {
            return Ok(());
        }
        let renderer = self.renderer_mut()?;
        renderer.add_control(MapControl::Navigation, ControlPosition::TopRight);
        renderer.add_control(MapControl::Scale, ControlPosition::BottomLeft);
        renderer.add_control(MapControl::Fullscreen, ControlPosition::TopRight);
        renderer.add_control(MapControl::Geolocate, ControlPosition::TopRight);
        self.basic_controls = true;
        Ok(())
    }

    /// Place search bound to the session's access token, added once
    pub fn add_geocoder(&mut self) -> MapResult<()> {
        if self.geocoder {
            return Ok(());
        }
        let control = MapControl::Geocoder {
            access_token: self.access_token.clone(),
        };
        self.renderer_mut()?.add_control(control, ControlPosition::TopLeft);
        self.geocoder = true;
        Ok(())
    }

    pub fn resize(&mut self) -> MapResult<()> {
        self.renderer_mut()?.resize();
        Ok(())
    }

    /// Record a new container size; resizes only when it changed
    pub fn set_layout(&mut self, width: u32, height: u32) -> MapResult<bool> {
        if self.is_disposed() {
            return Err(MapError::Disposed);
        }
        if self.container.width == width && self.container.height == height {
            return Ok(false);
        }
        self.container.width = width;
        self.container.height = height;
        self.resize()?;
        Ok(true)
    }

    /// Remove every layer and source whose id starts with `prefix`
    pub fn remove_layers_and_sources(&mut self, prefix: &str) -> MapResult<usize> {
        sweep_prefix(self.renderer_mut()?, prefix)
    }

    /// Animated transition; `zoom` defaults to the configured fly-to zoom
    pub fn fly_to(&mut self, center: LngLat, zoom: Option<f64>) -> MapResult<()> {
        let zoom = zoom.unwrap_or(self.fly_to_zoom);
        self.renderer_mut()?.fly_to(center, zoom);
        Ok(())
    }

    /// Release the renderer; queued style callbacks are dropped
    pub fn destroy(&mut self) {
        let abandoned = self.pending.len();
        self.pending.clear();
        if let Some(mut renderer) = self.renderer.take() {
            renderer.remove();
            tracing::info!(container = %self.container.id, abandoned, "Map session destroyed");
        }
        self.style_loaded = false;
    }
}

impl<R: MapRenderer> Drop for MapSession<R> {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Layers go first, each removal guarded by an existence check
pub(crate) fn sweep_prefix<R: MapRenderer>(renderer: &mut R, prefix: &str) -> MapResult<usize> {
    let mut removed = 0;
    for id in renderer.layer_ids() {
        if id.starts_with(prefix) && renderer.has_layer(&id) {
            renderer.remove_layer(&id)?;
            removed += 1;
        }
    }
    for id in renderer.source_ids() {
        if id.starts_with(prefix) && renderer.has_source(&id) {
            renderer.remove_source(&id)?;
            removed += 1;
        }
    }
    Ok(removed)
}
