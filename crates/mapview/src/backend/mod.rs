//! The map surface abstraction and its two variants.
//!
//! Both variants place one marker per pin through the same
//! [`MarkerPresenter`], report `marker tapped` / `background tapped`, and
//! defer placement until their surface is ready.

use catalog::PinRecord;
use foundation::LngLat;
use layers::MarkerPresenter;
use tracing::debug;

use crate::config::MapOptions;
use crate::credential::AccessToken;
use crate::error::MapError;

pub mod camera;
pub mod native;
pub mod ready;
pub mod web;

pub use camera::{CameraFlight, SurfaceChrome};
pub use native::{MarkerDraw, NativeBackend, TapOutcome};
pub use ready::ReadyGate;
pub use web::WebBackend;

/// Camera state owned by a backend.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MapViewport {
    pub center: LngLat,
    pub zoom: f64,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Lifecycle {
    Created,
    Initialized,
    Failed,
    TornDown,
}

pub type MarkerTapHandler = Box<dyn FnMut(&str)>;
pub type BackgroundTapHandler = Box<dyn FnMut()>;
/// Receives a failure the surface reports after `initialize` returned.
pub type FailureHandler = Box<dyn FnMut(MapError)>;

/// Registered tap observers. Unregistered taps are dropped.
#[derive(Default)]
pub struct TapHandlers {
    marker: Option<MarkerTapHandler>,
    background: Option<BackgroundTapHandler>,
}

impl TapHandlers {
    pub fn set_marker(&mut self, handler: MarkerTapHandler) {
        self.marker = Some(handler);
    }

    pub fn set_background(&mut self, handler: BackgroundTapHandler) {
        self.background = Some(handler);
    }

    pub fn marker_tapped(&mut self, pin_id: &str) {
        debug!(pin_id, "marker tapped");
        if let Some(handler) = self.marker.as_mut() {
            handler(pin_id);
        }
    }

    pub fn background_tapped(&mut self) {
        debug!("background tapped");
        if let Some(handler) = self.background.as_mut() {
            handler();
        }
    }

    pub fn clear(&mut self) {
        self.marker = None;
        self.background = None;
    }
}

/// A placement request, kept until the surface is ready.
#[derive(Debug, Clone)]
pub struct Placement {
    pub pins: Vec<PinRecord>,
    pub presenter: MarkerPresenter,
}

/// Capability interface implemented by each rendering backend.
///
/// After `initialize` fails, every other call is a logged no-op;
/// `place_markers` also reports [`MapError::NotInitialized`].
pub trait MapBackend {
    fn kind(&self) -> BackendKind;

    fn initialize(&mut self, options: &MapOptions) -> Result<(), MapError>;

    /// Replaces all markers. Deferred until the surface is ready.
    fn place_markers(
        &mut self,
        pins: &[PinRecord],
        presenter: &MarkerPresenter,
    ) -> Result<(), MapError>;

    fn on_marker_tap(&mut self, handler: MarkerTapHandler);

    /// Never fires for taps that land on a marker.
    fn on_background_tap(&mut self, handler: BackgroundTapHandler);

    /// Surfaces whose startup completes inside `initialize` never call it.
    fn on_failure(&mut self, _handler: FailureHandler) {}

    /// Restyles markers after a selection change not caused by a tap.
    fn sync_selection(&mut self);

    fn viewport(&self) -> Option<MapViewport>;

    fn is_ready(&self) -> bool;

    fn marker_count(&self) -> usize;

    /// Releases every surface resource. Safe to call more than once.
    fn teardown(&mut self);
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BackendKind {
    Native,
    Web,
}

impl BackendKind {
    /// The variant for the platform this binary was built for.
    pub fn for_target() -> Self {
        if cfg!(target_arch = "wasm32") {
            BackendKind::Web
        } else {
            BackendKind::Native
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BackendKind::Native => "native",
            BackendKind::Web => "web",
        }
    }
}

pub fn create_backend(kind: BackendKind, token: AccessToken) -> PlatformBackend {
    debug!(backend = kind.name(), "creating map backend");
    match kind {
        BackendKind::Native => PlatformBackend::Native(NativeBackend::new(token)),
        BackendKind::Web => PlatformBackend::Web(WebBackend::new(token)),
    }
}

/// Either backend, chosen at startup.
pub enum PlatformBackend {
    Native(NativeBackend),
    Web(WebBackend),
}

impl PlatformBackend {
    pub fn as_native_mut(&mut self) -> Option<&mut NativeBackend> {
        match self {
            PlatformBackend::Native(b) => Some(b),
            PlatformBackend::Web(_) => None,
        }
    }

    pub fn as_native(&self) -> Option<&NativeBackend> {
        match self {
            PlatformBackend::Native(b) => Some(b),
            PlatformBackend::Web(_) => None,
        }
    }

    pub fn as_web_mut(&mut self) -> Option<&mut WebBackend> {
        match self {
            PlatformBackend::Web(b) => Some(b),
            PlatformBackend::Native(_) => None,
        }
    }

    fn inner(&self) -> &dyn MapBackend {
        match self {
            PlatformBackend::Native(b) => b as &dyn MapBackend,
            PlatformBackend::Web(b) => b as &dyn MapBackend,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn MapBackend {
        match self {
            PlatformBackend::Native(b) => b as &mut dyn MapBackend,
            PlatformBackend::Web(b) => b as &mut dyn MapBackend,
        }
    }
}

impl MapBackend for PlatformBackend {
    fn kind(&self) -> BackendKind {
        self.inner().kind()
    }

    fn initialize(&mut self, options: &MapOptions) -> Result<(), MapError> {
        self.inner_mut().initialize(options)
    }

    fn place_markers(
        &mut self,
        pins: &[PinRecord],
        presenter: &MarkerPresenter,
    ) -> Result<(), MapError> {
        self.inner_mut().place_markers(pins, presenter)
    }

    fn on_marker_tap(&mut self, handler: MarkerTapHandler) {
        self.inner_mut().on_marker_tap(handler)
    }

    fn on_background_tap(&mut self, handler: BackgroundTapHandler) {
        self.inner_mut().on_background_tap(handler)
    }

    fn on_failure(&mut self, handler: FailureHandler) {
        self.inner_mut().on_failure(handler)
    }

    fn sync_selection(&mut self) {
        self.inner_mut().sync_selection()
    }

    fn viewport(&self) -> Option<MapViewport> {
        self.inner().viewport()
    }

    fn is_ready(&self) -> bool {
        self.inner().is_ready()
    }

    fn marker_count(&self) -> usize {
        self.inner().marker_count()
    }

    fn teardown(&mut self) {
        self.inner_mut().teardown()
    }
}

/// Checks options shared by both variants before any surface is created.
pub(crate) fn validate_options(options: &MapOptions) -> Result<MapViewport, MapError> {
    if !options.center.is_valid() {
        return Err(MapError::BackendInit(format!(
            "camera center ({}, {}) is out of range",
            options.center.lng, options.center.lat
        )));
    }
    if !(0.0..=22.0).contains(&options.zoom) {
        return Err(MapError::BackendInit(format!(
            "zoom level {} is out of range",
            options.zoom
        )));
    }
    Ok(MapViewport {
        center: options.center,
        zoom: options.zoom,
    })
}

#[cfg(test)]
mod tests {
    use super::{BackendKind, MapBackend, TapHandlers, create_backend, validate_options};
    use crate::config::MapOptions;
    use crate::credential::AccessToken;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn token() -> AccessToken {
        AccessToken::new(Some("pk.test")).unwrap()
    }

    #[test]
    fn host_target_selects_native() {
        assert_eq!(BackendKind::for_target(), BackendKind::Native);
        let backend = create_backend(BackendKind::for_target(), token());
        assert_eq!(backend.kind(), BackendKind::Native);
        assert!(backend.as_native().is_some());
    }

    #[test]
    fn factory_builds_requested_variant() {
        let backend = create_backend(BackendKind::Web, token());
        assert_eq!(backend.kind(), BackendKind::Web);
    }

    #[test]
    fn handlers_route_to_registered_observers() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut handlers = TapHandlers::default();
        handlers.marker_tapped("ignored");

        let sink = Rc::clone(&log);
        handlers.set_marker(Box::new(move |id| sink.borrow_mut().push(id.to_string())));
        let sink = Rc::clone(&log);
        handlers.set_background(Box::new(move || sink.borrow_mut().push("<bg>".into())));

        handlers.marker_tapped("a");
        handlers.background_tapped();
        assert_eq!(*log.borrow(), vec!["a".to_string(), "<bg>".to_string()]);
    }

    #[test]
    fn rejects_out_of_range_camera() {
        let mut opts = MapOptions::default();
        opts.zoom = 30.0;
        assert!(validate_options(&opts).is_err());
        opts.zoom = 11.6;
        opts.center.lat = -95.0;
        assert!(validate_options(&opts).is_err());
    }
}
