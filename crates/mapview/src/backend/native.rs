use catalog::PinRecord;
use foundation::LngLat;
use foundation::math::{ScreenPoint, to_screen};
use layers::{MarkerPresenter, MarkerVisual, MountedMarker};
use runtime::frame::Frame;
use runtime::timeline::AnimationScheduler;
use scene::picking::{HitTarget, pick_target};
use tracing::{debug, info, warn};

use super::{
    BackendKind, BackgroundTapHandler, CameraFlight, Lifecycle, MapBackend, MapViewport,
    MarkerTapHandler, Placement, ReadyGate, SurfaceChrome, TapHandlers, validate_options,
};
use crate::config::MapOptions;
use crate::credential::AccessToken;
use crate::error::MapError;

/// One marker view on the native surface.
#[derive(Debug)]
struct MarkerView {
    coordinate: LngLat,
    mounted: MountedMarker,
}

/// A marker positioned and sampled for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerDraw {
    pub position: ScreenPoint,
    pub visual: MarkerVisual,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TapOutcome {
    Marker(String),
    Background,
    /// The surface is not mounted, so the tap was dropped.
    Ignored,
}

/// Retained-mode surface embedded by a native shell.
///
/// The shell mounts the surface once it has a size, forwards taps in surface
/// pixels, and calls [`NativeBackend::advance`] every display frame to get
/// the draw list. Markers are projected with Web-Mercator at the current
/// camera, which runs the configured initial transition from mount onwards;
/// each marker view owns its pulse timeline.
pub struct NativeBackend {
    token: AccessToken,
    lifecycle: Lifecycle,
    flight: Option<CameraFlight>,
    chrome: Option<SurfaceChrome>,
    size: (f64, f64),
    gate: ReadyGate<Placement>,
    presenter: Option<MarkerPresenter>,
    markers: Vec<MarkerView>,
    scheduler: AnimationScheduler,
    clock: Frame,
    handlers: TapHandlers,
}

impl NativeBackend {
    pub fn new(token: AccessToken) -> Self {
        Self {
            token,
            lifecycle: Lifecycle::Created,
            flight: None,
            chrome: None,
            size: (0.0, 0.0),
            gate: ReadyGate::new(),
            presenter: None,
            markers: Vec::new(),
            scheduler: AnimationScheduler::new(),
            clock: Frame::first(),
            handlers: TapHandlers::default(),
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Ornaments the shell should draw, once initialized.
    pub fn chrome(&self) -> Option<SurfaceChrome> {
        self.chrome
    }

    /// Attaches the surface to a `width` x `height` view. This is the ready signal.
    pub fn mount(&mut self, width: f64, height: f64) {
        if self.lifecycle != Lifecycle::Initialized {
            warn!(lifecycle = ?self.lifecycle, "mount ignored");
            return;
        }
        self.size = (width, height);
        if self.gate.is_ready() {
            return;
        }
        info!(width, height, "native surface mounted");
        let now = self.clock.time;
        if let Some(flight) = self.flight.as_mut() {
            flight.start(now);
        }
        if let Some(placement) = self.gate.open() {
            self.apply(placement);
        }
    }

    /// Screen position of a placed marker.
    pub fn marker_position(&self, pin_id: &str) -> Option<ScreenPoint> {
        let view = self
            .markers
            .iter()
            .find(|m| m.mounted.pin_id() == pin_id)?;
        self.project(view.coordinate)
    }

    /// Routes a tap to the marker under `point`, or to the background.
    ///
    /// Handlers and the marker restyle both complete before this returns.
    pub fn tap(&mut self, point: ScreenPoint) -> TapOutcome {
        if !self.is_ready() {
            return TapOutcome::Ignored;
        }
        let targets = self.hit_targets();
        let outcome = match pick_target(&targets, point) {
            Some(idx) => {
                let pin_id = self.markers[idx].mounted.pin_id().to_string();
                self.handlers.marker_tapped(&pin_id);
                TapOutcome::Marker(pin_id)
            }
            None => {
                self.handlers.background_tapped();
                TapOutcome::Background
            }
        };
        self.sync_selection();
        outcome
    }

    /// Moves the surface clock to `frame` and returns that frame's draw list.
    pub fn advance(&mut self, frame: Frame) -> Vec<MarkerDraw> {
        self.clock = frame;
        self.draw_list()
    }

    /// Markers in draw order (later entries on top), sampled at the current clock.
    pub fn draw_list(&self) -> Vec<MarkerDraw> {
        let Some(presenter) = &self.presenter else {
            return Vec::new();
        };
        self.markers
            .iter()
            .filter_map(|m| {
                let visual = presenter.visual(&m.mounted, self.clock.time)?;
                let position = self.project(m.coordinate)?;
                Some(MarkerDraw { position, visual })
            })
            .collect()
    }

    /// Number of pulse timelines still scheduled on this surface.
    pub fn active_pulses(&self) -> usize {
        self.scheduler.active_count()
    }

    fn camera(&self) -> Option<MapViewport> {
        self.flight.map(|f| f.at(self.clock.time))
    }

    fn project(&self, c: LngLat) -> Option<ScreenPoint> {
        let vp = self.camera()?;
        Some(to_screen(c, vp.center, vp.zoom, self.size.0, self.size.1))
    }

    fn hit_targets(&self) -> Vec<HitTarget> {
        let Some(presenter) = &self.presenter else {
            return Vec::new();
        };
        let half_extent = f64::from(presenter.theme().hit_size_px) / 2.0;
        self.markers
            .iter()
            .filter_map(|m| {
                Some(HitTarget {
                    center: self.project(m.coordinate)?,
                    half_extent,
                })
            })
            .collect()
    }

    fn apply(&mut self, placement: Placement) {
        // Old views drop here, cancelling their pulses.
        self.markers.clear();
        let now = self.clock.time;
        let Placement { pins, presenter } = placement;
        self.markers = pins
            .iter()
            .map(|pin| MarkerView {
                coordinate: pin.coordinate,
                mounted: presenter.mount(pin.id.clone(), &self.scheduler, now),
            })
            .collect();
        debug!(markers = self.markers.len(), "native markers placed");
        self.presenter = Some(presenter);
    }
}

impl MapBackend for NativeBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Native
    }

    fn initialize(&mut self, options: &MapOptions) -> Result<(), MapError> {
        if self.lifecycle != Lifecycle::Created {
            return Err(MapError::BackendInit(format!(
                "surface already {:?}",
                self.lifecycle
            )));
        }
        let viewport = match validate_options(options) {
            Ok(vp) => vp,
            Err(err) => {
                self.lifecycle = Lifecycle::Failed;
                return Err(err);
            }
        };
        let flight = CameraFlight::new(viewport, options.transition);
        info!(
            token = ?self.token,
            style = %options.style_url,
            transition = ?options.transition,
            zoom = viewport.zoom,
            lng = viewport.center.lng,
            lat = viewport.center.lat,
            "native map initialized"
        );
        self.flight = Some(flight);
        self.chrome = Some(SurfaceChrome::from(options));
        self.lifecycle = Lifecycle::Initialized;
        Ok(())
    }

    fn place_markers(
        &mut self,
        pins: &[PinRecord],
        presenter: &MarkerPresenter,
    ) -> Result<(), MapError> {
        if self.lifecycle != Lifecycle::Initialized {
            warn!(lifecycle = ?self.lifecycle, "place_markers ignored");
            return Err(MapError::NotInitialized);
        }
        let placement = Placement {
            pins: pins.to_vec(),
            presenter: presenter.clone(),
        };
        match self.gate.submit(placement) {
            Some(placement) => self.apply(placement),
            None => debug!(pins = pins.len(), "marker placement deferred until mount"),
        }
        Ok(())
    }

    fn on_marker_tap(&mut self, handler: MarkerTapHandler) {
        self.handlers.set_marker(handler);
    }

    fn on_background_tap(&mut self, handler: BackgroundTapHandler) {
        self.handlers.set_background(handler);
    }

    fn sync_selection(&mut self) {
        let Some(presenter) = &self.presenter else {
            return;
        };
        let restyled = self
            .markers
            .iter_mut()
            .map(|m| m.mounted.restyle(presenter))
            .filter(|changed| *changed)
            .count();
        if restyled > 0 {
            debug!(restyled, "native markers restyled");
        }
    }

    fn viewport(&self) -> Option<MapViewport> {
        self.camera()
    }

    fn is_ready(&self) -> bool {
        self.lifecycle == Lifecycle::Initialized && self.gate.is_ready()
    }

    fn marker_count(&self) -> usize {
        self.markers.len()
    }

    fn teardown(&mut self) {
        if self.lifecycle == Lifecycle::TornDown {
            return;
        }
        self.markers.clear();
        self.presenter = None;
        self.gate.close();
        self.handlers.clear();
        self.flight = None;
        self.lifecycle = Lifecycle::TornDown;
        info!("native surface torn down");
    }
}

impl Drop for NativeBackend {
    fn drop(&mut self) {
        self.teardown();
    }
}
