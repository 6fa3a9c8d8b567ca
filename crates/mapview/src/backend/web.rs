use std::cell::RefCell;
use std::rc::Rc;

use catalog::PinRecord;
use layers::MarkerPresenter;
use tracing::{info, warn};

use super::{
    BackendKind, BackgroundTapHandler, FailureHandler, Lifecycle, MapBackend, MapViewport,
    MarkerTapHandler, TapHandlers, validate_options,
};
use crate::config::MapOptions;
use crate::credential::AccessToken;
use crate::error::MapError;

/// Browser surface backed by Mapbox GL JS.
///
/// Markers are DOM buttons animated by a generated stylesheet. Placement waits
/// for the map's `load` event, which arrives asynchronously after `initialize`.
/// A map `error` before `load` (rejected token, unreachable style) fails the
/// surface and is reported to the [`FailureHandler`].
pub struct WebBackend {
    token: AccessToken,
    container_id: String,
    lifecycle: Lifecycle,
    viewport: Option<MapViewport>,
    handlers: Rc<RefCell<TapHandlers>>,
    failure: Rc<RefCell<Option<FailureHandler>>>,
    surface: Option<imp::WebSurface>,
}

/// Element id the map mounts into unless the host picks another.
pub const DEFAULT_CONTAINER_ID: &str = "atlas-map";

impl WebBackend {
    pub fn new(token: AccessToken) -> Self {
        Self::with_container(token, DEFAULT_CONTAINER_ID)
    }

    pub fn with_container(token: AccessToken, container_id: impl Into<String>) -> Self {
        Self {
            token,
            container_id: container_id.into(),
            lifecycle: Lifecycle::Created,
            viewport: None,
            handlers: Rc::new(RefCell::new(TapHandlers::default())),
            failure: Rc::new(RefCell::new(None)),
            surface: None,
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        match &self.surface {
            Some(surface) if surface.has_failed() => Lifecycle::Failed,
            _ => self.lifecycle,
        }
    }

    pub fn set_container(&mut self, container_id: impl Into<String>) {
        self.container_id = container_id.into();
    }
}

impl MapBackend for WebBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Web
    }

    fn initialize(&mut self, options: &MapOptions) -> Result<(), MapError> {
        if self.lifecycle != Lifecycle::Created {
            return Err(MapError::BackendInit(format!(
                "surface already {:?}",
                self.lifecycle
            )));
        }
        let opened = validate_options(options).and_then(|viewport| {
            let surface = imp::WebSurface::open(
                &self.container_id,
                &self.token,
                options,
                Rc::clone(&self.handlers),
                Rc::clone(&self.failure),
            )?;
            Ok((viewport, surface))
        });
        match opened {
            Ok((viewport, surface)) => {
                info!(container = %self.container_id, style = %options.style_url, "web map created");
                self.viewport = Some(viewport);
                self.surface = Some(surface);
                self.lifecycle = Lifecycle::Initialized;
                Ok(())
            }
            Err(err) => {
                warn!(%err, "web map failed to start");
                self.lifecycle = Lifecycle::Failed;
                Err(err)
            }
        }
    }

    fn place_markers(
        &mut self,
        pins: &[PinRecord],
        presenter: &MarkerPresenter,
    ) -> Result<(), MapError> {
        match self.surface.as_ref() {
            Some(surface) if !surface.has_failed() => {
                surface.place(pins, presenter);
                Ok(())
            }
            _ => {
                warn!(lifecycle = ?self.lifecycle(), "place_markers ignored");
                Err(MapError::NotInitialized)
            }
        }
    }

    fn on_marker_tap(&mut self, handler: MarkerTapHandler) {
        self.handlers.borrow_mut().set_marker(handler);
    }

    fn on_background_tap(&mut self, handler: BackgroundTapHandler) {
        self.handlers.borrow_mut().set_background(handler);
    }

    fn on_failure(&mut self, handler: FailureHandler) {
        *self.failure.borrow_mut() = Some(handler);
    }

    fn sync_selection(&mut self) {
        if let Some(surface) = self.surface.as_ref() {
            surface.restyle();
        }
    }

    fn viewport(&self) -> Option<MapViewport> {
        self.viewport
    }

    fn is_ready(&self) -> bool {
        self.surface.as_ref().is_some_and(|s| s.is_ready())
    }

    fn marker_count(&self) -> usize {
        self.surface.as_ref().map_or(0, |s| s.marker_count())
    }

    fn teardown(&mut self) {
        if self.lifecycle == Lifecycle::TornDown {
            return;
        }
        if let Some(surface) = self.surface.take() {
            surface.close();
        }
        self.handlers.borrow_mut().clear();
        self.failure.borrow_mut().take();
        self.viewport = None;
        self.lifecycle = Lifecycle::TornDown;
        info!("web surface torn down");
    }
}

impl Drop for WebBackend {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Error reported when the map gives up before its first `load`.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
fn load_failure(detail: Option<&str>) -> MapError {
    match detail.map(str::trim).filter(|d| !d.is_empty()) {
        Some(detail) => MapError::BackendInit(format!("map did not load: {detail}")),
        None => MapError::BackendInit("map did not load".to_string()),
    }
}

/// Hands `err` to the registered failure handler, at most once.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
fn report_failure(failure: &RefCell<Option<FailureHandler>>, err: MapError) {
    warn!(%err, "web map failed after initialize");
    let handler = failure.borrow_mut().take();
    if let Some(mut handler) = handler {
        handler(err);
    }
}

#[cfg(target_arch = "wasm32")]
mod imp {
    use std::cell::RefCell;
    use std::rc::{Rc, Weak};

    use catalog::PinRecord;
    use js_sys::{Array, Function, Object, Reflect};
    use layers::MarkerPresenter;
    use layers::stylesheet::{CORE_CLASS, PIN_CLASS, PULSE_CLASS, SELECTED_CLASS};
    use tracing::{debug, warn};
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, Event};

    use super::{load_failure, report_failure};
    use crate::backend::{
        CameraFlight, FailureHandler, MapViewport, Placement, ReadyGate, TapHandlers,
    };
    use crate::config::MapOptions;
    use crate::credential::AccessToken;
    use crate::error::MapError;

    const STYLE_ELEMENT_ID: &str = "atlas-pin-styles";

    #[wasm_bindgen(js_namespace = mapboxgl)]
    extern "C" {
        #[wasm_bindgen(js_name = Map)]
        #[derive(Clone)]
        type MapboxMap;

        #[wasm_bindgen(constructor, js_class = "Map", catch)]
        fn new(options: &Object) -> Result<MapboxMap, JsValue>;

        #[wasm_bindgen(method)]
        fn on(this: &MapboxMap, event: &str, listener: &Function);

        #[wasm_bindgen(method, js_name = remove)]
        fn destroy(this: &MapboxMap);

        #[wasm_bindgen(method, js_name = flyTo)]
        fn fly_to(this: &MapboxMap, options: &Object);

        #[wasm_bindgen(method, js_name = addControl)]
        fn add_control(this: &MapboxMap, control: &NavigationControl);

        #[wasm_bindgen(js_name = NavigationControl)]
        type NavigationControl;

        #[wasm_bindgen(constructor, js_class = "NavigationControl")]
        fn new(options: &Object) -> NavigationControl;

        #[wasm_bindgen(js_name = Marker)]
        type MapboxMarker;

        #[wasm_bindgen(constructor, js_class = "Marker")]
        fn new(options: &Object) -> MapboxMarker;

        #[wasm_bindgen(method, js_name = setLngLat)]
        fn set_lng_lat(this: &MapboxMarker, lng_lat: &Array) -> MapboxMarker;

        #[wasm_bindgen(method, js_name = addTo)]
        fn add_to(this: &MapboxMarker, map: &MapboxMap) -> MapboxMarker;

        #[wasm_bindgen(method, js_name = remove)]
        fn detach(this: &MapboxMarker) -> MapboxMarker;
    }

    fn js_err(err: JsValue) -> MapError {
        MapError::BackendInit(err.as_string().unwrap_or_else(|| format!("{err:?}")))
    }

    fn document() -> Result<Document, MapError> {
        web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| MapError::BackendInit("no browser document".into()))
    }

    fn set(obj: &Object, key: &str, value: impl Into<JsValue>) -> Result<(), MapError> {
        Reflect::set(obj, &JsValue::from_str(key), &value.into())
            .map(|_| ())
            .map_err(js_err)
    }

    fn lng_lat(c: foundation::LngLat) -> Array {
        Array::of2(&JsValue::from_f64(c.lng), &JsValue::from_f64(c.lat))
    }

    fn set_access_token(token: &AccessToken) -> Result<(), MapError> {
        let ns = Reflect::get(&js_sys::global(), &JsValue::from_str("mapboxgl")).map_err(js_err)?;
        if ns.is_undefined() {
            return Err(MapError::BackendInit("mapboxgl is not loaded".into()));
        }
        Reflect::set(&ns, &JsValue::from_str("accessToken"), &JsValue::from_str(token.as_str()))
            .map(|_| ())
            .map_err(js_err)
    }

    fn install_stylesheet(doc: &Document, presenter: &MarkerPresenter) -> Result<(), MapError> {
        if doc.get_element_by_id(STYLE_ELEMENT_ID).is_some() {
            return Ok(());
        }
        let style = doc.create_element("style").map_err(js_err)?;
        style.set_id(STYLE_ELEMENT_ID);
        style.set_text_content(Some(&presenter.stylesheet()));
        let head = doc
            .head()
            .ok_or_else(|| MapError::BackendInit("document has no <head>".into()))?;
        head.append_child(&style).map_err(js_err)?;
        Ok(())
    }

    /// One `mapboxgl.Marker` and its DOM. Dropping it removes the marker, which
    /// also ends its CSS pulse.
    struct DomMarker {
        pin_id: String,
        element: Element,
        marker: MapboxMarker,
        _on_click: Closure<dyn FnMut(Event)>,
    }

    impl DomMarker {
        fn restyle(&self, presenter: &MarkerPresenter) {
            let selected = presenter.is_selected(&self.pin_id);
            if let Err(err) = self
                .element
                .class_list()
                .toggle_with_force(SELECTED_CLASS, selected)
            {
                warn!(?err, pin_id = %self.pin_id, "marker restyle failed");
            }
        }
    }

    impl Drop for DomMarker {
        fn drop(&mut self) {
            self.marker.detach();
        }
    }

    struct Shared {
        map: MapboxMap,
        flight: CameraFlight,
        failed: bool,
        failure: Rc<RefCell<Option<FailureHandler>>>,
        gate: ReadyGate<Placement>,
        presenter: Option<MarkerPresenter>,
        markers: Vec<DomMarker>,
        handlers: Rc<RefCell<TapHandlers>>,
        on_background: Option<Closure<dyn FnMut(JsValue)>>,
    }

    pub struct WebSurface {
        shared: Rc<RefCell<Shared>>,
        _on_load: Closure<dyn FnMut()>,
        _on_error: Closure<dyn FnMut(JsValue)>,
    }

    impl WebSurface {
        pub fn open(
            container_id: &str,
            token: &AccessToken,
            options: &MapOptions,
            handlers: Rc<RefCell<TapHandlers>>,
            failure: Rc<RefCell<Option<FailureHandler>>>,
        ) -> Result<Self, MapError> {
            set_access_token(token)?;

            let target = MapViewport {
                center: options.center,
                zoom: options.zoom,
            };
            let flight = CameraFlight::new(target, options.transition);
            let start = flight.start_viewport();

            // GL JS always draws its logo; `show_logo` only affects native shells.
            let opts = Object::new();
            set(&opts, "container", container_id)?;
            set(&opts, "style", options.style_url.as_str())?;
            set(&opts, "center", lng_lat(start.center))?;
            set(&opts, "zoom", start.zoom)?;
            set(&opts, "attributionControl", options.show_attribution)?;
            let map = MapboxMap::new(&opts).map_err(js_err)?;

            if options.show_compass {
                let nav = Object::new();
                set(&nav, "showCompass", true)?;
                set(&nav, "showZoom", false)?;
                map.add_control(&NavigationControl::new(&nav));
            }

            let shared = Rc::new(RefCell::new(Shared {
                map: map.clone(),
                flight,
                failed: false,
                failure,
                gate: ReadyGate::new(),
                presenter: None,
                markers: Vec::new(),
                handlers,
                on_background: None,
            }));

            let weak = Rc::downgrade(&shared);
            let on_error = Closure::<dyn FnMut(JsValue)>::new(move |event: JsValue| {
                if let Some(shared) = weak.upgrade() {
                    on_map_error(&shared, &event);
                }
            });
            map.on("error", on_error.as_ref().unchecked_ref());

            let weak = Rc::downgrade(&shared);
            let on_load = Closure::<dyn FnMut()>::new(move || {
                if let Some(shared) = weak.upgrade() {
                    on_map_load(&shared);
                }
            });
            map.on("load", on_load.as_ref().unchecked_ref());

            Ok(Self {
                shared,
                _on_load: on_load,
                _on_error: on_error,
            })
        }

        pub fn place(&self, pins: &[PinRecord], presenter: &MarkerPresenter) {
            let placement = Placement {
                pins: pins.to_vec(),
                presenter: presenter.clone(),
            };
            let ready = self.shared.borrow_mut().gate.submit(placement);
            match ready {
                Some(placement) => apply(&self.shared, placement),
                None => debug!(pins = pins.len(), "marker placement deferred until load"),
            }
        }

        pub fn restyle(&self) {
            restyle(&self.shared);
        }

        pub fn is_ready(&self) -> bool {
            self.shared.borrow().gate.is_ready()
        }

        pub fn has_failed(&self) -> bool {
            self.shared.borrow().failed
        }

        pub fn marker_count(&self) -> usize {
            self.shared.borrow().markers.len()
        }

        pub fn close(self) {
            let map = {
                let mut shared = self.shared.borrow_mut();
                shared.markers.clear();
                shared.gate.close();
                shared.presenter = None;
                shared.map.clone()
            };
            map.destroy();
        }
    }

    /// Before `load`, any map error is fatal; afterwards it is only logged.
    fn on_map_error(shared: &Rc<RefCell<Shared>>, event: &JsValue) {
        let detail = Reflect::get(event, &JsValue::from_str("error"))
            .ok()
            .and_then(|e| Reflect::get(&e, &JsValue::from_str("message")).ok())
            .and_then(|m| m.as_string());
        let failure = {
            let mut s = shared.borrow_mut();
            if s.gate.is_ready() || s.failed {
                warn!(detail = ?detail, "web map error");
                return;
            }
            s.failed = true;
            s.gate.close();
            s.markers.clear();
            Rc::clone(&s.failure)
        };
        report_failure(&failure, load_failure(detail.as_deref()));
    }

    fn on_map_load(shared: &Rc<RefCell<Shared>>) {
        if shared.borrow().failed {
            return;
        }
        debug!("web map loaded");
        let weak = Rc::downgrade(shared);
        let on_click = Closure::<dyn FnMut(JsValue)>::new(move |event: JsValue| {
            if landed_on_marker(&event) {
                return;
            }
            if let Some(shared) = weak.upgrade() {
                let handlers = Rc::clone(&shared.borrow().handlers);
                handlers.borrow_mut().background_tapped();
                restyle(&shared);
            }
        });
        let pending = {
            let mut s = shared.borrow_mut();
            s.map.on("click", on_click.as_ref().unchecked_ref());
            s.on_background = Some(on_click);
            fly_in(&s.map, &s.flight);
            s.gate.open()
        };
        if let Some(placement) = pending {
            apply(shared, placement);
        }
    }

    fn fly_in(map: &MapboxMap, flight: &CameraFlight) {
        if !flight.is_animated() {
            return;
        }
        let target = flight.target();
        let opts = Object::new();
        let applied = set(&opts, "center", lng_lat(target.center))
            .and_then(|_| set(&opts, "zoom", target.zoom))
            .and_then(|_| set(&opts, "duration", flight.duration_s() * 1000.0));
        match applied {
            Ok(()) => map.fly_to(&opts),
            Err(err) => warn!(%err, "initial fly-to skipped"),
        }
    }

    /// Mapbox map events carry the DOM event as `originalEvent`.
    fn landed_on_marker(event: &JsValue) -> bool {
        Reflect::get(event, &JsValue::from_str("originalEvent"))
            .ok()
            .and_then(|e| Reflect::get(&e, &JsValue::from_str("target")).ok())
            .and_then(|t| t.dyn_into::<Element>().ok())
            .and_then(|el| el.closest(&format!(".{PIN_CLASS}")).ok().flatten())
            .is_some()
    }

    fn apply(shared: &Rc<RefCell<Shared>>, placement: Placement) {
        let doc = match document() {
            Ok(doc) => doc,
            Err(err) => {
                warn!(%err, "cannot place markers");
                return;
            }
        };
        if let Err(err) = install_stylesheet(&doc, &placement.presenter) {
            warn!(%err, "marker stylesheet not installed");
        }

        let (map, handlers) = {
            let mut s = shared.borrow_mut();
            s.markers.clear();
            (s.map.clone(), Rc::clone(&s.handlers))
        };

        let mut markers = Vec::with_capacity(placement.pins.len());
        for pin in &placement.pins {
            match build_marker(&doc, &map, pin, shared, &handlers) {
                Ok(marker) => {
                    marker.restyle(&placement.presenter);
                    markers.push(marker);
                }
                Err(err) => warn!(%err, pin_id = %pin.id, "marker not placed"),
            }
        }
        debug!(markers = markers.len(), "web markers placed");

        let mut s = shared.borrow_mut();
        s.markers = markers;
        s.presenter = Some(placement.presenter);
    }

    fn build_marker(
        doc: &Document,
        map: &MapboxMap,
        pin: &PinRecord,
        shared: &Rc<RefCell<Shared>>,
        handlers: &Rc<RefCell<TapHandlers>>,
    ) -> Result<DomMarker, MapError> {
        let pulse = doc.create_element("div").map_err(js_err)?;
        pulse.set_class_name(PULSE_CLASS);
        let core = doc.create_element("div").map_err(js_err)?;
        core.set_class_name(CORE_CLASS);

        let button = doc.create_element("button").map_err(js_err)?;
        button.set_class_name(PIN_CLASS);
        button.set_attribute("type", "button").map_err(js_err)?;
        button.set_attribute("aria-label", &pin.title).map_err(js_err)?;
        button.append_child(&pulse).map_err(js_err)?;
        button.append_child(&core).map_err(js_err)?;

        let pin_id = pin.id.clone();
        let weak: Weak<RefCell<Shared>> = Rc::downgrade(shared);
        let handlers = Rc::clone(handlers);
        let on_click = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            event.stop_propagation();
            handlers.borrow_mut().marker_tapped(&pin_id);
            if let Some(shared) = weak.upgrade() {
                restyle(&shared);
            }
        });
        button
            .add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())
            .map_err(js_err)?;

        let opts = Object::new();
        set(&opts, "element", JsValue::from(button.clone()))?;
        set(&opts, "anchor", "center")?;
        let marker = MapboxMarker::new(&opts);
        marker.set_lng_lat(&lng_lat(pin.coordinate));
        marker.add_to(map);

        Ok(DomMarker {
            pin_id: pin.id.clone(),
            element: button,
            marker,
            _on_click: on_click,
        })
    }

    fn restyle(shared: &Rc<RefCell<Shared>>) {
        let s = shared.borrow();
        if let Some(presenter) = &s.presenter {
            for marker in &s.markers {
                marker.restyle(presenter);
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod imp {
    use std::cell::RefCell;
    use std::rc::Rc;

    use catalog::PinRecord;
    use layers::MarkerPresenter;

    use crate::backend::{FailureHandler, TapHandlers};
    use crate::config::MapOptions;
    use crate::credential::AccessToken;
    use crate::error::MapError;

    /// No browser surface exists off wasm32; `open` always fails.
    pub enum WebSurface {}

    impl WebSurface {
        pub fn open(
            _container_id: &str,
            _token: &AccessToken,
            _options: &MapOptions,
            _handlers: Rc<RefCell<TapHandlers>>,
            _failure: Rc<RefCell<Option<FailureHandler>>>,
        ) -> Result<Self, MapError> {
            Err(MapError::Unsupported("web"))
        }

        pub fn place(&self, _pins: &[PinRecord], _presenter: &MarkerPresenter) {
            match *self {}
        }

        pub fn restyle(&self) {
            match *self {}
        }

        pub fn is_ready(&self) -> bool {
            match *self {}
        }

        pub fn has_failed(&self) -> bool {
            match *self {}
        }

        pub fn marker_count(&self) -> usize {
            match *self {}
        }

        pub fn close(self) {
            match self {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{WebBackend, load_failure, report_failure};
    use crate::backend::{FailureHandler, Lifecycle, MapBackend};
    use crate::config::MapOptions;
    use crate::credential::AccessToken;
    use crate::error::MapError;
    use catalog::PinCatalog;
    use layers::MarkerPresenter;
    use scene::selection::SelectionController;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn off_wasm_initialize_reports_unsupported() {
        let mut b = WebBackend::new(AccessToken::new(Some("pk.test")).unwrap());
        assert_eq!(
            b.initialize(&MapOptions::default()),
            Err(MapError::Unsupported("web"))
        );
        assert_eq!(b.lifecycle(), Lifecycle::Failed);

        let catalog = PinCatalog::seeded();
        let ctl = SelectionController::for_catalog(&catalog);
        assert_eq!(
            b.place_markers(catalog.all(), &MarkerPresenter::new(ctl.reader())),
            Err(MapError::NotInitialized)
        );
        assert!(!b.is_ready());
        assert_eq!(b.marker_count(), 0);

        b.teardown();
        b.teardown();
        assert_eq!(b.lifecycle(), Lifecycle::TornDown);
    }

    #[test]
    fn load_failure_carries_map_error_text() {
        assert_eq!(
            load_failure(Some("Unauthorized: invalid access token")),
            MapError::BackendInit("map did not load: Unauthorized: invalid access token".into())
        );
        assert_eq!(
            load_failure(Some("  ")),
            MapError::BackendInit("map did not load".into())
        );
        assert_eq!(load_failure(None), MapError::BackendInit("map did not load".into()));
    }

    #[test]
    fn failure_reaches_handler_once() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let handler: FailureHandler = Box::new(move |err| sink.borrow_mut().push(err));
        let slot = RefCell::new(Some(handler));

        report_failure(&slot, load_failure(Some("style 404")));
        report_failure(&slot, load_failure(None));
        assert_eq!(
            *seen.borrow(),
            vec![MapError::BackendInit("map did not load: style 404".into())]
        );
        assert!(slot.borrow().is_none());
    }
}
