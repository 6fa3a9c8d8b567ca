use std::cell::RefCell;
use std::rc::Rc;

use catalog::PinCatalog;
use layers::MarkerPresenter;
use scene::overlay::{DetailCard, project_detail};
use scene::selection::{SelectionController, SelectionListener, SelectionReader, SelectionState};
use tracing::{debug, info};

use crate::backend::{BackendKind, FailureHandler, MapBackend, PlatformBackend, create_backend};
use crate::config::{AppConfig, MapOptions};
use crate::credential::{CredentialGate, FallbackView, GateDecision};
use crate::error::MapError;

/// What a host shows after mounting.
pub enum Mounted {
    Map(MapSession),
    Fallback(FallbackView),
}

/// A mounted map: backend, selection state and overlay wired together.
///
/// Taps reach the controller through the backend's handlers; the backend
/// restyles its markers and the overlay is recomputed from the same state
/// before the tap handler returns.
pub struct MapSession {
    catalog: Rc<PinCatalog>,
    controller: Rc<RefCell<SelectionController>>,
    selection: SelectionReader,
    backend: PlatformBackend,
    torn_down: bool,
}

impl MapSession {
    /// Gates on the credential, then builds the backend for `kind` and mounts it.
    pub fn mount(
        config: &AppConfig,
        catalog: Rc<PinCatalog>,
        kind: BackendKind,
    ) -> Result<Mounted, MapError> {
        let token = match CredentialGate::check(config) {
            GateDecision::Proceed(token) => token,
            GateDecision::Fallback(view) => return Ok(Mounted::Fallback(view)),
        };
        let backend = create_backend(kind, token);
        Self::mount_with(backend, catalog, &config.map).map(Mounted::Map)
    }

    /// Mounts onto an already constructed backend.
    pub fn mount_with(
        mut backend: PlatformBackend,
        catalog: Rc<PinCatalog>,
        options: &MapOptions,
    ) -> Result<Self, MapError> {
        backend.initialize(options)?;

        let controller = SelectionController::for_catalog(&catalog);
        let selection = controller.reader();
        let controller = Rc::new(RefCell::new(controller));

        let ctl = Rc::clone(&controller);
        backend.on_marker_tap(Box::new(move |pin_id| {
            ctl.borrow_mut().select(pin_id);
        }));
        let ctl = Rc::clone(&controller);
        backend.on_background_tap(Box::new(move || {
            ctl.borrow_mut().clear();
        }));

        let presenter = MarkerPresenter::new(selection.clone());
        backend.place_markers(catalog.all(), &presenter)?;

        let initial = selection.get();
        info!(
            backend = backend.kind().name(),
            pins = catalog.len(),
            selected = ?initial.selected_id(),
            "map session mounted"
        );
        Ok(Self {
            catalog,
            controller,
            selection,
            backend,
            torn_down: false,
        })
    }

    pub fn catalog(&self) -> &PinCatalog {
        &self.catalog
    }

    pub fn selection(&self) -> SelectionState {
        self.selection.get()
    }

    pub fn selection_reader(&self) -> SelectionReader {
        self.selection.clone()
    }

    /// Card for the current selection, if any.
    pub fn overlay(&self) -> Option<DetailCard> {
        project_detail(&self.selection.get(), &self.catalog)
    }

    /// Registers a listener that runs synchronously after every transition.
    ///
    /// Listeners may read the session's selection and overlay but must not
    /// select or clear from inside the callback.
    pub fn subscribe(&self, listener: SelectionListener) {
        self.controller.borrow_mut().subscribe(listener);
    }

    /// Called if the surface fails after mounting, e.g. a browser map whose
    /// token is rejected before the first `load`.
    pub fn on_failure(&mut self, handler: FailureHandler) {
        self.backend.on_failure(handler);
    }

    /// Programmatic selection. Ids outside the catalog are rejected.
    pub fn select_pin(&mut self, pin_id: &str) -> Result<(), MapError> {
        if !self.catalog.contains(pin_id) {
            return Err(MapError::UnknownPin(pin_id.to_string()));
        }
        self.controller.borrow_mut().select(pin_id);
        self.backend.sync_selection();
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.controller.borrow_mut().clear();
        self.backend.sync_selection();
    }

    pub fn backend(&self) -> &PlatformBackend {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut PlatformBackend {
        &mut self.backend
    }

    /// Releases the backend. Safe to call more than once; also runs on drop.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.backend.teardown();
        self.torn_down = true;
        debug!("map session torn down");
    }
}

impl Drop for MapSession {
    fn drop(&mut self) {
        self.teardown();
    }
}
