use std::cell::RefCell;
use std::rc::Rc;

use catalog::PinCatalog;
use console_error_panic_hook::set_once;
use mapview::{
    AppConfig, BackendKind, CredentialGate, FallbackView, GateDecision, MapSession,
    create_backend,
};
use scene::overlay::project_detail;
use wasm_bindgen::prelude::*;

mod dom;
use dom::TextBlock;

pub struct ViewerState {
    pub session: MapSession,
}

thread_local! {
    static STATE: RefCell<Option<ViewerState>> = const { RefCell::new(None) };
}

fn log(msg: &str) {
    web_sys::console::log_1(&JsValue::from_str(msg));
}

fn show_fallback(container_id: &str, view: &FallbackView) -> Result<(), JsValue> {
    let doc = dom::document()?;
    let host = dom::element(&doc, container_id)?;
    dom::render(&doc, &host, Some(&TextBlock::fallback(view)))
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    set_once();
    Ok(())
}

/// Mounts the map into `container_id` and the detail card into `overlay_id`.
///
/// Without a usable token, or when the map cannot start, the container shows
/// a fallback message instead and this still returns `Ok`. A map that fails
/// while loading replaces itself with the same fallback later.
#[wasm_bindgen]
pub fn mount(container_id: &str, overlay_id: &str, token: Option<String>) -> Result<(), JsValue> {
    unmount();

    let config = AppConfig::with_token(token);
    let token = match CredentialGate::check(&config) {
        GateDecision::Proceed(token) => token,
        GateDecision::Fallback(view) => {
            log(&view.body);
            return show_fallback(container_id, &view);
        }
    };

    let mut backend = create_backend(BackendKind::for_target(), token);
    if let Some(web) = backend.as_web_mut() {
        web.set_container(container_id);
    }

    let catalog = Rc::new(PinCatalog::seeded());
    let mut session = match MapSession::mount_with(backend, Rc::clone(&catalog), &config.map) {
        Ok(session) => session,
        Err(err) => {
            log(&format!("map init error: {err}"));
            return show_fallback(container_id, &FallbackView::backend_failure(&err));
        }
    };

    let container = container_id.to_string();
    session.on_failure(Box::new(move |err| {
        log(&format!("map load error: {err}"));
        if let Err(js) = show_fallback(&container, &FallbackView::backend_failure(&err)) {
            web_sys::console::log_1(&js);
        }
    }));

    let doc = dom::document()?;
    let overlay = dom::element(&doc, overlay_id)?;
    let card = session.overlay();
    dom::render(&doc, &overlay, card.as_ref().map(TextBlock::card).as_ref())?;

    let reader = session.selection_reader();
    session.subscribe(Box::new(move |_state| {
        let card = project_detail(&reader.get(), &catalog);
        let block = card.as_ref().map(TextBlock::card);
        if let Err(err) = dom::render(&doc, &overlay, block.as_ref()) {
            web_sys::console::log_1(&err);
        }
    }));

    STATE.with(|state| *state.borrow_mut() = Some(ViewerState { session }));
    Ok(())
}

/// Tears the map down. Does nothing when nothing is mounted.
#[wasm_bindgen]
pub fn unmount() {
    let previous = STATE.with(|state| state.borrow_mut().take());
    if let Some(mut viewer) = previous {
        viewer.session.teardown();
    }
}

#[wasm_bindgen]
pub fn select_pin(pin_id: &str) -> Result<(), JsValue> {
    STATE.with(|state| match state.borrow_mut().as_mut() {
        Some(viewer) => viewer
            .session
            .select_pin(pin_id)
            .map_err(|err| JsValue::from_str(&err.to_string())),
        None => Err(JsValue::from_str("map is not mounted")),
    })
}

#[wasm_bindgen]
pub fn clear_selection() {
    STATE.with(|state| {
        if let Some(viewer) = state.borrow_mut().as_mut() {
            viewer.session.clear_selection();
        }
    });
}

#[wasm_bindgen]
pub fn selected_pin() -> Option<String> {
    STATE.with(|state| {
        state
            .borrow()
            .as_ref()
            .and_then(|viewer| viewer.session.selection().selected_id().map(str::to_string))
    })
}
