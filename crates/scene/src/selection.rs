use std::cell::RefCell;
use std::rc::Rc;

use catalog::PinCatalog;
use tracing::debug;

/// The single optional pin that is highlighted and detailed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum SelectionState {
    #[default]
    NoneSelected,
    Selected(String),
}

impl SelectionState {
    pub fn selected_id(&self) -> Option<&str> {
        match self {
            SelectionState::NoneSelected => None,
            SelectionState::Selected(id) => Some(id),
        }
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected_id() == Some(id)
    }
}

#[derive(Debug, Default)]
struct Shared {
    state: SelectionState,
    revision: u64,
}

/// Read-only view of the controller's state.
///
/// Cheap to clone; every clone observes transitions as soon as they are applied.
#[derive(Debug, Clone)]
pub struct SelectionReader {
    shared: Rc<RefCell<Shared>>,
}

impl SelectionReader {
    pub fn get(&self) -> SelectionState {
        self.shared.borrow().state.clone()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.shared.borrow().state.is_selected(id)
    }

    /// Number of transitions applied so far, including no-op reselections.
    pub fn revision(&self) -> u64 {
        self.shared.borrow().revision
    }
}

pub type SelectionListener = Box<dyn FnMut(&SelectionState)>;

/// Single-selection state machine.
///
/// Transitions:
/// - `select(id)` -> `Selected(id)` from any state. The id is not checked
///   against a catalog here.
/// - `clear()` -> `NoneSelected` from any state.
///
/// Listeners run synchronously, in subscription order, after the new state is
/// visible to every [`SelectionReader`]. Listeners must not call back into the
/// controller.
pub struct SelectionController {
    shared: Rc<RefCell<Shared>>,
    listeners: Vec<SelectionListener>,
}

impl SelectionController {
    pub fn new(initial: SelectionState) -> Self {
        Self {
            shared: Rc::new(RefCell::new(Shared {
                state: initial,
                revision: 0,
            })),
            listeners: Vec::new(),
        }
    }

    /// Starts with the catalog's first pin selected, or nothing for an empty catalog.
    pub fn for_catalog(catalog: &PinCatalog) -> Self {
        let initial = catalog
            .first()
            .map(|p| SelectionState::Selected(p.id.clone()))
            .unwrap_or_default();
        Self::new(initial)
    }

    pub fn state(&self) -> SelectionState {
        self.shared.borrow().state.clone()
    }

    pub fn reader(&self) -> SelectionReader {
        SelectionReader {
            shared: Rc::clone(&self.shared),
        }
    }

    pub fn subscribe(&mut self, listener: SelectionListener) {
        self.listeners.push(listener);
    }

    pub fn select(&mut self, id: impl Into<String>) -> &SelectionController {
        self.apply(SelectionState::Selected(id.into()));
        self
    }

    pub fn clear(&mut self) -> &SelectionController {
        self.apply(SelectionState::NoneSelected);
        self
    }

    fn apply(&mut self, next: SelectionState) {
        let snapshot = {
            let mut shared = self.shared.borrow_mut();
            if shared.state != next {
                debug!(from = ?shared.state, to = ?next, "selection changed");
            }
            shared.state = next;
            shared.revision += 1;
            shared.state.clone()
        };
        for listener in &mut self.listeners {
            listener(&snapshot);
        }
    }
}

impl std::fmt::Debug for SelectionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionController")
            .field("state", &self.shared.borrow().state)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
