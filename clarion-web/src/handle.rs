//! Shared, observable handle on the running engine.
//!
//! The panel, the JS bridge and the bootstrapper all hold clones. Every mutation goes
//! through [`EngineHandle::dispatch`], which releases the engine borrow before notifying
//! listeners so a listener may read the handle again.
use clarion_core::{
    ColorblindMode, PreferenceSnapshot, ResetOutcome, SaveAllReport, SetOutcome, StateEngine,
    ToggleId, ToggleValue,
};
use futures::future::LocalBoxFuture;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use yew::Callback;

use crate::scope::ScopeElement;

/// A user intent coming from the panel or the JS bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelAction {
    Cycle(ToggleId),
    Toggle(ToggleId),
    SetValue(ToggleId, ToggleValue),
    /// Replace a mode set from names; unknown names are ignored.
    SetModes(ToggleId, Vec<String>),
    /// Flip a single colorblind filter, keeping the others.
    ToggleMode(ColorblindMode),
    Reset,
    SetAutoSync(bool),
}

#[derive(Debug)]
pub enum ActionOutcome {
    Set(SetOutcome),
    Reset(ResetOutcome),
    AutoSync(bool),
}

pub type ListenerId = u32;

type Listeners = Rc<RefCell<Vec<(ListenerId, Callback<PreferenceSnapshot>)>>>;

#[derive(Clone)]
pub struct EngineHandle {
    engine: Rc<RefCell<StateEngine<ScopeElement>>>,
    listeners: Listeners,
    next_id: Rc<Cell<ListenerId>>,
}

impl PartialEq for EngineHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.engine, &other.engine)
    }
}

impl std::fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineHandle")
            .field("listeners", &self.listeners.borrow().len())
            .finish_non_exhaustive()
    }
}

impl EngineHandle {
    #[must_use]
    pub fn new(engine: StateEngine<ScopeElement>) -> Self {
        Self {
            engine: Rc::new(RefCell::new(engine)),
            listeners: Rc::new(RefCell::new(Vec::new())),
            next_id: Rc::new(Cell::new(0)),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> PreferenceSnapshot {
        self.engine.borrow().get_snapshot()
    }

    #[must_use]
    pub fn auto_sync(&self) -> bool {
        self.engine.borrow().store().auto_sync()
    }

    #[must_use]
    pub fn has_remote(&self) -> bool {
        self.engine.borrow().store().has_remote()
    }

    /// Call `listener` with the new snapshot after every dispatched action.
    pub fn subscribe(&self, listener: Callback<PreferenceSnapshot>) -> ListenerId {
        let id = self.next_id.get();
        self.next_id.set(id.wrapping_add(1));
        self.listeners.borrow_mut().push((id, listener));
        id
    }

    pub fn unsubscribe(&self, id: ListenerId) {
        self.listeners.borrow_mut().retain(|(existing, _)| *existing != id);
    }

    pub fn dispatch(&self, action: PanelAction) -> ActionOutcome {
        log::debug!("dispatch {action:?}");
        let outcome = {
            let mut engine = self.engine.borrow_mut();
            match action {
                PanelAction::Cycle(toggle) => ActionOutcome::Set(engine.cycle(toggle)),
                PanelAction::Toggle(toggle) => ActionOutcome::Set(engine.toggle_boolean(toggle)),
                PanelAction::SetValue(toggle, value) => {
                    ActionOutcome::Set(engine.set_value(toggle, value))
                }
                PanelAction::SetModes(toggle, names) => ActionOutcome::Set(
                    engine.set_multi_value(toggle, names.iter().map(String::as_str)),
                ),
                PanelAction::ToggleMode(mode) => {
                    let mut modes = engine.snapshot().modes(ToggleId::ColorblindModes);
                    if !modes.remove(&mode) {
                        modes.insert(mode);
                    }
                    ActionOutcome::Set(
                        engine.set_value(ToggleId::ColorblindModes, ToggleValue::Modes(modes)),
                    )
                }
                PanelAction::Reset => ActionOutcome::Reset(engine.reset_all()),
                PanelAction::SetAutoSync(enabled) => {
                    engine.set_auto_sync(enabled);
                    ActionOutcome::AutoSync(enabled)
                }
            }
        };
        self.notify();
        outcome
    }

    /// Push every preference to the remote store now.
    pub fn save_now(&self) -> LocalBoxFuture<'static, SaveAllReport> {
        self.engine.borrow().save_now()
    }

    fn notify(&self) {
        let snapshot = self.snapshot();
        let listeners: Vec<_> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, cb)| cb.clone())
            .collect();
        for listener in listeners {
            listener.emit(snapshot.clone());
        }
    }
}
