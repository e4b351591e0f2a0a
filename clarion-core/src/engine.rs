//! The single authority on which toggles are active and which classes reflect them.
use futures::FutureExt;
use futures::future::LocalBoxFuture;
use log::{debug, info, warn};
use std::rc::Rc;

use crate::capability::{NoSpeech, SpeechSynthesisCapability};
use crate::error::A11yError;
use crate::registry::{self, Domain, EffectRegistry, ToggleId, ToggleSpec};
use crate::snapshot::PreferenceSnapshot;
use crate::status::{
    NullStatusSink, RESET_MESSAGE, SOFT_SAVE_WARNING, SPEECH_UNAVAILABLE, StatusMessage,
    StatusSink, Tone,
};
use crate::store::{
    PendingWrite, PreferenceStore, RemoteStatus, SaveAllReport, WriteOptions, WriteOutcome,
};
use crate::surface::ClassSurface;
use crate::task::Spawn;
use crate::value::ToggleValue;

/// Host services the engine depends on, injected once.
#[derive(Clone)]
pub struct Capabilities {
    spawner: Rc<dyn Spawn>,
    status: Rc<dyn StatusSink>,
    speech: Rc<dyn SpeechSynthesisCapability>,
}

impl Capabilities {
    /// Silent, speechless capabilities around a spawner.
    pub fn new(spawner: Rc<dyn Spawn>) -> Self {
        Self {
            spawner,
            status: Rc::new(NullStatusSink),
            speech: Rc::new(NoSpeech),
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: Rc<dyn StatusSink>) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn with_speech(mut self, speech: Rc<dyn SpeechSynthesisCapability>) -> Self {
        self.speech = speech;
        self
    }

    #[must_use]
    pub fn speech_available(&self) -> bool {
        self.speech.is_available()
    }
}

/// Who asked for a change. Replays are silent and persist locally only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    User,
    Replay,
}

/// Result of a single mutation.
#[derive(Debug)]
pub struct SetOutcome {
    pub toggle: ToggleId,
    /// The value now held, after clamping.
    pub value: ToggleValue,
    pub changed: bool,
    /// Group siblings forced back to their defaults.
    pub reset: Vec<ToggleId>,
    /// Local outcome of each forced reset, in the order of `reset`.
    pub reset_writes: Vec<WriteOutcome>,
    pub write: Option<WriteOutcome>,
    pub status: Option<StatusMessage>,
    /// Why the requested value was adjusted or refused.
    pub rejected: Option<A11yError>,
}

impl SetOutcome {
    /// `true` when the request was refused outright and nothing changed.
    #[must_use]
    pub const fn is_refused(&self) -> bool {
        self.write.is_none()
    }
}

#[derive(Debug)]
pub struct ResetOutcome {
    pub snapshot: PreferenceSnapshot,
    pub writes: Vec<WriteOutcome>,
    pub status: StatusMessage,
}

/// Owns the in-memory snapshot and the registry classes on the scope element.
pub struct StateEngine<S: ClassSurface> {
    registry: &'static EffectRegistry,
    prefix: String,
    scope: Option<S>,
    snapshot: PreferenceSnapshot,
    store: PreferenceStore,
    caps: Capabilities,
}

impl<S: ClassSurface> StateEngine<S> {
    /// Engine at all-defaults. Nothing is written until a mutation or [`Self::replay`].
    pub fn new(scope: Option<S>, store: PreferenceStore, caps: Capabilities, prefix: &str) -> Self {
        Self {
            registry: EffectRegistry::standard(),
            prefix: prefix.to_string(),
            scope,
            snapshot: PreferenceSnapshot::defaults(),
            store,
            caps,
        }
    }

    #[must_use]
    pub const fn scope(&self) -> Option<&S> {
        self.scope.as_ref()
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    #[must_use]
    pub const fn store(&self) -> &PreferenceStore {
        &self.store
    }

    #[must_use]
    pub const fn registry(&self) -> &'static EffectRegistry {
        self.registry
    }

    #[must_use]
    pub const fn snapshot(&self) -> &PreferenceSnapshot {
        &self.snapshot
    }

    /// Read-only copy for UI consumers.
    #[must_use]
    pub fn get_snapshot(&self) -> PreferenceSnapshot {
        self.snapshot.clone()
    }

    /// Set a toggle, clamping levels into range and clearing group siblings.
    pub fn set_value(&mut self, toggle: ToggleId, value: ToggleValue) -> SetOutcome {
        self.apply(toggle, value, Origin::User)
    }

    /// Advance a level toggle by one step, wrapping to its minimum, or flip a flag.
    pub fn cycle(&mut self, toggle: ToggleId) -> SetOutcome {
        let spec = self.registry.spec(toggle);
        match spec.domain.next(self.snapshot.get(toggle)) {
            Some(next) => {
                debug!("cycle {toggle}: {} -> {next}", self.snapshot.get(toggle));
                self.apply(toggle, next, Origin::User)
            }
            None => self.refuse(toggle, "mode sets cannot be cycled"),
        }
    }

    pub fn toggle_boolean(&mut self, toggle: ToggleId) -> SetOutcome {
        match self.snapshot.get(toggle).as_flag() {
            Some(on) => self.apply(toggle, ToggleValue::Flag(!on), Origin::User),
            None => self.refuse(toggle, "not a boolean toggle"),
        }
    }

    /// Replace a multi-select set from mode names. Unknown names are ignored.
    pub fn set_multi_value<'a>(
        &mut self,
        toggle: ToggleId,
        names: impl IntoIterator<Item = &'a str>,
    ) -> SetOutcome {
        if self.registry.spec(toggle).domain != Domain::Modes {
            return self.refuse(toggle, "not a multi-value toggle");
        }
        let normalized = registry::modes_from_names(toggle, names);
        let mut outcome = self.apply(toggle, normalized.value, Origin::User);
        if outcome.rejected.is_none() {
            outcome.rejected = normalized.adjusted;
        }
        outcome
    }

    /// Restore every default, strip every registry class and persist the defaults.
    pub fn reset_all(&mut self) -> ResetOutcome {
        self.strip_registry_classes();
        let registry = self.registry;
        let mut writes = Vec::with_capacity(ToggleId::ALL.len());
        let mut pending = Vec::with_capacity(ToggleId::ALL.len());
        for spec in registry.iter() {
            let write = self.commit(spec, spec.default.clone(), Origin::User);
            writes.push(write.local_outcome());
            pending.push(write);
        }
        self.settle_later(pending, Origin::User);
        self.caps.speech.cancel();
        let status = StatusMessage::new(RESET_MESSAGE, Tone::Info);
        self.caps.status.publish(&status);
        info!("all accessibility settings reset");
        ResetOutcome {
            snapshot: self.get_snapshot(),
            writes,
            status,
        }
    }

    /// Apply a persisted snapshot silently: classes are rebuilt from scratch, values are
    /// written to the local cache only, and no status is published.
    pub fn replay(&mut self, persisted: &PreferenceSnapshot) {
        self.strip_registry_classes();
        self.snapshot = PreferenceSnapshot::defaults();
        for toggle in ToggleId::ALL {
            let outcome = self.apply(toggle, persisted.get(toggle).clone(), Origin::Replay);
            if let Some(err) = outcome.rejected {
                debug!("replay of {toggle} adjusted: {err}");
            }
        }
        debug!(
            "replayed {} active toggles",
            self.snapshot.active().count()
        );
    }

    /// Push the current snapshot to the remote store regardless of auto-sync.
    ///
    /// The future owns what it needs, so callers may hold the engine in a `RefCell`
    /// without keeping it borrowed across the await.
    pub fn save_now(&self) -> LocalBoxFuture<'static, SaveAllReport> {
        let store = self.store.clone();
        let snapshot = self.snapshot.clone();
        let status = Rc::clone(&self.caps.status);
        async move {
            let report = store.write_all_to_remote(&snapshot).await;
            let message = if report.all_ok {
                StatusMessage::new("Preferences saved", Tone::Success)
            } else {
                StatusMessage::warning(SOFT_SAVE_WARNING)
            };
            status.publish(&message);
            report
        }
        .boxed_local()
    }

    pub fn set_auto_sync(&self, enabled: bool) {
        self.store.set_auto_sync(enabled);
        let text = if enabled {
            "Automatic saving enabled"
        } else {
            "Automatic saving disabled"
        };
        self.caps.status.publish(&StatusMessage::new(text, Tone::Info));
    }

    fn refuse(&self, toggle: ToggleId, reason: &str) -> SetOutcome {
        self.refused(toggle, A11yError::invalid(toggle, reason))
    }

    fn refused(&self, toggle: ToggleId, err: A11yError) -> SetOutcome {
        debug!("{err}");
        SetOutcome {
            toggle,
            value: self.snapshot.get(toggle).clone(),
            changed: false,
            reset: Vec::new(),
            reset_writes: Vec::new(),
            write: None,
            status: None,
            rejected: Some(err),
        }
    }

    fn apply(&mut self, toggle: ToggleId, requested: ToggleValue, origin: Origin) -> SetOutcome {
        let registry = self.registry;
        let spec = registry.spec(toggle);
        let normalized = match spec.domain.normalize(toggle, requested) {
            Ok(normalized) => normalized,
            Err(err) => return self.refused(toggle, err),
        };
        let value = normalized.value;

        let mut reset = Vec::new();
        let mut reset_writes = Vec::new();
        let mut pending = Vec::new();
        if !spec.is_default(&value) {
            for sibling in registry.siblings(toggle) {
                if !self.snapshot.is_default(sibling) {
                    let sibling_spec = registry.spec(sibling);
                    let write = self.commit(sibling_spec, sibling_spec.default.clone(), origin);
                    let outcome = write.local_outcome();
                    if !outcome.local {
                        warn!("{sibling} was reset for {toggle} but not saved locally");
                    }
                    reset.push(sibling);
                    reset_writes.push(outcome);
                    pending.push(write);
                }
            }
        }

        let changed = *self.snapshot.get(toggle) != value;
        let own = self.commit(spec, value.clone(), origin);
        let write = own.local_outcome();
        pending.push(own);
        self.settle_later(pending, origin);

        let status = (origin == Origin::User).then(|| {
            let message = self.speech_side_effects(spec, &value);
            self.caps.status.publish(&message);
            message
        });
        if origin == Origin::Replay
            && toggle == ToggleId::TextToSpeech
            && value == ToggleValue::Flag(false)
        {
            self.caps.speech.cancel();
        }

        SetOutcome {
            toggle,
            value,
            changed,
            reset,
            reset_writes,
            write: Some(write),
            status,
            rejected: normalized.adjusted,
        }
    }

    fn speech_side_effects(&self, spec: &ToggleSpec, value: &ToggleValue) -> StatusMessage {
        let message = StatusMessage::describe(spec, value);
        if spec.id != ToggleId::TextToSpeech {
            return message;
        }
        match value {
            ToggleValue::Flag(true) if !self.caps.speech.is_available() => {
                StatusMessage::warning(SPEECH_UNAVAILABLE)
            }
            ToggleValue::Flag(true) => {
                self.caps.speech.speak(&message.text);
                message
            }
            _ => {
                self.caps.speech.cancel();
                message
            }
        }
    }

    /// Swap the toggle's classes, record the value and write it through locally.
    fn commit(&mut self, spec: &ToggleSpec, value: ToggleValue, origin: Origin) -> PendingWrite {
        if let Some(scope) = &self.scope {
            for class in spec.all_classes(&self.prefix) {
                scope.remove_class(&class);
            }
            for class in spec.classes_for(&self.prefix, &value) {
                scope.add_class(&class);
            }
        }

        let opts = match origin {
            Origin::User => WriteOptions::default(),
            Origin::Replay => WriteOptions::local_only(),
        };
        let pending = self.store.write(spec.id, &value, opts);
        self.snapshot.set(spec.id, value);
        pending
    }

    /// Finish the remote halves of one mutation in a single background task, so a failing
    /// store produces at most one warning per user action.
    fn settle_later(&self, writes: Vec<PendingWrite>, origin: Origin) {
        let remote: Vec<PendingWrite> = writes
            .into_iter()
            .filter(PendingWrite::is_remote_pending)
            .collect();
        if remote.is_empty() {
            return;
        }
        let status = Rc::clone(&self.caps.status);
        let notify = origin == Origin::User;
        self.caps.spawner.spawn_local(
            async move {
                let mut failed = 0_usize;
                for write in remote {
                    if write.settle().await.remote == RemoteStatus::Failed {
                        failed += 1;
                    }
                }
                if failed > 0 {
                    debug!("{failed} remote saves failed");
                    if notify {
                        status.publish(&StatusMessage::warning(SOFT_SAVE_WARNING));
                    }
                }
            }
            .boxed_local(),
        );
    }

    fn strip_registry_classes(&self) {
        if let Some(scope) = &self.scope {
            for class in self.registry.all_classes(&self.prefix) {
                scope.remove_class(&class);
            }
        }
    }
}
