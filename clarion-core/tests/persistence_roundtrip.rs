use clarion_core::{
    Bootstrapper, Capabilities, ClassSurface, ColorblindMode, EffectRegistry, MemoryCache,
    MemoryDocument, MemoryElement, MemoryRemote, PreferenceStore, RemoteMode, ScopeResolver,
    StateEngine, TaskQueue, ToggleId, ToggleValue, WriteOptions,
};
use futures::executor::block_on;
use serde_json::json;
use std::rc::Rc;

struct Backends {
    cache: Rc<MemoryCache>,
    remote: Rc<MemoryRemote>,
}

impl Backends {
    fn new(mode: RemoteMode) -> Self {
        Self {
            cache: Rc::new(MemoryCache::default()),
            remote: Rc::new(MemoryRemote::new(mode)),
        }
    }

    fn store(&self) -> PreferenceStore {
        PreferenceStore::new("clarion", self.cache.clone()).with_remote(self.remote.clone())
    }

    /// Simulates a page load: fresh document, fresh resolver, fresh engine.
    fn load(&self) -> (StateEngine<MemoryElement>, TaskQueue) {
        let queue = TaskQueue::new();
        let boot = Bootstrapper::new(
            Rc::new(ScopeResolver::new(MemoryDocument::with_standard_layout())),
            self.store(),
            Capabilities::new(Rc::new(queue.clone())),
            "clarion",
        );
        (block_on(boot.init()), queue)
    }
}

#[test]
fn every_legal_value_survives_a_reload() {
    let registry = EffectRegistry::standard();
    for spec in registry.iter() {
        let mut values = spec.domain.values();
        if spec.id == ToggleId::ColorblindModes {
            values.push(ToggleValue::from(ColorblindMode::ALL));
        }
        for value in values {
            for mode in [RemoteMode::Online, RemoteMode::Offline] {
                let backends = Backends::new(mode);
                let (mut engine, queue) = backends.load();
                engine.set_value(spec.id, value.clone());
                block_on(queue.drain());

                let (reloaded, _) = backends.load();
                assert_eq!(
                    reloaded.snapshot().get(spec.id),
                    &value,
                    "{} = {value} with {mode:?}",
                    spec.id
                );
                let scope = reloaded.scope().unwrap();
                for class in spec.classes_for("clarion", &value) {
                    assert!(scope.has_class(&class), "missing {class}");
                }
            }
        }
    }
}

#[test]
fn local_first_write_is_readable_offline() {
    let backends = Backends::new(RemoteMode::Offline);
    let store = backends.store();
    store.set_auto_sync(false);
    let pending = store.write(ToggleId::FontSize, &ToggleValue::Level(120), WriteOptions::default());
    assert!(!pending.is_remote_pending());

    let snapshot = block_on(store.read_all());
    assert_eq!(snapshot.level(ToggleId::FontSize), 120);
    assert!(backends.remote.saves().is_empty());
}

#[test]
fn remote_preferences_follow_the_user_to_a_new_device() {
    let laptop = Backends::new(RemoteMode::Online);
    let (mut engine, queue) = laptop.load();
    engine.cycle(ToggleId::LetterSpacing);
    engine.toggle_boolean(ToggleId::CustomCursor);
    block_on(queue.drain());

    let phone = Backends {
        cache: Rc::new(MemoryCache::default()),
        remote: Rc::clone(&laptop.remote),
    };
    let (engine, _) = phone.load();
    assert_eq!(engine.snapshot().level(ToggleId::LetterSpacing), 1);
    assert!(engine.snapshot().flag(ToggleId::CustomCursor));
    assert_eq!(phone.cache.get("clarion_customCursor").as_deref(), Some("true"));
}

#[test]
fn stale_remote_response_does_not_override_newer_local_value() {
    let backends = Backends::new(RemoteMode::Online);
    let (mut engine, queue) = backends.load();
    engine.set_value(ToggleId::FontSize, ToggleValue::Level(110));
    engine.set_value(ToggleId::FontSize, ToggleValue::Level(130));
    assert_eq!(backends.cache.get("clarion_fontSize").as_deref(), Some("130"));

    block_on(queue.drain());
    assert_eq!(engine.snapshot().level(ToggleId::FontSize), 130);
    assert_eq!(backends.cache.get("clarion_fontSize").as_deref(), Some("130"));
    assert_eq!(backends.remote.stored("fontSize"), Some(json!(130)));
}

#[test]
fn unreadable_store_boots_to_defaults() {
    let backends = Backends::new(RemoteMode::NonJson);
    backends.cache.insert("clarion_lineSpacing", "not-a-number");
    let (engine, queue) = backends.load();
    assert_eq!(engine.snapshot().level(ToggleId::LineSpacing), 0);
    assert!(engine.snapshot().active().next().is_none());
    assert_eq!(queue.pending(), 0);
}

#[test]
fn legacy_records_replay_as_modern_toggles() {
    let backends = Backends::new(RemoteMode::Offline);
    backends.cache.insert("clarion_invertedColors", "true");
    backends.cache.insert("clarion_colorblind_modes", r#"["protanopia","tritanopia"]"#);
    let (engine, _) = backends.load();
    // Replay runs in registry order, so the filter set clears the migrated intensity.
    assert_eq!(engine.snapshot().level(ToggleId::ColorIntensityMode), 0);
    assert_eq!(engine.snapshot().modes(ToggleId::ColorblindModes).len(), 2);
    let scope = engine.scope().unwrap();
    assert!(scope.has_class("clarion-colorblind-tritanopia"));
    assert!(!scope.has_class("clarion-color-intensity-level-3"));
}
