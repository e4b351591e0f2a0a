//! Seeded property scenarios run against in-memory backends.
//!
//! Every scenario builds its own document, cache and remote, so runs are independent and
//! reproducible from the seed alone.
use anyhow::{Result, ensure};
use clarion_core::status::SOFT_SAVE_WARNING;
use clarion_core::{
    Bootstrapper, Capabilities, ClassSurface, EffectRegistry, GroupId, MemoryCache,
    MemoryDocument, MemoryElement, MemoryRemote, PreferenceSnapshot, PreferenceStore,
    RecordingStatusSink, RemoteMode, ScopeResolver, StateEngine, TaskQueue, ToggleId,
    ToggleValue,
};
use futures::FutureExt;
use futures::future::LocalBoxFuture;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::rc::Rc;

pub const PREFIX: &str = "clarion";
const NAMESPACE: &str = "clarion";
const ACTIONS_PER_RUN: usize = 40;

pub type ScenarioFn = fn(u64) -> LocalBoxFuture<'static, Result<()>>;

pub struct Scenario {
    pub name: &'static str,
    pub description: &'static str,
    pub run: ScenarioFn,
}

pub const CATALOG: &[Scenario] = &[
    Scenario {
        name: "smoke",
        description: "Set, cycle and reset a handful of toggles",
        run: smoke,
    },
    Scenario {
        name: "reset-idempotence",
        description: "Reset after random changes restores defaults and strips every class",
        run: reset_idempotence,
    },
    Scenario {
        name: "group-exclusivity",
        description: "No mutually exclusive group ever has two active members",
        run: group_exclusivity,
    },
    Scenario {
        name: "persistence-roundtrip",
        description: "A reload reproduces the snapshot and the scope classes",
        run: persistence_roundtrip,
    },
    Scenario {
        name: "cycle-wrap",
        description: "Cycling a level toggle through its range returns to the start",
        run: cycle_wrap,
    },
    Scenario {
        name: "offline-local-first",
        description: "An unreachable remote never loses a local value",
        run: offline_local_first,
    },
    Scenario {
        name: "remote-precedence",
        description: "A new device picks up preferences saved remotely",
        run: remote_precedence,
    },
    Scenario {
        name: "legacy-migration",
        description: "Records from older releases are migrated and cleaned up",
        run: legacy_migration,
    },
    Scenario {
        name: "save-now",
        description: "Manual save pushes local values while auto-sync is off",
        run: save_now,
    },
];

#[must_use]
pub fn get_scenario(name: &str) -> Option<&'static Scenario> {
    CATALOG.iter().find(|scenario| scenario.name == name)
}

pub fn list_scenarios() -> impl Iterator<Item = (&'static str, &'static str)> {
    CATALOG
        .iter()
        .map(|scenario| (scenario.name, scenario.description))
}

/// One simulated user: a cache and a remote shared across page loads.
struct Harness {
    cache: Rc<MemoryCache>,
    remote: Rc<MemoryRemote>,
    queue: TaskQueue,
    status: Rc<RecordingStatusSink>,
}

impl Harness {
    fn new(mode: RemoteMode) -> Self {
        Self::with_remote(Rc::new(MemoryRemote::new(mode)))
    }

    /// A second device: fresh cache, same account.
    fn with_remote(remote: Rc<MemoryRemote>) -> Self {
        Self {
            cache: Rc::new(MemoryCache::default()),
            remote,
            queue: TaskQueue::new(),
            status: Rc::new(RecordingStatusSink::default()),
        }
    }

    fn store(&self) -> PreferenceStore {
        PreferenceStore::new(NAMESPACE, self.cache.clone()).with_remote(self.remote.clone())
    }

    async fn load(&self) -> Result<(StateEngine<MemoryElement>, MemoryElement)> {
        let boot = Bootstrapper::new(
            Rc::new(ScopeResolver::new(MemoryDocument::with_standard_layout())),
            self.store(),
            Capabilities::new(Rc::new(self.queue.clone())).with_status(self.status.clone()),
            PREFIX,
        );
        let engine = boot.init().await;
        let scope = engine.scope().cloned();
        ensure!(scope.is_some(), "standard layout must resolve a scope");
        Ok((engine, scope.unwrap_or_else(|| MemoryElement::new("body"))))
    }
}

fn random_action(rng: &mut ChaCha8Rng, engine: &mut StateEngine<MemoryElement>) {
    let registry = EffectRegistry::standard();
    let toggle = ToggleId::ALL[rng.gen_range(0..ToggleId::ALL.len())];
    let spec = registry.spec(toggle);
    match rng.gen_range(0..4) {
        0 => {
            engine.cycle(toggle);
        }
        1 => {
            engine.set_value(toggle, spec.default.clone());
        }
        _ => {
            let values = spec.domain.values();
            let value = values[rng.gen_range(0..values.len())].clone();
            engine.set_value(toggle, value);
        }
    }
}

fn check_exclusive(snapshot: &PreferenceSnapshot) -> Result<()> {
    let registry = EffectRegistry::standard();
    for group in GroupId::ALL {
        let active: Vec<ToggleId> = registry
            .group_members(group)
            .into_iter()
            .filter(|id| !snapshot.is_default(*id))
            .collect();
        ensure!(active.len() <= 1, "{group:?} has {active:?} active together");
    }
    Ok(())
}

fn check_classes(engine: &StateEngine<MemoryElement>, scope: &MemoryElement) -> Result<()> {
    let registry = EffectRegistry::standard();
    let owned = registry.all_classes(PREFIX);
    let mut expected: Vec<String> = registry
        .iter()
        .flat_map(|spec| spec.classes_for(PREFIX, engine.snapshot().get(spec.id)))
        .collect();
    let mut actual: Vec<String> = scope
        .class_names()
        .into_iter()
        .filter(|class| owned.contains(class))
        .collect();
    expected.sort();
    actual.sort();
    ensure!(
        actual == expected,
        "scope classes {actual:?} do not match snapshot classes {expected:?}"
    );
    Ok(())
}

fn smoke(_seed: u64) -> LocalBoxFuture<'static, Result<()>> {
    async move {
        let harness = Harness::new(RemoteMode::Online);
        let (mut engine, scope) = harness.load().await?;
        engine.set_value(ToggleId::FontSize, ToggleValue::Level(130));
        engine.toggle_boolean(ToggleId::HighContrast);
        engine.cycle(ToggleId::LineSpacing);
        check_classes(&engine, &scope)?;
        ensure!(scope.has_class("clarion-high-contrast"), "high contrast class missing");

        let reset = engine.reset_all();
        ensure!(reset.snapshot == PreferenceSnapshot::defaults(), "reset left values behind");
        check_classes(&engine, &scope)?;
        harness.queue.drain().await;
        Ok(())
    }
    .boxed_local()
}

fn reset_idempotence(seed: u64) -> LocalBoxFuture<'static, Result<()>> {
    async move {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let harness = Harness::new(RemoteMode::Online);
        let (mut engine, scope) = harness.load().await?;
        for _ in 0..ACTIONS_PER_RUN {
            random_action(&mut rng, &mut engine);
        }
        let first = engine.reset_all();
        let second = engine.reset_all();
        ensure!(first.snapshot == PreferenceSnapshot::defaults(), "first reset not at defaults");
        ensure!(second.snapshot == first.snapshot, "second reset changed the snapshot");
        let owned = EffectRegistry::standard().all_classes(PREFIX);
        let leftover: Vec<String> = scope
            .class_names()
            .into_iter()
            .filter(|class| owned.contains(class))
            .collect();
        ensure!(leftover.is_empty(), "classes left after reset: {leftover:?}");
        Ok(())
    }
    .boxed_local()
}

fn group_exclusivity(seed: u64) -> LocalBoxFuture<'static, Result<()>> {
    async move {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let harness = Harness::new(RemoteMode::Online);
        let (mut engine, scope) = harness.load().await?;
        for step in 0..ACTIONS_PER_RUN {
            random_action(&mut rng, &mut engine);
            check_exclusive(engine.snapshot())
                .map_err(|err| err.context(format!("after step {step}")))?;
        }
        check_classes(&engine, &scope)
    }
    .boxed_local()
}

fn persistence_roundtrip(seed: u64) -> LocalBoxFuture<'static, Result<()>> {
    async move {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let harness = Harness::new(RemoteMode::Online);
        let (mut engine, _) = harness.load().await?;
        for _ in 0..ACTIONS_PER_RUN {
            random_action(&mut rng, &mut engine);
        }
        harness.queue.drain().await;
        let expected = engine.get_snapshot();

        let (reloaded, scope) = harness.load().await?;
        ensure!(
            reloaded.snapshot() == &expected,
            "reload diverged: {:?} vs {:?}",
            reloaded.snapshot().to_raw(),
            expected.to_raw()
        );
        check_classes(&reloaded, &scope)
    }
    .boxed_local()
}

fn cycle_wrap(_seed: u64) -> LocalBoxFuture<'static, Result<()>> {
    async move {
        let harness = Harness::new(RemoteMode::Online);
        let (mut engine, scope) = harness.load().await?;
        for spec in EffectRegistry::standard().iter() {
            let steps = spec.domain.values().len();
            if !matches!(spec.default, ToggleValue::Level(_)) {
                continue;
            }
            let start = engine.snapshot().get(spec.id).clone();
            for _ in 0..steps {
                engine.cycle(spec.id);
            }
            ensure!(
                engine.snapshot().get(spec.id) == &start,
                "{} did not wrap back to {start} after {steps} cycles",
                spec.id
            );
        }
        check_classes(&engine, &scope)
    }
    .boxed_local()
}

fn offline_local_first(seed: u64) -> LocalBoxFuture<'static, Result<()>> {
    async move {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let harness = Harness::new(RemoteMode::Offline);
        let (mut engine, _) = harness.load().await?;
        for _ in 0..ACTIONS_PER_RUN {
            random_action(&mut rng, &mut engine);
        }
        harness.queue.drain().await;
        let expected = engine.get_snapshot();

        if !harness.remote.saves().is_empty() {
            let warned = harness
                .status
                .messages()
                .iter()
                .any(|message| message.text == SOFT_SAVE_WARNING);
            ensure!(warned, "failed remote writes were not reported");
        }

        let (reloaded, _) = harness.load().await?;
        ensure!(reloaded.snapshot() == &expected, "offline reload lost local values");
        Ok(())
    }
    .boxed_local()
}

fn remote_precedence(seed: u64) -> LocalBoxFuture<'static, Result<()>> {
    async move {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let laptop = Harness::new(RemoteMode::Online);
        let (mut engine, _) = laptop.load().await?;
        for _ in 0..ACTIONS_PER_RUN {
            random_action(&mut rng, &mut engine);
        }
        laptop.queue.drain().await;
        let expected = engine.get_snapshot();

        let phone = Harness::with_remote(laptop.remote.clone());
        let (on_phone, scope) = phone.load().await?;
        ensure!(on_phone.snapshot() == &expected, "new device did not adopt remote values");
        ensure!(
            expected.active().next().is_none() || !phone.cache.is_empty(),
            "remote values were not cached locally"
        );
        check_classes(&on_phone, &scope)
    }
    .boxed_local()
}

fn legacy_migration(_seed: u64) -> LocalBoxFuture<'static, Result<()>> {
    async move {
        let harness = Harness::new(RemoteMode::Online);
        harness.cache.insert("clarion_invertedColors", "true");
        harness.cache.insert("clarion_readableFonts", "true");
        let (engine, scope) = harness.load().await?;

        ensure!(
            engine.snapshot().level(ToggleId::ColorIntensityMode) == 3,
            "invertedColors was not migrated"
        );
        ensure!(
            engine.snapshot().level(ToggleId::FontMode) == 1,
            "readableFonts was not migrated"
        );
        ensure!(
            harness.cache.get("clarion_invertedColors").is_none(),
            "legacy key left in the cache"
        );
        check_classes(&engine, &scope)
    }
    .boxed_local()
}

fn save_now(seed: u64) -> LocalBoxFuture<'static, Result<()>> {
    async move {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let harness = Harness::new(RemoteMode::Online);
        let (mut engine, _) = harness.load().await?;
        engine.set_auto_sync(false);
        for _ in 0..ACTIONS_PER_RUN / 4 {
            random_action(&mut rng, &mut engine);
        }
        harness.queue.drain().await;
        ensure!(harness.remote.saves().is_empty(), "auto-sync off still wrote remotely");

        let report = engine.save_now().await;
        ensure!(report.all_ok, "manual save failed: {:?}", report.results);
        for (toggle, value) in engine.snapshot().iter() {
            ensure!(
                harness.remote.stored(toggle.key()) == Some(value.to_json()),
                "{toggle} not saved remotely"
            );
        }
        Ok(())
    }
    .boxed_local()
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn catalog_names_are_unique() {
        let mut names: Vec<&str> = CATALOG.iter().map(|s| s.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), CATALOG.len());
        assert!(get_scenario("smoke").is_some());
        assert!(get_scenario("nope").is_none());
    }

    #[test]
    fn every_scenario_passes_for_a_fixed_seed() {
        for scenario in CATALOG {
            let outcome = block_on((scenario.run)(1337));
            assert!(outcome.is_ok(), "{}: {:?}", scenario.name, outcome.err());
        }
    }
}
