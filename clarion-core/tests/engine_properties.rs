use clarion_core::{
    Capabilities, ClassSurface, ColorblindMode, EffectRegistry, GroupId, MemoryCache,
    MemoryElement, PreferenceSnapshot, PreferenceStore, StateEngine, TaskQueue, ToggleId,
    ToggleValue,
};
use std::rc::Rc;

const PREFIX: &str = "clarion";

fn engine() -> (StateEngine<MemoryElement>, MemoryElement) {
    let scope = MemoryElement::new("main");
    let store = PreferenceStore::new("clarion", Rc::new(MemoryCache::default()));
    let caps = Capabilities::new(Rc::new(TaskQueue::new()));
    (
        StateEngine::new(Some(scope.clone()), store, caps, PREFIX),
        scope,
    )
}

fn registry_classes(scope: &MemoryElement) -> Vec<String> {
    let owned = EffectRegistry::standard().all_classes(PREFIX);
    scope
        .class_names()
        .into_iter()
        .filter(|class| owned.contains(class))
        .collect()
}

fn assert_groups_exclusive(snapshot: &PreferenceSnapshot) {
    let registry = EffectRegistry::standard();
    for group in GroupId::ALL {
        let active: Vec<ToggleId> = registry
            .group_members(group)
            .into_iter()
            .filter(|id| !snapshot.is_default(*id))
            .collect();
        assert!(active.len() <= 1, "{group:?} has {active:?} active");
    }
}

fn classes_match_snapshot(engine: &StateEngine<MemoryElement>, scope: &MemoryElement) {
    let registry = EffectRegistry::standard();
    let mut expected: Vec<String> = registry
        .iter()
        .flat_map(|spec| spec.classes_for(PREFIX, engine.snapshot().get(spec.id)))
        .collect();
    let mut actual = registry_classes(scope);
    expected.sort();
    actual.sort();
    assert_eq!(actual, expected);
}

#[test]
fn reset_all_is_idempotent() {
    let (mut engine, scope) = engine();
    engine.set_value(ToggleId::FontSize, ToggleValue::Level(140));
    engine.toggle_boolean(ToggleId::HighlightedLetters);
    engine.set_multi_value(ToggleId::ColorblindModes, ["protanopia"]);
    engine.cycle(ToggleId::VerticalMaskLevel);

    let first = engine.reset_all();
    assert_eq!(first.snapshot, PreferenceSnapshot::defaults());
    assert!(registry_classes(&scope).is_empty());

    let second = engine.reset_all();
    assert_eq!(second.snapshot, first.snapshot);
    assert!(registry_classes(&scope).is_empty());
}

#[test]
fn reset_all_is_safe_when_nothing_is_active() {
    let (mut engine, scope) = engine();
    let outcome = engine.reset_all();
    assert_eq!(outcome.snapshot, PreferenceSnapshot::defaults());
    assert!(scope.class_names().is_empty());
}

#[test]
fn exclusivity_holds_for_every_pair_of_group_moves() {
    let registry = EffectRegistry::standard();
    let grouped: Vec<ToggleId> = registry
        .iter()
        .filter(|spec| !spec.groups.is_empty())
        .map(|spec| spec.id)
        .collect();

    for first in &grouped {
        for second in &grouped {
            for first_value in registry.spec(*first).domain.values() {
                for second_value in registry.spec(*second).domain.values() {
                    let (mut engine, scope) = engine();
                    engine.set_value(*first, first_value.clone());
                    assert_groups_exclusive(engine.snapshot());
                    engine.set_value(*second, second_value.clone());
                    assert_groups_exclusive(engine.snapshot());
                    classes_match_snapshot(&engine, &scope);
                }
            }
        }
    }
}

#[test]
fn cycle_wraps_through_every_level() {
    let (mut engine, scope) = engine();
    let levels: Vec<u16> = (0..4)
        .map(|_| engine.cycle(ToggleId::ColorIntensityMode).value.as_level().unwrap_or(99))
        .collect();
    assert_eq!(levels, vec![1, 2, 3, 0]);
    assert!(registry_classes(&scope).is_empty());
}

#[test]
fn high_contrast_then_intensity_clears_contrast() {
    let (mut engine, scope) = engine();
    engine.set_value(ToggleId::HighContrast, ToggleValue::Flag(true));
    assert!(scope.has_class("clarion-high-contrast"));

    let outcome = engine.set_value(ToggleId::ColorIntensityMode, ToggleValue::Level(2));
    assert_eq!(outcome.reset, vec![ToggleId::HighContrast]);
    assert!(!engine.snapshot().flag(ToggleId::HighContrast));
    assert!(!scope.has_class("clarion-high-contrast"));
    assert!(scope.has_class("clarion-color-intensity-level-2"));
}

#[test]
fn colorblind_set_is_cleared_by_intensity() {
    let (mut engine, scope) = engine();
    engine.set_multi_value(ToggleId::ColorblindModes, ["protanopia", "tritanopia"]);
    assert!(scope.has_class("clarion-colorblind-protanopia"));
    assert!(scope.has_class("clarion-colorblind-tritanopia"));

    engine.set_value(ToggleId::ColorIntensityMode, ToggleValue::Level(1));
    assert!(engine.snapshot().modes(ToggleId::ColorblindModes).is_empty());
    assert_eq!(
        registry_classes(&scope),
        vec!["clarion-color-intensity-level-1"]
    );
}

#[test]
fn colorblind_set_clears_intensity() {
    let (mut engine, scope) = engine();
    engine.set_value(ToggleId::ColorIntensityMode, ToggleValue::Level(3));
    let outcome = engine.set_value(
        ToggleId::ColorblindModes,
        ToggleValue::from([ColorblindMode::Deuteranopia]),
    );
    assert_eq!(outcome.reset, vec![ToggleId::ColorIntensityMode]);
    assert_eq!(engine.snapshot().level(ToggleId::ColorIntensityMode), 0);
    assert_eq!(
        registry_classes(&scope),
        vec!["clarion-colorblind-deuteranopia"]
    );
}

#[test]
fn line_spacing_cycled_three_times() {
    let (mut engine, scope) = engine();
    for _ in 0..3 {
        engine.cycle(ToggleId::LineSpacing);
    }
    assert_eq!(engine.snapshot().level(ToggleId::LineSpacing), 3);
    assert!(scope.has_class("clarion-line-spacing-level-3"));
    assert!(!scope.has_class("clarion-line-spacing-level-1"));
    assert!(!scope.has_class("clarion-line-spacing-level-2"));
}

#[test]
fn emptying_the_colorblind_set_keeps_intensity() {
    let (mut engine, _) = engine();
    engine.set_value(ToggleId::ColorIntensityMode, ToggleValue::Level(2));
    let outcome = engine.set_multi_value(ToggleId::ColorblindModes, ["none"]);
    assert!(outcome.reset.is_empty());
    assert_eq!(engine.snapshot().level(ToggleId::ColorIntensityMode), 2);
}
