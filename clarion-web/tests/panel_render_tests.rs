use clarion_core::{
    Capabilities, MemoryCache, PreferenceStore, RecordingStatusSink, StateEngine, TaskQueue,
    ToggleId, ToggleValue, Tone,
};
use clarion_web::handle::{EngineHandle, PanelAction};
use clarion_web::panel::{AccessibilityPanel, Props};
use futures::executor::block_on;
use std::rc::Rc;
use yew::LocalServerRenderer;

fn local_only_handle(status: Rc<RecordingStatusSink>) -> EngineHandle {
    let store = PreferenceStore::new("campus_a11y", Rc::new(MemoryCache::default()));
    let caps = Capabilities::new(Rc::new(TaskQueue::new())).with_status(status);
    EngineHandle::new(StateEngine::new(None, store, caps, "clarion"))
}

fn render(handle: EngineHandle) -> String {
    let props = Props {
        handle,
        initially_open: true,
    };
    block_on(LocalServerRenderer::<AccessibilityPanel>::with_props(props).render())
}

#[test]
fn save_now_hidden_without_remote_store() {
    let handle = local_only_handle(Rc::new(RecordingStatusSink::default()));
    assert!(!handle.has_remote());
    let html = render(handle);
    assert!(!html.contains("Save now"));
    assert!(html.contains("Reset all"));
}

#[test]
fn reset_clears_rendered_state() {
    let status = Rc::new(RecordingStatusSink::default());
    let handle = local_only_handle(Rc::clone(&status));
    handle.dispatch(PanelAction::SetValue(ToggleId::LetterSpacing, ToggleValue::Level(3)));
    assert!(render(handle.clone()).contains("large"));

    handle.dispatch(PanelAction::Reset);
    let html = render(handle.clone());
    assert!(!html.contains(r#"aria-pressed="true""#));
    assert_eq!(
        status.last().map(|message| message.tone),
        Some(Tone::Info)
    );
    assert!(handle.snapshot().active().next().is_none());
}

#[test]
fn colorblind_checkboxes_follow_snapshot() {
    let handle = local_only_handle(Rc::new(RecordingStatusSink::default()));
    handle.dispatch(PanelAction::SetModes(
        ToggleId::ColorblindModes,
        vec!["deuteranopia".to_string()],
    ));
    let html = render(handle);
    assert!(html.contains("clarion-mode-deuteranopia"));
    assert_eq!(html.matches("is-active").count(), 1);
}
