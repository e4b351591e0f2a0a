use clarion_core::{
    ColorblindMode, Domain, EffectRegistry, PreferenceSnapshot, ToggleId, ToggleSpec, ToggleValue,
};
use yew::prelude::*;

use crate::a11y::STATUS_REGION_ID;
use crate::handle::{EngineHandle, PanelAction};

#[derive(Properties, PartialEq, Clone)]
pub struct Props {
    pub handle: EngineHandle,
    /// Render with the controls expanded.
    #[prop_or_default]
    pub initially_open: bool,
}

/// Short text for a control's current value.
#[must_use]
pub fn value_text(spec: &ToggleSpec, value: &ToggleValue) -> String {
    match value {
        ToggleValue::Flag(true) => "On".to_string(),
        ToggleValue::Flag(false) => "Off".to_string(),
        ToggleValue::Level(level) if spec.id == ToggleId::FontSize => format!("{level}%"),
        ToggleValue::Level(level) => spec
            .level_labels
            .get(usize::from(*level))
            .map_or_else(|| format!("Level {level}"), |name| (*name).to_string()),
        ToggleValue::Modes(modes) if modes.is_empty() => "Off".to_string(),
        ToggleValue::Modes(modes) => modes
            .iter()
            .map(|mode| mode.label())
            .collect::<Vec<_>>()
            .join(", "),
    }
}

fn toggle_button(spec: &ToggleSpec, snapshot: &PreferenceSnapshot, handle: &EngineHandle) -> Html {
    let value = snapshot.get(spec.id);
    let action = match spec.domain {
        Domain::Flag => PanelAction::Toggle(spec.id),
        Domain::Level { .. } | Domain::Modes => PanelAction::Cycle(spec.id),
    };
    let onclick = {
        let handle = handle.clone();
        Callback::from(move |_| {
            handle.dispatch(action.clone());
        })
    };
    let pressed = if spec.is_default(value) { "false" } else { "true" };
    let level = value.as_level().map(|level| AttrValue::from(level.to_string()));
    html! {
        <li>
            <button
                type="button"
                class="clarion-toggle"
                data-toggle={spec.id.key()}
                data-level={level}
                aria-pressed={pressed}
                onclick={onclick}
            >
                <span class="clarion-toggle-label">{ spec.label }</span>
                <span class="clarion-toggle-value">{ value_text(spec, value) }</span>
            </button>
        </li>
    }
}

fn mode_checkbox(mode: ColorblindMode, active: bool, handle: &EngineHandle) -> Html {
    let id = format!("clarion-mode-{}", mode.as_str());
    let onchange = {
        let handle = handle.clone();
        Callback::from(move |_| {
            handle.dispatch(PanelAction::ToggleMode(mode));
        })
    };
    html! {
        <div class={classes!("field", active.then_some("is-active"))}>
            <input id={id.clone()} type="checkbox" checked={active} onchange={onchange} />
            <label for={id}>{ mode.label() }</label>
        </div>
    }
}

#[function_component(AccessibilityPanel)]
pub fn accessibility_panel(p: &Props) -> Html {
    crate::bridge::use_page_bridge(&p.handle);
    let open = use_state(|| p.initially_open);
    let snapshot = use_state({
        let handle = p.handle.clone();
        move || handle.snapshot()
    });
    let auto_sync = use_state({
        let handle = p.handle.clone();
        move || handle.auto_sync()
    });

    {
        let snapshot = snapshot.clone();
        let auto_sync = auto_sync.clone();
        use_effect_with(p.handle.clone(), move |handle| {
            let reader = handle.clone();
            let id = handle.subscribe(Callback::from(move |next: PreferenceSnapshot| {
                auto_sync.set(reader.auto_sync());
                snapshot.set(next);
            }));
            let handle = handle.clone();
            move || handle.unsubscribe(id)
        });
    }

    let on_toggle_open = {
        let open = open.clone();
        Callback::from(move |_| open.set(!*open))
    };
    let launcher = html! {
        <button
            type="button"
            class="clarion-launcher"
            aria-expanded={if *open { "true" } else { "false" }}
            aria-controls="clarion-panel-body"
            onclick={on_toggle_open.clone()}
        >
            {"Accessibility"}
        </button>
    };
    if !*open {
        return html! {
            <div class="clarion-panel">
                { launcher }
                <div id={STATUS_REGION_ID} role="status" aria-live="polite" class="sr-only"></div>
            </div>
        };
    }

    let registry = EffectRegistry::standard();
    let buttons = registry
        .iter()
        .filter(|spec| spec.domain != Domain::Modes)
        .map(|spec| toggle_button(spec, &snapshot, &p.handle))
        .collect::<Html>();
    let active_modes = snapshot.modes(ToggleId::ColorblindModes);
    let checkboxes = ColorblindMode::ALL
        .into_iter()
        .map(|mode| mode_checkbox(mode, active_modes.contains(&mode), &p.handle))
        .collect::<Html>();

    let on_reset = {
        let handle = p.handle.clone();
        Callback::from(move |_| {
            handle.dispatch(PanelAction::Reset);
        })
    };
    let on_save = {
        let handle = p.handle.clone();
        Callback::from(move |_| {
            let pending = handle.save_now();
            wasm_bindgen_futures::spawn_local(async move {
                let report = pending.await;
                log::info!("manual save finished, all ok: {}", report.all_ok);
            });
        })
    };
    let on_auto_sync = {
        let handle = p.handle.clone();
        let enabled = *auto_sync;
        Callback::from(move |_| {
            handle.dispatch(PanelAction::SetAutoSync(!enabled));
        })
    };
    let modes_label = registry.spec(ToggleId::ColorblindModes).label;

    html! {
      <div class="clarion-panel">
      { launcher }
      <section id="clarion-panel-body" role="region" aria-labelledby="clarion-panel-title">
        <h2 id="clarion-panel-title">{"Accessibility preferences"}</h2>
        <ul class="clarion-toggles">{ buttons }</ul>
        <fieldset class="clarion-modes">
          <legend>{ modes_label }</legend>
          { checkboxes }
        </fieldset>
        <div class="field">
          <input id="clarion-auto-sync" type="checkbox" checked={*auto_sync} onchange={on_auto_sync} />
          <label for="clarion-auto-sync">{"Save changes automatically"}</label>
        </div>
        <div class="controls">
          <button type="button" class="clarion-reset" onclick={on_reset}>{"Reset all"}</button>
          if p.handle.has_remote() {
            <button type="button" class="clarion-save" onclick={on_save}>{"Save now"}</button>
          }
          <button type="button" class="clarion-close" onclick={on_toggle_open}>{"Close"}</button>
        </div>
      </section>
      <div id={STATUS_REGION_ID} role="status" aria-live="polite" class="sr-only"></div>
      </div>
    }
}
