use super::shared::{BRIDGE_GLOBAL, BridgeRequest, cycle_action, perform, set_preference_action};
use crate::dom;
use crate::handle::{EngineHandle, PanelAction};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use yew::prelude::*;

struct BridgeBindings {
    _set_preference: Closure<dyn FnMut(JsValue, JsValue) -> JsValue>,
    _cycle: Closure<dyn FnMut(JsValue) -> JsValue>,
    _reset: Closure<dyn FnMut() -> JsValue>,
    _snapshot: Closure<dyn FnMut() -> JsValue>,
    _save_now: Closure<dyn FnMut() -> JsValue>,
    _set_auto_sync: Closure<dyn FnMut(JsValue) -> JsValue>,
}

impl BridgeBindings {
    fn keep(&self) {
        let _ = (
            &self._set_preference,
            &self._cycle,
            &self._reset,
            &self._snapshot,
            &self._save_now,
            &self._set_auto_sync,
        );
    }
}

/// Plain JS objects rather than `Map`s, so page scripts can read fields directly.
fn to_js<T: Serialize>(value: &T) -> JsValue {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .unwrap_or(JsValue::NULL)
}

fn run(handle: &EngineHandle, request: Result<BridgeRequest, clarion_core::A11yError>) -> JsValue {
    to_js(&perform(handle, request))
}

fn build_bridge(handle: &EngineHandle) -> BridgeBindings {
    let set_handle = handle.clone();
    let set_preference = Closure::wrap(Box::new(move |name: JsValue, value: JsValue| {
        let name = name.as_string().unwrap_or_default();
        let raw: serde_json::Value =
            serde_wasm_bindgen::from_value(value).unwrap_or(serde_json::Value::Null);
        run(&set_handle, set_preference_action(&name, &raw))
    }) as Box<dyn FnMut(JsValue, JsValue) -> JsValue>);

    let cycle_handle = handle.clone();
    let cycle = Closure::wrap(Box::new(move |name: JsValue| {
        let name = name.as_string().unwrap_or_default();
        run(&cycle_handle, cycle_action(&name).map(BridgeRequest::from))
    }) as Box<dyn FnMut(JsValue) -> JsValue>);

    let reset_handle = handle.clone();
    let reset = Closure::wrap(Box::new(move || run(&reset_handle, Ok(PanelAction::Reset.into())))
        as Box<dyn FnMut() -> JsValue>);

    let snapshot_handle = handle.clone();
    let snapshot = Closure::wrap(
        Box::new(move || to_js(&snapshot_handle.snapshot().to_raw())) as Box<dyn FnMut() -> JsValue>,
    );

    let save_handle = handle.clone();
    let save_now = Closure::wrap(Box::new(move || {
        let pending = save_handle.save_now();
        wasm_bindgen_futures::future_to_promise(async move {
            let report = pending.await;
            Ok(to_js(&report))
        })
        .into()
    }) as Box<dyn FnMut() -> JsValue>);

    let sync_handle = handle.clone();
    let set_auto_sync = Closure::wrap(Box::new(move |enabled: JsValue| {
        let enabled = enabled.as_bool().unwrap_or(true);
        run(&sync_handle, Ok(PanelAction::SetAutoSync(enabled).into()))
    }) as Box<dyn FnMut(JsValue) -> JsValue>);

    BridgeBindings {
        _set_preference: set_preference,
        _cycle: cycle,
        _reset: reset,
        _snapshot: snapshot,
        _save_now: save_now,
        _set_auto_sync: set_auto_sync,
    }
}

fn attach_bridge(bindings: &BridgeBindings) {
    let Some(window) = dom::window() else {
        return;
    };
    let bridge = js_sys::Object::new();
    let entries: [(&str, &JsValue); 6] = [
        ("setPreference", bindings._set_preference.as_ref()),
        ("cycle", bindings._cycle.as_ref()),
        ("reset", bindings._reset.as_ref()),
        ("snapshot", bindings._snapshot.as_ref()),
        ("saveNow", bindings._save_now.as_ref()),
        ("setAutoSync", bindings._set_auto_sync.as_ref()),
    ];
    for (name, function) in entries {
        let _ = js_sys::Reflect::set(&bridge, &JsValue::from_str(name), function);
    }
    let _ = js_sys::Reflect::set(&window, &JsValue::from_str(BRIDGE_GLOBAL), &bridge);
    log::debug!("window.{BRIDGE_GLOBAL} installed");
}

#[hook]
pub fn use_page_bridge(handle: &EngineHandle) {
    let bridge_handle = use_mut_ref(|| None::<BridgeBindings>);
    let handle = handle.clone();

    use_effect_with(handle, move |handle| {
        if bridge_handle.borrow().is_none() {
            let bindings = build_bridge(handle);
            attach_bridge(&bindings);
            bindings.keep();
            *bridge_handle.borrow_mut() = Some(bindings);
        }
        || {}
    });
}
