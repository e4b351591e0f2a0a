//! Browser front-end of the Clarion accessibility toolkit.
//!
//! Wires `clarion-core` to `localStorage`, the host's preference endpoints, the live DOM and
//! speech synthesis, then mounts the accessibility panel and the `window.clarion` bridge.
#![forbid(unsafe_code)]
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

pub mod a11y;
pub mod bridge;
pub mod config;
pub mod dom;
pub mod handle;
pub mod logging;
pub mod panel;
pub mod paths;
pub mod remote;
pub mod scope;
pub mod spawn;
pub mod speech;
pub mod storage;

/// Id of the container the panel is rendered into.
pub const PANEL_ROOT_ID: &str = "clarion-root";

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    use clarion_core::{Bootstrapper, Capabilities, PreferenceStore, ScopeResolver};
    use std::rc::Rc;

    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    let config = config::load();
    logging::init(config.level_filter());
    a11y::inject_focus_css();

    let document = match dom::document() {
        Ok(document) => document,
        Err(err) => {
            dom::console_error(&format!("clarion: {err}"));
            return;
        }
    };

    let endpoints = paths::Endpoints::new(config.endpoint_base.as_deref(), config.session_key.clone());
    let store = PreferenceStore::new(&config.namespace, Rc::new(storage::LocalStorageCache))
        .with_remote(Rc::new(remote::FetchRemoteStore::new(endpoints)));
    store.set_auto_sync(config.auto_sync);

    let resolver = Rc::new(ScopeResolver::with_selectors(
        scope::DomScope::new(document.clone()),
        config.scope_selectors(),
    ));
    let caps = Capabilities::new(Rc::new(spawn::WasmSpawner))
        .with_status(Rc::new(a11y::LiveRegionSink))
        .with_speech(Rc::new(speech::BrowserSpeech::detect()));
    let bootstrapper = Bootstrapper::new(resolver, store, caps, &config.class_prefix);

    wasm_bindgen_futures::spawn_local(async move {
        let engine = bootstrapper.init().await;
        let handle = handle::EngineHandle::new(engine);
        if let Err(err) = mount_panel(&document, handle) {
            log::error!("panel not mounted: {err}");
        }
    });
}

/// Render the panel into a container appended to `<body>`, outside the scope element.
#[cfg(target_arch = "wasm32")]
fn mount_panel(document: &web_sys::Document, handle: handle::EngineHandle) -> Result<(), dom::WebError> {
    let body = document.body().ok_or(dom::WebError::NoDocument)?;
    let root = match document.get_element_by_id(PANEL_ROOT_ID) {
        Some(existing) => existing,
        None => {
            let created = document
                .create_element("div")
                .map_err(|err| dom::WebError::js(&err))?;
            created.set_id(PANEL_ROOT_ID);
            body.append_child(&created)
                .map_err(|err| dom::WebError::js(&err))?;
            created
        }
    };
    yew::Renderer::<panel::AccessibilityPanel>::with_root_and_props(
        root,
        panel::Props {
            handle,
            initially_open: false,
        },
    )
    .render();
    Ok(())
}
