//! Page-script API on `window.clarion`.
#[cfg(any(test, target_arch = "wasm32"))]
mod shared;
#[cfg(not(target_arch = "wasm32"))]
mod stub;
#[cfg(target_arch = "wasm32")]
mod wasm;

use crate::handle::EngineHandle;
use yew::prelude::*;

#[cfg(not(target_arch = "wasm32"))]
#[hook]
pub fn use_page_bridge(handle: &EngineHandle) {
    stub::use_page_bridge(handle);
}

#[cfg(target_arch = "wasm32")]
#[hook]
pub fn use_page_bridge(handle: &EngineHandle) {
    wasm::use_page_bridge(handle);
}
