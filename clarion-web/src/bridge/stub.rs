use crate::handle::EngineHandle;
use yew::prelude::*;

#[hook]
pub fn use_page_bridge(handle: &EngineHandle) {
    let _ = handle;
}
