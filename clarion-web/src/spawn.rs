use clarion_core::Spawn;
use futures::future::LocalBoxFuture;

/// Runs engine tasks on the browser microtask queue.
#[derive(Debug, Default, Clone, Copy)]
pub struct WasmSpawner;

impl Spawn for WasmSpawner {
    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(task);
    }
}
