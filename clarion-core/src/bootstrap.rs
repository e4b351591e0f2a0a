//! Page-load sequence: resolve scope, read preferences, replay silently.
use log::{debug, info, warn};
use std::rc::Rc;

use crate::engine::{Capabilities, StateEngine};
use crate::scope::{ScopeResolver, ScopeTree};
use crate::store::{PreferenceStore, ReadSource};
use crate::surface::ClassSurface;

pub struct Bootstrapper<T: ScopeTree>
where
    T::Node: ClassSurface,
{
    resolver: Rc<ScopeResolver<T>>,
    store: PreferenceStore,
    caps: Capabilities,
    prefix: String,
}

impl<T: ScopeTree> Bootstrapper<T>
where
    T::Node: ClassSurface,
{
    pub fn new(
        resolver: Rc<ScopeResolver<T>>,
        store: PreferenceStore,
        caps: Capabilities,
        prefix: &str,
    ) -> Self {
        Self {
            resolver,
            store,
            caps,
            prefix: prefix.to_string(),
        }
    }

    /// The shared resolver, for cooperating features.
    pub const fn resolver(&self) -> &Rc<ScopeResolver<T>> {
        &self.resolver
    }

    /// Build the page's engine. Never fails; an unreachable store yields local values and
    /// an empty cache yields defaults.
    pub async fn init(&self) -> StateEngine<T::Node> {
        let scope = self.resolver.element();
        if scope.is_none() {
            warn!("no scope element found; preferences will be tracked without effects");
        }

        let report = self.store.read_all_detailed().await;
        match report.source {
            ReadSource::Remote => info!("preferences loaded from remote store"),
            ReadSource::LocalOnly => info!("preferences loaded from local cache"),
        }
        for err in &report.rejected {
            debug!("persisted value ignored: {err}");
        }

        let mut engine =
            StateEngine::new(scope, self.store.clone(), self.caps.clone(), &self.prefix);
        engine.replay(&report.snapshot);
        engine
    }
}
