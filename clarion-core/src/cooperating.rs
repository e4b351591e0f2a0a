//! Features outside the registry (magnifier, reading guide overlays) that share the scope.
use log::debug;

use crate::error::A11yError;
use crate::registry::{EffectRegistry, class_name};
use crate::scope::{ScopeResolver, ScopeTree};
use crate::surface::ClassSurface;

/// Holds a single namespaced class, `<prefix>-<name>-active`, on the shared scope element.
///
/// The feature only ever adds or removes its own class, and drops it on release.
pub struct CooperatingFeature<S: ClassSurface> {
    name: String,
    class: String,
    scope: Option<S>,
}

impl<S: ClassSurface> CooperatingFeature<S> {
    /// Lease a class on the resolver's scope element.
    ///
    /// # Errors
    ///
    /// Returns [`A11yError::ReservedClass`] if the name collides with a registry class.
    pub fn lease<T>(resolver: &ScopeResolver<T>, prefix: &str, name: &str) -> Result<Self, A11yError>
    where
        T: ScopeTree<Node = S>,
    {
        let registry = EffectRegistry::standard();
        let stem = class_name(prefix, name);
        let class = format!("{stem}-active");
        if registry.owns_class(prefix, &stem) || registry.owns_class(prefix, &class) {
            return Err(A11yError::ReservedClass(class));
        }
        Ok(Self {
            name: name.to_string(),
            class,
            scope: resolver.element(),
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn activate(&self) {
        if let Some(scope) = &self.scope {
            debug!("{} active", self.name);
            scope.add_class(&self.class);
        }
    }

    pub fn deactivate(&self) {
        if let Some(scope) = &self.scope {
            scope.remove_class(&self.class);
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.scope
            .as_ref()
            .is_some_and(|scope| scope.has_class(&self.class))
    }
}

impl<S: ClassSurface> Drop for CooperatingFeature<S> {
    fn drop(&mut self) {
        self.deactivate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{MemoryDocument, MemoryElement};
    use crate::engine::{Capabilities, StateEngine};
    use crate::registry::ToggleId;
    use crate::store::{MemoryCache, PreferenceStore};
    use crate::task::TaskQueue;
    use std::rc::Rc;

    fn resolver() -> ScopeResolver<MemoryDocument> {
        ScopeResolver::new(MemoryDocument::with_standard_layout())
    }

    #[test]
    fn leases_namespaced_class_on_shared_scope() {
        let resolver = resolver();
        let magnifier = CooperatingFeature::lease(&resolver, "clarion", "magnifier").unwrap();
        magnifier.activate();
        let scope = resolver.element().unwrap();
        assert!(scope.has_class("clarion-magnifier-active"));
        assert!(magnifier.is_active());
        drop(magnifier);
        assert!(!scope.has_class("clarion-magnifier-active"));
    }

    #[test]
    fn registry_names_are_reserved() {
        let resolver = resolver();
        let err = CooperatingFeature::<MemoryElement>::lease(&resolver, "clarion", "reading-helper")
            .err()
            .unwrap();
        assert!(matches!(err, A11yError::ReservedClass(_)));
    }

    #[test]
    fn engine_reset_leaves_cooperating_classes_alone() {
        let resolver = resolver();
        let feature = CooperatingFeature::lease(&resolver, "clarion", "magnifier").unwrap();
        let store = PreferenceStore::new("clarion", Rc::new(MemoryCache::default()));
        let mut engine = StateEngine::new(
            resolver.element(),
            store,
            Capabilities::new(Rc::new(TaskQueue::new())),
            "clarion",
        );
        feature.activate();
        engine.toggle_boolean(ToggleId::HideImages);
        engine.reset_all();
        assert!(feature.is_active());

        feature.deactivate();
        engine.toggle_boolean(ToggleId::HideImages);
        assert_eq!(
            engine.scope().unwrap().class_names(),
            vec!["clarion-hide-images"]
        );
    }
}
