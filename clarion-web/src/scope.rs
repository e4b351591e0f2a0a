//! Live-DOM scope tree and class surface.
use clarion_core::{ClassSurface, ScopeTree};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element};

/// Handle to the element accessibility classes are applied to.
#[derive(Debug, Clone, PartialEq)]
pub struct ScopeElement(pub Element);

impl ScopeElement {
    #[must_use]
    pub const fn element(&self) -> &Element {
        &self.0
    }
}

impl ClassSurface for ScopeElement {
    fn add_class(&self, class: &str) {
        if let Err(err) = self.0.class_list().add_1(class) {
            log::warn!("could not add class {class}: {err:?}");
        }
    }

    fn remove_class(&self, class: &str) {
        if let Err(err) = self.0.class_list().remove_1(class) {
            log::warn!("could not remove class {class}: {err:?}");
        }
    }

    fn has_class(&self, class: &str) -> bool {
        self.0.class_list().contains(class)
    }

    fn class_names(&self) -> Vec<String> {
        let list = self.0.class_list();
        (0..list.length()).filter_map(|i| list.item(i)).collect()
    }
}

/// The page document, queried through `querySelector`.
#[derive(Debug, Clone)]
pub struct DomScope {
    document: Document,
}

impl DomScope {
    #[must_use]
    pub const fn new(document: Document) -> Self {
        Self { document }
    }
}

impl ScopeTree for DomScope {
    type Node = ScopeElement;

    fn query_selector(&self, selectors: &str) -> Option<ScopeElement> {
        // Invalid selectors from configuration throw; treat them as "no match".
        self.document
            .query_selector(selectors)
            .ok()
            .flatten()
            .map(ScopeElement)
    }

    fn body(&self) -> Option<ScopeElement> {
        self.document
            .body()
            .map(|body| ScopeElement(body.unchecked_into::<Element>()))
    }

    fn parent_of(&self, node: &ScopeElement) -> Option<ScopeElement> {
        node.0.parent_element().map(ScopeElement)
    }

    fn contains(&self, ancestor: &ScopeElement, node: &ScopeElement) -> bool {
        ancestor.0.contains(Some(&node.0))
    }
}
