//! Minimal in-memory element tree.
//!
//! Enough DOM for resolving the scope element and hosting classes outside a browser: tag,
//! id and class matching, parent links, and document-order search.
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::scope::ScopeTree;
use crate::surface::ClassSurface;

#[derive(Debug)]
struct NodeData {
    tag: String,
    id: Option<String>,
    classes: RefCell<Vec<String>>,
    parent: RefCell<Weak<NodeData>>,
    children: RefCell<Vec<MemoryElement>>,
}

/// Shared handle to an element. Equality is identity.
#[derive(Debug, Clone)]
pub struct MemoryElement(Rc<NodeData>);

impl PartialEq for MemoryElement {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for MemoryElement {}

impl MemoryElement {
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Self(Rc::new(NodeData {
            tag: tag.to_ascii_lowercase(),
            id: None,
            classes: RefCell::new(Vec::new()),
            parent: RefCell::new(Weak::new()),
            children: RefCell::new(Vec::new()),
        }))
    }

    #[must_use]
    pub fn with_id(tag: &str, id: &str) -> Self {
        Self(Rc::new(NodeData {
            tag: tag.to_ascii_lowercase(),
            id: Some(id.to_string()),
            classes: RefCell::new(Vec::new()),
            parent: RefCell::new(Weak::new()),
            children: RefCell::new(Vec::new()),
        }))
    }

    #[must_use]
    pub fn tag(&self) -> &str {
        &self.0.tag
    }

    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.0.id.as_deref()
    }

    /// Append `child` and return it, so trees can be built inline.
    pub fn append(&self, child: Self) -> Self {
        *child.0.parent.borrow_mut() = Rc::downgrade(&self.0);
        self.0.children.borrow_mut().push(child.clone());
        child
    }

    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.0.parent.borrow().upgrade().map(Self)
    }

    #[must_use]
    pub fn children(&self) -> Vec<Self> {
        self.0.children.borrow().clone()
    }

    /// Inclusive containment, like `Node.contains`.
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        let mut current = Some(other.clone());
        while let Some(node) = current {
            if node == *self {
                return true;
            }
            current = node.parent();
        }
        false
    }

    fn matches_compound(&self, compound: &str) -> bool {
        let mut tag = String::new();
        let mut parts: Vec<(char, String)> = Vec::new();
        for ch in compound.chars() {
            match ch {
                '#' | '.' => parts.push((ch, String::new())),
                _ => match parts.last_mut() {
                    Some((_, name)) => name.push(ch),
                    None => tag.push(ch),
                },
            }
        }
        if !tag.is_empty() && tag != "*" && !tag.eq_ignore_ascii_case(&self.0.tag) {
            return false;
        }
        parts.iter().all(|(kind, name)| match kind {
            '#' => self.id() == Some(name.as_str()),
            _ => self.has_class(name),
        })
    }

    /// Match a comma-separated list of simple selectors (`tag`, `#id`, `.class`, and
    /// compounds of those).
    #[must_use]
    pub fn matches(&self, selectors: &str) -> bool {
        selectors
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .any(|compound| self.matches_compound(compound))
    }

    /// First descendant (inclusive) in document order matching `selectors`.
    #[must_use]
    pub fn query_selector(&self, selectors: &str) -> Option<Self> {
        if self.matches(selectors) {
            return Some(self.clone());
        }
        self.children()
            .iter()
            .find_map(|child| child.query_selector(selectors))
    }
}

impl ClassSurface for MemoryElement {
    fn add_class(&self, class: &str) {
        let mut classes = self.0.classes.borrow_mut();
        if !classes.iter().any(|c| c == class) {
            classes.push(class.to_string());
        }
    }

    fn remove_class(&self, class: &str) {
        self.0.classes.borrow_mut().retain(|c| c != class);
    }

    fn has_class(&self, class: &str) -> bool {
        self.0.classes.borrow().iter().any(|c| c == class)
    }

    fn class_names(&self) -> Vec<String> {
        self.0.classes.borrow().clone()
    }
}

/// An `<html><body></body></html>` document.
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    root: MemoryElement,
    body: MemoryElement,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    #[must_use]
    pub fn new() -> Self {
        let root = MemoryElement::new("html");
        let body = root.append(MemoryElement::new("body"));
        Self { root, body }
    }

    #[must_use]
    pub const fn body_element(&self) -> &MemoryElement {
        &self.body
    }

    #[must_use]
    pub const fn document_element(&self) -> &MemoryElement {
        &self.root
    }

    /// Page layout used across tests: `body > #page > (header, #page-content > main, footer)`.
    #[must_use]
    pub fn with_standard_layout() -> Self {
        let doc = Self::new();
        let page = doc.body.append(MemoryElement::with_id("div", "page"));
        page.append(MemoryElement::with_id("header", "page-header"));
        let content = page.append(MemoryElement::with_id("div", "page-content"));
        content.append(MemoryElement::new("main"));
        page.append(MemoryElement::with_id("footer", "page-footer"));
        doc
    }
}

impl ScopeTree for MemoryDocument {
    type Node = MemoryElement;

    fn query_selector(&self, selectors: &str) -> Option<MemoryElement> {
        self.root.query_selector(selectors)
    }

    fn body(&self) -> Option<MemoryElement> {
        Some(self.body.clone())
    }

    fn parent_of(&self, node: &MemoryElement) -> Option<MemoryElement> {
        node.parent()
    }

    fn contains(&self, ancestor: &MemoryElement, node: &MemoryElement) -> bool {
        ancestor.contains(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selectors_match_tag_id_and_class() {
        let el = MemoryElement::with_id("div", "page-header");
        el.add_class("header");
        assert!(el.matches("#page-header"));
        assert!(el.matches("div.header"));
        assert!(el.matches("footer, .header"));
        assert!(!el.matches("header"));
        assert!(!el.matches("div#other"));
    }

    #[test]
    fn query_returns_first_match_in_document_order() {
        let doc = MemoryDocument::with_standard_layout();
        let hit = doc.query_selector("footer, header").unwrap();
        assert_eq!(hit.tag(), "header");
        assert_eq!(doc.query_selector("main").map(|m| m.tag().to_string()), Some("main".into()));
        assert!(doc.query_selector("#region-main").is_none());
    }

    #[test]
    fn classes_are_deduplicated_and_removable() {
        let el = MemoryElement::new("div");
        el.add_class("a");
        el.add_class("b");
        el.add_class("a");
        assert_eq!(el.class_names(), vec!["a", "b"]);
        el.remove_class("a");
        assert!(!el.has_class("a"));
        el.remove_class("missing");
        assert_eq!(el.class_names(), vec!["b"]);
    }

    #[test]
    fn containment_is_inclusive() {
        let doc = MemoryDocument::with_standard_layout();
        let page = doc.query_selector("#page").unwrap();
        let main = doc.query_selector("main").unwrap();
        assert!(page.contains(&main));
        assert!(page.contains(&page));
        assert!(!main.contains(&page));
        assert_eq!(main.parent().and_then(|p| p.id().map(String::from)), Some("page-content".into()));
    }
}
