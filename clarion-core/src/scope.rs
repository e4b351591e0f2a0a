//! Choosing the element accessibility classes are applied to.
//!
//! The scope is the primary content container, widened to the nearest ancestor that also
//! holds the page header and footer. It is never `<body>` unless nothing better exists,
//! because the toolkit's own floating UI is appended to `<body>`.
use log::{debug, warn};
use once_cell::unsync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::error::A11yError;

/// Read-only view of a document, enough to locate landmarks.
pub trait ScopeTree {
    type Node: Clone + PartialEq;

    /// First element in document order matching a comma-separated selector list.
    fn query_selector(&self, selectors: &str) -> Option<Self::Node>;
    fn body(&self) -> Option<Self::Node>;
    fn parent_of(&self, node: &Self::Node) -> Option<Self::Node>;
    /// Inclusive containment.
    fn contains(&self, ancestor: &Self::Node, node: &Self::Node) -> bool;
}

/// Landmark selectors consulted during resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeSelectors {
    /// Content container candidates, most specific first.
    pub content: Vec<String>,
    pub header: String,
    pub footer: String,
}

impl Default for ScopeSelectors {
    fn default() -> Self {
        Self {
            content: ["#page", "#page-content", "main", "#region-main"]
                .map(String::from)
                .to_vec(),
            header: "header, #page-header, .page-header, .header, #moodleheader".to_string(),
            footer: "footer, #page-footer, .page-footer, .footer, #moodlefooter".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeSource {
    /// The first content candidate that matched.
    Landmark(String),
    /// An ancestor of the content container holding both header and footer.
    CommonAncestor,
    /// No candidate matched.
    Body,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScopeResolution<N> {
    pub element: N,
    pub source: ScopeSource,
}

/// Resolves the scope element once and remembers it for the page's lifetime.
pub struct ScopeResolver<T: ScopeTree> {
    tree: T,
    selectors: ScopeSelectors,
    resolved: OnceCell<Option<ScopeResolution<T::Node>>>,
}

impl<T: ScopeTree> ScopeResolver<T> {
    pub fn new(tree: T) -> Self {
        Self::with_selectors(tree, ScopeSelectors::default())
    }

    pub const fn with_selectors(tree: T, selectors: ScopeSelectors) -> Self {
        Self {
            tree,
            selectors,
            resolved: OnceCell::new(),
        }
    }

    pub const fn tree(&self) -> &T {
        &self.tree
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.get().is_some()
    }

    /// The memoized resolution. `None` only when the document has no body at all.
    pub fn resolve(&self) -> Option<&ScopeResolution<T::Node>> {
        self.resolved.get_or_init(|| self.compute()).as_ref()
    }

    /// Convenience for cooperating features that only need the element.
    pub fn element(&self) -> Option<T::Node> {
        self.resolve().map(|resolution| resolution.element.clone())
    }

    fn compute(&self) -> Option<ScopeResolution<T::Node>> {
        let body = self.tree.body();
        let landmark = self.selectors.content.iter().find_map(|selector| {
            self.tree
                .query_selector(selector)
                .filter(|node| Some(node) != body.as_ref())
                .map(|node| (selector.clone(), node))
        });

        let Some((selector, content)) = landmark else {
            let err = A11yError::ScopeResolutionAmbiguity(format!(
                "no content container matched {:?}",
                self.selectors.content
            ));
            warn!("{err}; applying effects to <body>");
            return body.map(|element| ScopeResolution {
                element,
                source: ScopeSource::Body,
            });
        };

        if let Some(ancestor) = self.common_ancestor(&content, body.as_ref()) {
            debug!("scope widened from {selector} to header/footer ancestor");
            return Some(ScopeResolution {
                element: ancestor,
                source: ScopeSource::CommonAncestor,
            });
        }

        debug!("scope resolved to {selector}");
        Some(ScopeResolution {
            element: content,
            source: ScopeSource::Landmark(selector),
        })
    }

    fn common_ancestor(&self, content: &T::Node, body: Option<&T::Node>) -> Option<T::Node> {
        let header = self.tree.query_selector(&self.selectors.header)?;
        let footer = self.tree.query_selector(&self.selectors.footer)?;
        let mut current = self.tree.parent_of(content);
        while let Some(node) = current {
            if Some(&node) == body {
                return None;
            }
            if self.tree.contains(&node, &header) && self.tree.contains(&node, &footer) {
                return Some(node);
            }
            current = self.tree.parent_of(&node);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{MemoryDocument, MemoryElement};

    #[test]
    fn widens_to_ancestor_holding_header_and_footer() {
        let doc = MemoryDocument::new();
        let wrapper = doc.body_element().append(MemoryElement::with_id("div", "wrapper"));
        wrapper.append(MemoryElement::new("header"));
        let main = wrapper
            .append(MemoryElement::new("div"))
            .append(MemoryElement::new("main"));
        wrapper.append(MemoryElement::new("footer"));

        let resolver = ScopeResolver::new(doc);
        let resolution = resolver.resolve().unwrap();
        assert_eq!(resolution.source, ScopeSource::CommonAncestor);
        assert_eq!(resolution.element, wrapper);
        assert_ne!(resolution.element, main);
    }

    #[test]
    fn host_header_and_footer_ids_count_as_landmarks() {
        let doc = MemoryDocument::new();
        let shell = doc.body_element().append(MemoryElement::with_id("div", "shell"));
        shell.append(MemoryElement::with_id("div", "moodleheader"));
        shell
            .append(MemoryElement::with_id("div", "region-main"))
            .append(MemoryElement::new("section"));
        shell.append(MemoryElement::with_id("div", "moodlefooter"));

        let resolver = ScopeResolver::new(doc);
        let resolution = resolver.resolve().unwrap();
        assert_eq!(resolution.source, ScopeSource::CommonAncestor);
        assert_eq!(resolution.element, shell);
    }

    #[test]
    fn prefers_content_when_only_body_holds_landmarks() {
        let doc = MemoryDocument::new();
        let body = doc.body_element().clone();
        body.append(MemoryElement::new("header"));
        let main = body.append(MemoryElement::new("main"));
        body.append(MemoryElement::new("footer"));

        let resolver = ScopeResolver::new(doc);
        let resolution = resolver.resolve().unwrap();
        assert_eq!(resolution.element, main);
        assert_eq!(resolution.source, ScopeSource::Landmark("main".into()));
    }

    #[test]
    fn standard_layout_resolves_to_page_wrapper() {
        let resolver = ScopeResolver::new(MemoryDocument::with_standard_layout());
        let resolution = resolver.resolve().unwrap();
        assert_eq!(resolution.element.id(), Some("page"));
        assert_eq!(resolution.source, ScopeSource::Landmark("#page".into()));
    }

    #[test]
    fn falls_back_to_body_without_landmarks() {
        let doc = MemoryDocument::new();
        doc.body_element().append(MemoryElement::new("div"));
        let body = doc.body_element().clone();
        let resolver = ScopeResolver::new(doc);
        let resolution = resolver.resolve().unwrap();
        assert_eq!(resolution.source, ScopeSource::Body);
        assert_eq!(resolution.element, body);
    }

    #[test]
    fn resolution_is_memoized() {
        let doc = MemoryDocument::new();
        let body = doc.body_element().clone();
        let resolver = ScopeResolver::new(doc);
        assert!(!resolver.is_resolved());
        let first = resolver.element().unwrap();
        assert_eq!(first, body);

        // A landmark added after resolution does not move the scope.
        body.append(MemoryElement::new("main"));
        assert!(resolver.is_resolved());
        assert_eq!(resolver.element().unwrap(), first);
    }
}
