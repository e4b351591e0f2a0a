//! The class list of the scope element.

/// Mutable class list shared by the engine and cooperating features.
///
/// Implementations are handles; mutation goes through `&self` the way DOM nodes behave.
pub trait ClassSurface {
    fn add_class(&self, class: &str);
    fn remove_class(&self, class: &str);
    fn has_class(&self, class: &str) -> bool;
    fn class_names(&self) -> Vec<String>;
}
