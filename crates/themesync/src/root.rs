//! Root element model.
//!
//! [`RootElement`] is the slice of the document root that this crate writes
//! to: its class list, its attributes and its inline style block. Two
//! writers share it through a [`RootHandle`]:
//!
//! - the sync adapter owns the `light`/`dark` class markers and the library
//!   color-scheme attribute,
//! - the style override bridge owns inline custom properties.
//!
//! The concerns are disjoint, so neither writer needs anything beyond a
//! short `borrow_mut` for the duration of a single write.

use std::cell::{Ref, RefCell, RefMut};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde::Serialize;

/// Class list, attributes and inline style of the document root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RootElement {
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    style: BTreeMap<String, String>,
}

impl RootElement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a class token. Adding a token that is already present is a no-op.
    pub fn add_class(&mut self, token: &str) {
        if !self.has_class(token) {
            self.classes.push(token.to_string());
        }
    }

    /// Removes every listed class token that is present.
    pub fn remove_classes(&mut self, tokens: &[&str]) {
        self.classes.retain(|class| !tokens.contains(&class.as_str()));
    }

    pub fn has_class(&self, token: &str) -> bool {
        self.classes.iter().any(|class| class == token)
    }

    /// Class tokens in insertion order.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// The space-separated `class` attribute value.
    pub fn class_name(&self) -> String {
        self.classes.join(" ")
    }

    pub fn set_attribute(&mut self, name: &str, value: &str) {
        self.attributes.insert(name.to_string(), value.to_string());
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        self.attributes.remove(name)
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// Sets an inline style property, replacing any previous value.
    pub fn set_style_property(&mut self, name: &str, value: &str) {
        self.style.insert(name.to_string(), value.to_string());
    }

    pub fn style_property(&self, name: &str) -> Option<&str> {
        self.style.get(name).map(String::as_str)
    }

    pub fn style_properties(&self) -> &BTreeMap<String, String> {
        &self.style
    }

    /// The inline style block as `name: value;` pairs, sorted by name.
    pub fn css_text(&self) -> String {
        self.style
            .iter()
            .map(|(name, value)| format!("{}: {};", name, value))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Clears the inline style block.
    pub fn clear_style(&mut self) {
        self.style.clear();
    }
}

/// Shared handle to a [`RootElement`].
///
/// Clones point at the same element.
#[derive(Clone, Default)]
pub struct RootHandle {
    element: Rc<RefCell<RootElement>>,
}

impl RootHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn borrow(&self) -> Ref<'_, RootElement> {
        self.element.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, RootElement> {
        self.element.borrow_mut()
    }

    /// Copies the current state of the element.
    pub fn snapshot(&self) -> RootElement {
        self.element.borrow().clone()
    }

    /// Returns true if both handles point at the same element.
    pub fn ptr_eq(&self, other: &RootHandle) -> bool {
        Rc::ptr_eq(&self.element, &other.element)
    }
}

impl fmt::Debug for RootHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RootHandle").field(&*self.element.borrow()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_class_is_idempotent() {
        let mut root = RootElement::new();
        root.add_class("dark");
        root.add_class("dark");
        assert_eq!(root.classes(), ["dark".to_string()]);
    }

    #[test]
    fn test_remove_classes_leaves_others() {
        let mut root = RootElement::new();
        root.add_class("app");
        root.add_class("light");
        root.add_class("dark");
        root.remove_classes(&["light", "dark"]);
        assert_eq!(root.class_name(), "app");
    }

    #[test]
    fn test_style_property_overwrites() {
        let mut root = RootElement::new();
        root.set_style_property("--x", "#123456");
        root.set_style_property("--x", "#654321");
        assert_eq!(root.style_property("--x"), Some("#654321"));
        assert_eq!(root.style_properties().len(), 1);
    }

    #[test]
    fn test_css_text_is_sorted() {
        let mut root = RootElement::new();
        root.set_style_property("--b", "2");
        root.set_style_property("--a", "1");
        assert_eq!(root.css_text(), "--a: 1; --b: 2;");

        root.clear_style();
        assert_eq!(root.css_text(), "");
    }

    #[test]
    fn test_attributes() {
        let mut root = RootElement::new();
        root.set_attribute("data-scheme", "dark");
        assert_eq!(root.attribute("data-scheme"), Some("dark"));
        assert_eq!(root.remove_attribute("data-scheme"), Some("dark".to_string()));
        assert_eq!(root.attribute("data-scheme"), None);
    }

    #[test]
    fn test_handle_clones_share_element() {
        let handle = RootHandle::new();
        let other = handle.clone();
        other.borrow_mut().add_class("dark");
        assert!(handle.borrow().has_class("dark"));
        assert!(handle.ptr_eq(&other));
        assert!(!handle.ptr_eq(&RootHandle::new()));
    }
}
