//! [`Page`] over the in-memory DOM.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use mignon_storefront::config::{CONFIG_ELEMENT_ID, ConfigError, StorefrontConfig};
use mignon_storefront::Page;
use tracing::warn;

use crate::dom::{Dom, NodeId, ParseError};

/// A `console.log` call.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsoleEntry {
    pub message: String,
    pub payload: serde_json::Value,
}

#[derive(Debug, Default)]
struct PageState {
    dom: Dom,
    alerts: Vec<String>,
    console: Vec<ConsoleEntry>,
}

/// Fake browser page. Clones share the same document, so a test can keep a
/// handle while the controller owns another.
#[derive(Debug, Clone, Default)]
pub struct FakePage {
    state: Rc<RefCell<PageState>>,
}

impl FakePage {
    /// Load a document.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the markup cannot be read.
    pub fn parse(html: &str) -> Result<Self, ParseError> {
        let dom = Dom::parse(html)?;
        Ok(Self {
            state: Rc::new(RefCell::new(PageState {
                dom,
                ..PageState::default()
            })),
        })
    }

    /// Borrow the document.
    ///
    /// # Panics
    ///
    /// Panics if the document is being mutated.
    #[must_use]
    pub fn dom(&self) -> Ref<'_, Dom> {
        Ref::map(self.state.borrow(), |state| &state.dom)
    }

    fn with_dom_mut<R>(&self, f: impl FnOnce(&mut Dom) -> R) -> R {
        f(&mut self.state.borrow_mut().dom)
    }

    #[must_use]
    pub fn by_id(&self, id: &str) -> Option<NodeId> {
        self.dom().by_id(id)
    }

    #[must_use]
    pub fn by_class(&self, class: &str) -> Vec<NodeId> {
        self.dom().by_class(class)
    }

    /// Text of the element with the given `id`.
    #[must_use]
    pub fn text_of(&self, id: &str) -> Option<String> {
        let dom = self.dom();
        dom.by_id(id).map(|node| dom.text_content(node))
    }

    #[must_use]
    pub fn text_content(&self, node: NodeId) -> String {
        self.dom().text_content(node)
    }

    #[must_use]
    pub fn attr(&self, node: NodeId, name: &str) -> Option<String> {
        self.dom().attribute(node, name).map(str::to_string)
    }

    #[must_use]
    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.dom().has_class(node, class)
    }

    #[must_use]
    pub fn is_disabled(&self, node: NodeId) -> bool {
        self.dom().attribute(node, "disabled").is_some()
    }

    #[must_use]
    pub fn is_connected(&self, node: NodeId) -> bool {
        self.dom().is_connected(node)
    }

    /// `node` followed by its ancestors, the path a bubbling event takes.
    #[must_use]
    pub fn event_path(&self, node: NodeId) -> Vec<NodeId> {
        let dom = self.dom();
        std::iter::successors(Some(node), |&current| dom.parent(current)).collect()
    }

    /// Type into a form control.
    pub fn set_value(&self, node: NodeId, value: &str) {
        self.with_dom_mut(|dom| dom.set_value(node, value));
    }

    #[must_use]
    pub fn value(&self, node: NodeId) -> String {
        self.dom().value(node)
    }

    /// Alerts shown so far.
    #[must_use]
    pub fn alerts(&self) -> Vec<String> {
        self.state.borrow().alerts.clone()
    }

    /// Console output so far.
    #[must_use]
    pub fn console(&self) -> Vec<ConsoleEntry> {
        self.state.borrow().console.clone()
    }

    /// Configuration from the page's `#mignon-config` block, or the defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the block is present but invalid.
    pub fn config(&self) -> Result<StorefrontConfig, ConfigError> {
        match self.text_of(CONFIG_ELEMENT_ID) {
            Some(json) if !json.trim().is_empty() => StorefrontConfig::from_json(&json),
            _ => Ok(StorefrontConfig::default()),
        }
    }
}

impl Page for FakePage {
    type Element = NodeId;

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.dom().by_id(id)
    }

    fn elements_by_class(&self, class: &str) -> Vec<NodeId> {
        self.dom().by_class(class)
    }

    fn closest(&self, element: &NodeId, class: &str) -> Option<NodeId> {
        self.dom().closest(*element, class)
    }

    fn query(&self, scope: &NodeId, selector: &str) -> Option<NodeId> {
        self.dom().query(*scope, selector)
    }

    fn body_has_class(&self, class: &str) -> bool {
        let dom = self.dom();
        dom.by_tag("body").is_some_and(|body| dom.has_class(body, class))
    }

    fn attribute(&self, element: &NodeId, name: &str) -> Option<String> {
        self.attr(*element, name)
    }

    fn set_attribute(&self, element: &NodeId, name: &str, value: &str) {
        self.with_dom_mut(|dom| dom.set_attribute(*element, name, value));
    }

    fn text(&self, element: &NodeId) -> String {
        self.text_content(*element)
    }

    fn set_text(&self, element: &NodeId, text: &str) {
        self.with_dom_mut(|dom| dom.set_text_content(*element, text));
    }

    fn add_class(&self, element: &NodeId, class: &str) {
        self.with_dom_mut(|dom| dom.add_class(*element, class));
    }

    fn remove_class(&self, element: &NodeId, class: &str) {
        self.with_dom_mut(|dom| dom.remove_class(*element, class));
    }

    fn toggle_class(&self, element: &NodeId, class: &str) {
        self.with_dom_mut(|dom| dom.toggle_class(*element, class));
    }

    fn set_disabled(&self, element: &NodeId, disabled: bool) {
        self.with_dom_mut(|dom| {
            if disabled {
                dom.set_attribute(*element, "disabled", "");
            } else {
                dom.remove_attribute(*element, "disabled");
            }
        });
    }

    fn image_src(&self, element: &NodeId) -> Option<String> {
        self.attr(*element, "src")
    }

    fn set_inner_html(&self, element: &NodeId, html: &str) {
        if let Err(e) = self.with_dom_mut(|dom| dom.set_inner_html(*element, html)) {
            warn!("Discarding unreadable markup: {e}");
        }
    }

    fn form_entries(&self, form: &NodeId) -> Vec<(String, String)> {
        self.dom().form_entries(*form)
    }

    fn reset_form(&self, form: &NodeId) {
        self.with_dom_mut(|dom| dom.reset_form(*form));
    }

    fn alert(&self, message: &str) {
        self.state.borrow_mut().alerts.push(message.to_string());
    }

    fn log(&self, message: &str, payload: &serde_json::Value) {
        self.state.borrow_mut().console.push(ConsoleEntry {
            message: message.to_string(),
            payload: payload.clone(),
        });
    }
}
