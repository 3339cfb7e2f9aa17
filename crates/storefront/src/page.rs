//! The page the widget runs on, and the commands bound to its controls.
//!
//! [`Page`] is the slice of the DOM the controller needs: element lookup,
//! attributes, text, classes, and the few browser dialogs it opens. The
//! browser backend implements it over `web-sys`; tests implement it over an
//! in-memory document.
//!
//! The controller never registers event listeners itself. It hands the host
//! [`Binding`]s (control + event + [`Command`]) and the host calls
//! [`CartController::dispatch`](crate::CartController::dispatch) when one
//! fires. A dispatch returns a [`Reaction`] telling the host what to do next.

use std::fmt;
use std::time::Duration;

use mignon_core::ProductId;

/// DOM access used by the controller.
///
/// Selectors passed to [`query`](Page::query) are simple CSS selectors (a tag
/// name or `.class`). Mutators are infallible: the DOM either applies the
/// change or the element is gone, and neither case concerns the caller.
pub trait Page {
    /// Handle to an element. Cheap to clone; equal handles denote the same
    /// element.
    type Element: Clone + PartialEq + fmt::Debug;

    fn element_by_id(&self, id: &str) -> Option<Self::Element>;

    /// All elements in the document carrying `class`, in document order.
    fn elements_by_class(&self, class: &str) -> Vec<Self::Element>;

    /// The element itself or its nearest ancestor carrying `class`.
    fn closest(&self, element: &Self::Element, class: &str) -> Option<Self::Element>;

    /// First descendant of `scope` matching `selector`.
    fn query(&self, scope: &Self::Element, selector: &str) -> Option<Self::Element>;

    fn body_has_class(&self, class: &str) -> bool;

    /// Value of the `data-{key}` attribute.
    fn data(&self, element: &Self::Element, key: &str) -> Option<String> {
        self.attribute(element, &format!("data-{key}"))
    }

    fn attribute(&self, element: &Self::Element, name: &str) -> Option<String>;
    fn set_attribute(&self, element: &Self::Element, name: &str, value: &str);

    fn text(&self, element: &Self::Element) -> String;
    fn set_text(&self, element: &Self::Element, text: &str);

    fn add_class(&self, element: &Self::Element, class: &str);
    fn remove_class(&self, element: &Self::Element, class: &str);
    fn toggle_class(&self, element: &Self::Element, class: &str);

    fn set_disabled(&self, element: &Self::Element, disabled: bool);

    /// Resolved image URL of an `<img>`.
    fn image_src(&self, element: &Self::Element) -> Option<String>;

    /// Replace an element's children with parsed markup.
    fn set_inner_html(&self, element: &Self::Element, html: &str);

    /// Name/value pairs a form would submit, in document order.
    fn form_entries(&self, form: &Self::Element) -> Vec<(String, String)>;
    fn reset_form(&self, form: &Self::Element);

    /// Blocking message dialog.
    fn alert(&self, message: &str);

    /// Developer console output.
    fn log(&self, message: &str, payload: &serde_json::Value);
}

/// DOM event a binding listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Click,
    /// Form submission. Hosts must cancel the browser's default navigation.
    Submit,
}

impl EventKind {
    /// DOM event name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::Submit => "submit",
        }
    }
}

/// What a control does when its event fires.
#[derive(Debug, Clone, PartialEq)]
pub enum Command<E> {
    ToggleMenu,
    /// Add the product whose card encloses this control.
    AddToCart(E),
    RemoveLine(ProductId),
    IncrementLine(ProductId),
    DecrementLine(ProductId),
    Checkout,
}

/// A control, the event it listens for, and the command it triggers.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding<E> {
    pub target: E,
    pub event: EventKind,
    pub command: Command<E>,
}

impl<E> Binding<E> {
    #[must_use]
    pub const fn click(target: E, command: Command<E>) -> Self {
        Self {
            target,
            event: EventKind::Click,
            command,
        }
    }

    #[must_use]
    pub const fn submit(target: E, command: Command<E>) -> Self {
        Self {
            target,
            event: EventKind::Submit,
            command,
        }
    }
}

/// Work to run after a delay.
#[derive(Debug, Clone, PartialEq)]
pub struct Deferred<E> {
    pub delay: Duration,
    pub task: Task<E>,
}

/// Deferred tasks. They are fire-and-forget: nothing cancels them, and a task
/// whose element has left the page has no visible effect.
#[derive(Debug, Clone, PartialEq)]
pub enum Task<E> {
    /// Give an add-to-cart control its label back and re-enable it.
    RestoreControl { control: E, label: String },
}

/// Bindings produced by the initial setup.
#[derive(Debug, Clone, PartialEq)]
pub struct Setup<E> {
    /// Bindings that live as long as the page.
    pub bindings: Vec<Binding<E>>,
    /// Bindings for the rendered cart rows (empty off the cart page).
    pub rows: Vec<Binding<E>>,
}

/// What the host must do after a dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct Reaction<E> {
    /// Present when the cart rows were re-rendered. The previous row
    /// bindings belong to elements that no longer exist and must be
    /// replaced by these.
    pub rows: Option<Vec<Binding<E>>>,
    /// Tasks to schedule.
    pub deferred: Vec<Deferred<E>>,
}

impl<E> Reaction<E> {
    /// Nothing to do.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            rows: None,
            deferred: Vec::new(),
        }
    }

    /// Replace the row bindings.
    #[must_use]
    pub const fn rerendered(rows: Option<Vec<Binding<E>>>) -> Self {
        Self {
            rows,
            deferred: Vec::new(),
        }
    }

    /// Schedule one task.
    #[must_use]
    pub fn deferred(delay: Duration, task: Task<E>) -> Self {
        Self {
            rows: None,
            deferred: vec![Deferred { delay, task }],
        }
    }
}

impl<E> Default for Reaction<E> {
    fn default() -> Self {
        Self::none()
    }
}
