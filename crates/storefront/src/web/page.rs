//! `web-sys` implementation of [`Page`].

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlButtonElement, HtmlFormElement, HtmlImageElement, Window};

use crate::config::{CONFIG_ELEMENT_ID, ConfigError, StorefrontConfig};
use crate::error::AppError;
use crate::page::Page;

/// The live document.
#[derive(Debug, Clone)]
pub struct WebPage {
    window: Window,
    document: Document,
}

impl WebPage {
    /// Attach to the current window's document.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Environment` outside a browser window.
    pub fn new() -> Result<Self, AppError> {
        let window =
            web_sys::window().ok_or_else(|| AppError::Environment("no window".to_string()))?;
        let document = window
            .document()
            .ok_or_else(|| AppError::Environment("no document".to_string()))?;
        Ok(Self { window, document })
    }

    /// Whether the document is still being parsed.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        js_sys::Reflect::get(&self.document, &JsValue::from_str("readyState"))
            .ok()
            .and_then(|state| state.as_string())
            .is_some_and(|state| state == "loading")
    }

    pub const fn document(&self) -> &Document {
        &self.document
    }

    /// Configuration from the page's `#mignon-config` JSON block, or the
    /// defaults when there is none.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the block is present but invalid.
    pub fn config(&self) -> Result<StorefrontConfig, ConfigError> {
        match self
            .document
            .get_element_by_id(CONFIG_ELEMENT_ID)
            .and_then(|element| element.text_content())
        {
            Some(json) if !json.trim().is_empty() => StorefrontConfig::from_json(&json),
            _ => Ok(StorefrontConfig::default()),
        }
    }
}

impl Page for WebPage {
    type Element = Element;

    fn element_by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn elements_by_class(&self, class: &str) -> Vec<Element> {
        let collection = self.document.get_elements_by_class_name(class);
        (0..collection.length())
            .filter_map(|i| collection.item(i))
            .collect()
    }

    fn closest(&self, element: &Element, class: &str) -> Option<Element> {
        element.closest(&format!(".{class}")).ok().flatten()
    }

    fn query(&self, scope: &Element, selector: &str) -> Option<Element> {
        scope.query_selector(selector).ok().flatten()
    }

    fn body_has_class(&self, class: &str) -> bool {
        self.document
            .body()
            .is_some_and(|body| body.class_list().contains(class))
    }

    fn attribute(&self, element: &Element, name: &str) -> Option<String> {
        element.get_attribute(name)
    }

    fn set_attribute(&self, element: &Element, name: &str, value: &str) {
        let _ = element.set_attribute(name, value);
    }

    fn text(&self, element: &Element) -> String {
        element.text_content().unwrap_or_default()
    }

    fn set_text(&self, element: &Element, text: &str) {
        element.set_text_content(Some(text));
    }

    fn add_class(&self, element: &Element, class: &str) {
        let _ = element.class_list().add_1(class);
    }

    fn remove_class(&self, element: &Element, class: &str) {
        let _ = element.class_list().remove_1(class);
    }

    fn toggle_class(&self, element: &Element, class: &str) {
        let _ = element.class_list().toggle(class);
    }

    fn set_disabled(&self, element: &Element, disabled: bool) {
        if let Some(button) = element.dyn_ref::<HtmlButtonElement>() {
            button.set_disabled(disabled);
        } else if disabled {
            let _ = element.set_attribute("disabled", "");
        } else {
            let _ = element.remove_attribute("disabled");
        }
    }

    fn image_src(&self, element: &Element) -> Option<String> {
        element
            .dyn_ref::<HtmlImageElement>()
            .map(HtmlImageElement::src)
            .or_else(|| element.get_attribute("src"))
    }

    fn set_inner_html(&self, element: &Element, html: &str) {
        element.set_inner_html(html);
    }

    fn form_entries(&self, form: &Element) -> Vec<(String, String)> {
        let Some(form) = form.dyn_ref::<HtmlFormElement>() else {
            return Vec::new();
        };
        let Ok(data) = web_sys::FormData::new_with_form(form) else {
            return Vec::new();
        };
        let Ok(Some(entries)) = js_sys::try_iter(&data) else {
            return Vec::new();
        };

        entries
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let pair = entry.dyn_into::<js_sys::Array>().ok()?;
                let name = pair.get(0).as_string()?;
                // File inputs submit a File object, not text.
                let value = pair.get(1).as_string().unwrap_or_default();
                Some((name, value))
            })
            .collect()
    }

    fn reset_form(&self, form: &Element) {
        if let Some(form) = form.dyn_ref::<HtmlFormElement>() {
            form.reset();
        }
    }

    fn alert(&self, message: &str) {
        let _ = self.window.alert_with_message(message);
    }

    fn log(&self, message: &str, payload: &serde_json::Value) {
        let payload = js_sys::JSON::parse(&payload.to_string()).unwrap_or(JsValue::NULL);
        web_sys::console::log_2(&JsValue::from_str(message), &payload);
    }
}
