//! Markup written into the cart page.

use askama::Template;
use mignon_core::CartItem;

use crate::config::ClassNames;
use crate::error::RenderError;
use crate::filters;

/// Escape `& < > " '` so text can be interpolated into markup or attribute
/// values without being interpreted.
///
/// ```
/// use mignon_storefront::markup::escape_html;
///
/// assert_eq!(escape_html("<b>X</b>"), "&lt;b&gt;X&lt;/b&gt;");
/// ```
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Cart rows fragment.
#[derive(Template)]
#[template(path = "partials/cart_rows.html", escape = "none")]
pub struct CartRowsTemplate<'a> {
    pub rows: &'a [CartItem],
    pub classes: &'a ClassNames,
}

/// Render one row per cart line.
///
/// # Errors
///
/// Returns `RenderError` if the template fails to render.
pub fn render_rows(rows: &[CartItem], classes: &ClassNames) -> Result<String, RenderError> {
    Ok(CartRowsTemplate { rows, classes }.render()?)
}
