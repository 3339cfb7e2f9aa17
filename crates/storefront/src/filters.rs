//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use crate::markup;

/// Escapes the five HTML-significant characters.
///
/// Cart templates are rendered with escaping disabled so that every
/// interpolation states its own escaping through this filter.
///
/// Usage in templates: `{{ item.name|escape_html }}`
#[askama::filter_fn]
pub fn escape_html(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(markup::escape_html(&value.to_string()))
}
