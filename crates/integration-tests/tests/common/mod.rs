//! Helpers shared by the scenario tests.

#![allow(dead_code, clippy::unwrap_used)]

use mignon_integration_tests::{FakePage, NodeId};

pub const STORAGE_KEY: &str = "mignon_cart_v1";

/// NBSP-separated euro amount, as the widget formats it.
pub fn euros(amount: &str) -> String {
    format!("{amount}\u{a0}€")
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// The row control of `class` for product `id`.
pub fn row_control(page: &FakePage, class: &str, id: &str) -> Option<NodeId> {
    page.by_class(class)
        .into_iter()
        .find(|&node| page.attr(node, "data-id").as_deref() == Some(id))
}

/// Quantity shown in the row of product `id`.
pub fn shown_quantity(page: &FakePage, id: &str) -> Option<String> {
    let decrement = row_control(page, "qty-decr", id)?;
    let dom = page.dom();
    let meta = dom.parent(decrement)?;
    let qty = dom.query(meta, ".qty")?;
    Some(dom.text_content(qty))
}
