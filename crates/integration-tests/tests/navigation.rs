//! Menu toggle and page setup.

#![allow(clippy::unwrap_used)]

mod common;

use common::init_tracing;
use mignon_integration_tests::{Harness, fixtures};
use mignon_storefront::{Command, EventKind};

#[test]
fn test_menu_toggle_flips_state() {
    init_tracing();
    let mut harness = Harness::load(&fixtures::catalog_page()).unwrap();
    let toggle = harness.page().by_id("menu-toggle").unwrap();
    let nav = harness.page().by_id("nav-list").unwrap();

    harness.click(toggle);
    assert_eq!(harness.page().attr(toggle, "aria-expanded").as_deref(), Some("true"));
    assert!(harness.page().has_class(nav, "open"));
    assert!(harness.page().has_class(nav, "nav"));

    harness.click(toggle);
    assert_eq!(harness.page().attr(toggle, "aria-expanded").as_deref(), Some("false"));
    assert!(!harness.page().has_class(nav, "open"));
}

#[test]
fn test_menu_toggle_without_attribute_opens() {
    init_tracing();
    let mut harness =
        Harness::load(r#"<body><button id="menu-toggle">Menu</button><ul id="nav-list"></ul></body>"#)
            .unwrap();

    harness.click_id("menu-toggle");

    let toggle = harness.page().by_id("menu-toggle").unwrap();
    assert_eq!(harness.page().attr(toggle, "aria-expanded").as_deref(), Some("true"));
}

#[test]
fn test_menu_toggle_without_nav_list() {
    init_tracing();
    let mut harness =
        Harness::load(r#"<body><button id="menu-toggle" aria-expanded="true">Menu</button></body>"#)
            .unwrap();

    harness.click_id("menu-toggle");

    let toggle = harness.page().by_id("menu-toggle").unwrap();
    assert_eq!(harness.page().attr(toggle, "aria-expanded").as_deref(), Some("false"));
}

#[test]
fn test_page_without_widget_markup() {
    init_tracing();
    let harness = Harness::load("<body><p>Mentions légales</p></body>").unwrap();

    assert!(harness.bindings().is_empty());
    assert!(harness.row_bindings().is_empty());
    assert!(!harness.controller().is_cart_page());
    assert_eq!(harness.controller().update_cart_count(), 0);
}

#[test]
fn test_catalog_page_bindings() {
    init_tracing();
    let harness = Harness::load(&fixtures::catalog_page()).unwrap();

    let bindings = harness.bindings();
    assert_eq!(bindings.first().map(|b| &b.command), Some(&Command::ToggleMenu));
    let adds = bindings
        .iter()
        .filter(|b| matches!(b.command, Command::AddToCart(_)))
        .count();
    assert_eq!(adds, 5);
    assert!(bindings.iter().all(|b| b.event == EventKind::Click));
    assert!(harness.row_bindings().is_empty());
}

#[test]
fn test_cart_page_binds_checkout_form() {
    init_tracing();
    let harness = Harness::load(&fixtures::cart_page()).unwrap();
    let form = harness.page().by_id("checkout-form").unwrap();

    assert!(harness.controller().is_cart_page());
    assert!(
        harness
            .bindings()
            .iter()
            .any(|b| b.target == form && b.event == EventKind::Submit && b.command == Command::Checkout)
    );
}

#[test]
fn test_cart_markup_off_the_cart_page_is_left_alone() {
    init_tracing();
    let html = fixtures::cart_page().replacen(r#"class="page-cart""#, r#"class="page-shop""#, 1);
    let harness = Harness::load(&html).unwrap();

    assert!(harness.page().by_class("cart-row").is_empty());
    assert_eq!(harness.page().text_of("cart-total").as_deref(), Some("0,00 €"));
}
