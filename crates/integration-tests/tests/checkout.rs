//! Demo checkout.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

mod common;

use common::{STORAGE_KEY, euros, init_tracing};
use mignon_integration_tests::{Harness, NodeId, fixtures};
use mignon_storefront::{MemoryStorage, Page};

fn cart_page(storage: MemoryStorage) -> Harness {
    init_tracing();
    Harness::load_with_storage(&fixtures::cart_page(), storage).unwrap()
}

fn field(harness: &Harness, name: &str) -> NodeId {
    let page = harness.page();
    let dom = page.dom();
    dom.descendants(dom.root())
        .into_iter()
        .find(|&node| dom.attribute(node, "name") == Some(name))
        .unwrap()
}

fn fill_form(harness: &Harness) {
    harness.page().set_value(field(harness, "name"), "Ada Lovelace");
    harness.page().set_value(field(harness, "email"), "ada@example.com");
    harness.page().set_value(field(harness, "address"), "12 rue des Halles");
}

#[test]
fn test_checkout_logs_order_and_empties_cart() {
    let storage = MemoryStorage::with_item(STORAGE_KEY, &fixtures::stored_line("p1", "Filet", 12.5, 2));
    let mut harness = cart_page(storage);
    fill_form(&harness);

    let form = harness.page().by_id("checkout-form").unwrap();
    assert_eq!(harness.submit(form), 1);

    let page = harness.page();
    assert_eq!(page.alerts(), vec!["Commande reçue — merci ! (demo)".to_string()]);

    let console = page.console();
    assert_eq!(console.len(), 1);
    assert_eq!(console[0].message, "Commande envoyée (demo):");
    let order = &console[0].payload;
    assert_eq!(order["formData"]["name"], "Ada Lovelace");
    assert_eq!(order["formData"]["email"], "ada@example.com");
    assert_eq!(order["formData"]["address"], "12 rue des Halles");
    assert_eq!(order["formData"]["delivery"], "pickup");
    assert!(order["formData"].get("newsletter").is_none());
    assert_eq!(order["items"][0]["id"], "p1");
    assert_eq!(order["items"][0]["qty"], 2);
    assert_eq!(order["items"][0]["price"], 12.5);

    assert!(harness.cart().is_empty());
    assert_eq!(harness.storage().raw(STORAGE_KEY).as_deref(), Some("[]"));
    assert!(page.by_class("cart-row").is_empty());
    assert!(!page.has_class(page.by_id("cart-empty").unwrap(), "hidden"));
    assert_eq!(page.text_of("cart-total"), Some(euros("0,00")));
    assert_eq!(page.text_of("cart-count").as_deref(), Some("0"));
    assert!(harness.row_bindings().is_empty());

    assert_eq!(page.value(field(&harness, "name")), "");
    assert_eq!(page.value(field(&harness, "address")), "");
}

#[test]
fn test_checkout_includes_checked_boxes() {
    let storage = MemoryStorage::with_item(STORAGE_KEY, &fixtures::stored_line("p1", "Filet", 12.5, 1));
    let mut harness = cart_page(storage);
    let newsletter = field(&harness, "newsletter");
    harness.page().set_attribute(&newsletter, "checked", "");

    let form = harness.page().by_id("checkout-form").unwrap();
    harness.submit(form);

    let console = harness.page().console();
    assert_eq!(console[0].payload["formData"]["newsletter"], "yes");
}

#[test]
fn test_checkout_with_empty_cart_only_alerts() {
    let mut harness = cart_page(MemoryStorage::new());
    fill_form(&harness);

    let form = harness.page().by_id("checkout-form").unwrap();
    assert_eq!(harness.submit(form), 1);

    let page = harness.page();
    assert_eq!(page.alerts(), vec!["Votre panier est vide.".to_string()]);
    assert!(page.console().is_empty());
    assert_eq!(harness.storage().raw(STORAGE_KEY), None);
    assert_eq!(page.value(field(&harness, "name")), "Ada Lovelace");
}

#[test]
fn test_second_checkout_after_success_is_refused() {
    let storage = MemoryStorage::with_item(STORAGE_KEY, &fixtures::stored_line("p1", "Filet", 12.5, 1));
    let mut harness = cart_page(storage);
    let form = harness.page().by_id("checkout-form").unwrap();

    harness.submit(form);
    harness.submit(form);

    assert_eq!(
        harness.page().alerts(),
        vec![
            "Commande reçue — merci ! (demo)".to_string(),
            "Votre panier est vide.".to_string(),
        ]
    );
    assert_eq!(harness.page().console().len(), 1);
}
