//! The shopper's cart and its line items.
//!
//! A [`Cart`] is an ordered list of [`CartItem`]s, unique by product ID.
//! Adding a product that is already present bumps its quantity instead of
//! appending a second line, and quantities never drop below one.
//!
//! The serialized form is the blob persisted in browser storage: a JSON
//! array of `{ id, name, price, img, qty, addedAt }` objects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Price, ProductId, Quantity};

/// One distinct product in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Product identifier, unique within the cart.
    #[serde(default)]
    pub id: ProductId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Unit price.
    #[serde(default)]
    pub price: Price,
    /// Image URL or path.
    #[serde(default)]
    pub img: String,
    /// Selected quantity; a missing or zero value reads as one.
    #[serde(default)]
    pub qty: Quantity,
    /// When the product was first added. Informational only.
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub added_at: Option<DateTime<Utc>>,
}

impl CartItem {
    /// Unit price multiplied by quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.qty)
    }
}

/// Product data read from a product card when it is added to the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDetails {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub img: String,
}

/// What [`Cart::add`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new line was appended with quantity one.
    Added,
    /// An existing line's quantity was bumped to the contained value.
    Incremented(Quantity),
}

/// The shopper's in-progress selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Parse a cart from its persisted JSON form.
    ///
    /// # Errors
    ///
    /// Returns the underlying `serde_json` error if the input is not a JSON
    /// array of cart items.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize the cart to its persisted JSON form.
    ///
    /// # Errors
    ///
    /// Returns the underlying `serde_json` error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Iterate over line items in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, CartItem> {
        self.items.iter()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Find the line for a product.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    fn get_mut(&mut self, id: &ProductId) -> Option<&mut CartItem> {
        self.items.iter_mut().find(|item| &item.id == id)
    }

    /// Add one unit of a product.
    ///
    /// If the product already has a line its quantity goes up by one and the
    /// stored name, price and image are left untouched. Otherwise a new line
    /// is appended with quantity one and `added_at` set to `now`.
    pub fn add(&mut self, product: ProductDetails, now: DateTime<Utc>) -> AddOutcome {
        if let Some(existing) = self.get_mut(&product.id) {
            existing.qty = existing.qty.increment();
            return AddOutcome::Incremented(existing.qty);
        }

        self.items.push(CartItem {
            id: product.id,
            name: product.name,
            price: product.price,
            img: product.img,
            qty: Quantity::MIN,
            added_at: Some(now),
        });
        AddOutcome::Added
    }

    /// Bump a line's quantity by one. Returns the new quantity, or `None` if
    /// the product is not in the cart.
    pub fn increment(&mut self, id: &ProductId) -> Option<Quantity> {
        let item = self.get_mut(id)?;
        item.qty = item.qty.increment();
        Some(item.qty)
    }

    /// Lower a line's quantity by one, stopping at one. Returns the new
    /// quantity, or `None` if the product is not in the cart.
    pub fn decrement(&mut self, id: &ProductId) -> Option<Quantity> {
        let item = self.get_mut(id)?;
        item.qty = item.qty.decrement();
        Some(item.qty)
    }

    /// Drop every line for a product. Returns whether anything was removed.
    pub fn remove(&mut self, id: &ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| &item.id != id);
        self.items.len() != before
    }

    /// Sum of all line quantities, as shown on the cart badge.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.qty.get())).sum()
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartItem;
    type IntoIter = std::slice::Iter<'a, CartItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::TimeZone;
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    use super::*;

    fn filet() -> ProductDetails {
        ProductDetails {
            id: ProductId::new("p1"),
            name: "Filet".to_string(),
            price: Price::new("12.5".parse().unwrap()),
            img: "img/filet.jpg".to_string(),
        }
    }

    fn product(id: &str) -> ProductDetails {
        ProductDetails {
            id: ProductId::new(id),
            name: id.to_uppercase(),
            price: Price::new(3.into()),
            img: String::new(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_000).unwrap()
    }

    #[test]
    fn test_add_twice_increments() {
        let mut cart = Cart::new();
        assert_eq!(cart.add(filet(), now()), AddOutcome::Added);
        assert_eq!(
            cart.add(filet(), now()),
            AddOutcome::Incremented(Quantity::new(2))
        );

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].qty.get(), 2);
        assert_eq!(cart.total_quantity(), 2);
        assert_eq!(cart.subtotal(), Price::new(25.into()));
    }

    #[test]
    fn test_add_existing_keeps_original_details() {
        let mut cart = Cart::new();
        cart.add(filet(), now());
        let mut renamed = filet();
        renamed.name = "Autre".to_string();
        cart.add(renamed, now());
        assert_eq!(cart.items()[0].name, "Filet");
    }

    #[test]
    fn test_decrement_clamps_at_one() {
        let mut cart = Cart::new();
        cart.add(filet(), now());
        cart.increment(&ProductId::new("p1"));
        cart.increment(&ProductId::new("p1"));

        let id = ProductId::new("p1");
        assert_eq!(cart.decrement(&id), Some(Quantity::new(2)));
        assert_eq!(cart.decrement(&id), Some(Quantity::new(1)));
        assert_eq!(cart.decrement(&id), Some(Quantity::new(1)));
    }

    #[test]
    fn test_unknown_id_is_noop() {
        let mut cart = Cart::new();
        cart.add(filet(), now());
        let before = cart.clone();
        let missing = ProductId::new("nope");

        assert_eq!(cart.increment(&missing), None);
        assert_eq!(cart.decrement(&missing), None);
        assert!(!cart.remove(&missing));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_remove() {
        let mut cart = Cart::new();
        cart.add(filet(), now());
        cart.add(product("p2"), now());
        assert!(cart.remove(&ProductId::new("p1")));
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].id.as_str(), "p2");
    }

    #[test]
    fn test_empty_cart_totals() {
        let cart = Cart::new();
        assert_eq!(cart.total_quantity(), 0);
        assert_eq!(cart.subtotal(), Price::ZERO);
    }

    #[test]
    fn test_json_shape() {
        let mut cart = Cart::new();
        cart.add(filet(), now());
        let json: serde_json::Value = serde_json::from_str(&cart.to_json().unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{
                "id": "p1",
                "name": "Filet",
                "price": 12.5,
                "img": "img/filet.jpg",
                "qty": 1,
                "addedAt": 1_700_000_000_000_i64,
            }])
        );
    }

    #[test]
    fn test_json_round_trip() {
        let mut cart = Cart::new();
        cart.add(filet(), now());
        cart.add(product("p2"), now());
        cart.increment(&ProductId::new("p2"));

        let restored = Cart::from_json(&cart.to_json().unwrap()).unwrap();
        assert_eq!(restored, cart);
    }

    #[test]
    fn test_lenient_fields() {
        let cart = Cart::from_json(r#"[{"id":"a","qty":0},{"id":"b","price":4}]"#).unwrap();
        assert_eq!(cart.items()[0].qty, Quantity::MIN);
        assert_eq!(cart.items()[0].price, Price::ZERO);
        assert_eq!(cart.items()[0].added_at, None);
        assert_eq!(cart.items()[1].qty, Quantity::MIN);
        assert_eq!(cart.total_quantity(), 2);
    }

    #[test]
    fn test_out_of_range_line_keeps_the_rest() {
        let cart = Cart::from_json(
            r#"[{"id":"a","price":1e30,"qty":1},{"id":"b","price":3,"qty":99999999999}]"#,
        )
        .unwrap();
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.items()[0].price.amount(), Decimal::MAX);
        assert_eq!(cart.items()[1].price, Price::new(3.into()));
        assert_eq!(cart.items()[1].qty.get(), u32::MAX);
    }

    #[test]
    fn test_huge_prices_do_not_overflow_totals() {
        let cart = Cart::from_json(
            r#"[{"id":"a","price":50000000000000000000000000000,"qty":2},{"id":"b","price":4}]"#,
        )
        .unwrap();
        assert_eq!(cart.items()[0].line_total().amount(), Decimal::MAX);
        assert_eq!(cart.subtotal().amount(), Decimal::MAX);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(Cart::from_json("{not json").is_err());
        assert!(Cart::from_json(r#"{"id":"a"}"#).is_err());
        assert!(Cart::from_json(r#"[{"qty":"many"}]"#).is_err());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add(u8),
        Increment(u8),
        Decrement(u8),
        Remove(u8),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u8..5).prop_map(Op::Add),
            (0u8..5).prop_map(Op::Increment),
            (0u8..5).prop_map(Op::Decrement),
            (0u8..5).prop_map(Op::Remove),
        ]
    }

    proptest! {
        #[test]
        fn prop_ids_unique_and_quantities_positive(ops in prop::collection::vec(op(), 0..64)) {
            let mut cart = Cart::new();
            for op in ops {
                match op {
                    Op::Add(n) => { cart.add(product(&format!("p{n}")), now()); }
                    Op::Increment(n) => { cart.increment(&ProductId::new(format!("p{n}"))); }
                    Op::Decrement(n) => { cart.decrement(&ProductId::new(format!("p{n}"))); }
                    Op::Remove(n) => { cart.remove(&ProductId::new(format!("p{n}"))); }
                }

                let mut ids: Vec<_> = cart.iter().map(|item| item.id.clone()).collect();
                ids.sort();
                ids.dedup();
                prop_assert_eq!(ids.len(), cart.len());
                prop_assert!(cart.iter().all(|item| item.qty.get() >= 1));
                prop_assert_eq!(
                    cart.total_quantity(),
                    cart.iter().map(|item| u64::from(item.qty.get())).sum::<u64>()
                );
            }
        }

        #[test]
        fn prop_add_existing_keeps_length(extra in 1usize..10) {
            let mut cart = Cart::new();
            cart.add(filet(), now());
            for _ in 0..extra {
                cart.add(filet(), now());
            }
            prop_assert_eq!(cart.len(), 1);
            prop_assert_eq!(cart.total_quantity(), extra as u64 + 1);
        }
    }
}
