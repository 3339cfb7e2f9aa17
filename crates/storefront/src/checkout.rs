//! Demo checkout payload.
//!
//! There is no order backend: a submitted checkout is only logged to the
//! console. The payload keeps the shape the storefront team inspects there.

use std::collections::BTreeMap;

use mignon_core::{Cart, CartItem};
use serde::Serialize;

use crate::error::CheckoutError;

/// Form fields plus cart lines of a submitted checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    /// Submitted fields; a repeated field name keeps its last value.
    pub form_data: BTreeMap<String, String>,
    pub items: Vec<CartItem>,
}

impl OrderPayload {
    /// Build the payload for `cart`.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` if the cart has no lines.
    pub fn new(
        entries: impl IntoIterator<Item = (String, String)>,
        cart: &Cart,
    ) -> Result<Self, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        Ok(Self {
            form_data: entries.into_iter().collect(),
            items: cart.items().to_vec(),
        })
    }

    /// JSON value of the payload, as logged.
    #[must_use]
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::Utc;
    use mignon_core::{Price, ProductDetails, ProductId};

    use super::*;

    fn cart() -> Cart {
        let mut cart = Cart::new();
        cart.add(
            ProductDetails {
                id: ProductId::new("p1"),
                name: "Filet".to_string(),
                price: Price::new(10.into()),
                img: String::new(),
            },
            Utc::now(),
        );
        cart
    }

    #[test]
    fn test_empty_cart_is_rejected() {
        let err = OrderPayload::new(Vec::new(), &Cart::new()).unwrap_err();
        assert_eq!(err, CheckoutError::EmptyCart);
    }

    #[test]
    fn test_last_repeated_field_wins() {
        let payload = OrderPayload::new(
            vec![
                ("name".to_string(), "Ada".to_string()),
                ("name".to_string(), "Grace".to_string()),
            ],
            &cart(),
        )
        .unwrap();
        assert_eq!(payload.form_data.get("name").map(String::as_str), Some("Grace"));
    }

    #[test]
    fn test_value_shape() {
        let payload =
            OrderPayload::new(vec![("email".to_string(), "a@b.c".to_string())], &cart()).unwrap();
        let value = payload.to_value();
        assert_eq!(value["formData"]["email"], "a@b.c");
        assert_eq!(value["items"][0]["id"], "p1");
        assert_eq!(value["items"][0]["qty"], 1);
    }
}
