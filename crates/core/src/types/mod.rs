//! Core types for Mignon.
//!
//! This module provides type-safe wrappers for the cart domain.

pub mod cart;
pub mod id;
pub mod legacy_price;
pub mod price;
pub mod quantity;

pub use cart::{AddOutcome, Cart, CartItem, ProductDetails};
pub use id::ProductId;
pub use price::Price;
pub use quantity::Quantity;
