//! Mignon Storefront - Browser cart widget.
//!
//! This crate provides the cart behavior of the storefront's static pages:
//! the navigation toggle, add-to-cart controls, the cart-count badge, and
//! the cart page with quantity controls and a demo checkout.
//!
//! # Architecture
//!
//! - [`CartController`] holds all behavior and talks to the page only
//!   through the [`Page`] trait and to storage through [`KeyValueStorage`]
//! - Controls are bound to [`Command`]s; the host registers listeners and
//!   forwards fired commands to [`CartController::dispatch`]
//! - Askama renders the cart rows
//! - With the `web` feature on `wasm32`, the [`web`] module provides the
//!   browser host over `web-sys` and `localStorage`

#![cfg_attr(not(any(test, feature = "web")), forbid(unsafe_code))]

pub mod checkout;
pub mod config;
pub mod controller;
pub mod error;
mod filters;
pub mod markup;
pub mod page;
pub mod storage;

// wasm-bindgen expands exported functions and closures into unsafe glue.
#[cfg(all(feature = "web", target_arch = "wasm32"))]
#[allow(unsafe_code)]
pub mod web;

pub use config::StorefrontConfig;
pub use controller::CartController;
pub use error::{AppError, CheckoutError, StorageError};
pub use page::{Binding, Command, Deferred, EventKind, Page, Reaction, Setup, Task};
pub use storage::{CartStore, KeyValueStorage, MemoryStorage};
