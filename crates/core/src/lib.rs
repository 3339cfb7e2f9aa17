//! Mignon Core - Shared cart types.
//!
//! This crate provides the domain types used by the Mignon cart widget:
//! - `storefront` - The browser cart controller (compiled to WebAssembly)
//! - `integration-tests` - Scenario tests driving the controller
//!
//! # Architecture
//!
//! The core crate contains only types and pure operations - no storage
//! access, no DOM, no browser bindings. This keeps it lightweight and allows
//! it to be used (and tested) on any target.
//!
//! # Modules
//!
//! - [`types`] - Product IDs, prices, quantities and the cart itself

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
