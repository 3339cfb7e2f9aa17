//! Integration tests for the Mignon cart widget.
//!
//! The widget only talks to the browser through `Page` and
//! `KeyValueStorage`, so the scenarios here run it against an in-memory
//! document instead of a browser:
//!
//! - [`dom`] - an arena DOM with a small HTML parser, enough for the
//!   storefront's markup
//! - [`FakePage`] - `Page` over that DOM, recording alerts and console output
//! - [`Harness`] - plays the host: registers bindings, fires events, swaps
//!   row bindings after renders and runs deferred tasks on a virtual clock
//! - [`fixtures`] - catalog and cart page markup
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p mignon-integration-tests
//! ```

pub mod dom;
pub mod fixtures;
mod harness;
mod page;

pub use dom::{Dom, NodeId, ParseError};
pub use harness::Harness;
pub use page::{ConsoleEntry, FakePage};

use mignon_storefront::config::ConfigError;
use thiserror::Error;

/// Errors raised while loading a page into the harness.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Page markup error: {0}")]
    Parse(#[from] ParseError),

    #[error("Page configuration error: {0}")]
    Config(#[from] ConfigError),
}
