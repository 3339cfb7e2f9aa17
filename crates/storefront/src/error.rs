//! Unified error handling.
//!
//! None of these errors ever reach the shopper as a failure: a broken storage
//! slot reads as an empty cart, a failed write is logged and the page carries
//! on, and an empty-cart checkout becomes an alert. The types exist so each
//! layer can say precisely what went wrong before the controller decides how
//! to degrade.

use thiserror::Error;

/// Browser storage failures.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Storage is disabled or inaccessible (private mode, sandboxed frame).
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// The backend rejected a write, typically on quota.
    #[error("Failed to write {key}: {reason}")]
    Write { key: String, reason: String },

    /// The cart could not be serialized.
    #[error("Failed to serialize cart: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Checkout failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CheckoutError {
    /// The cart had no lines when the form was submitted.
    #[error("Cart is empty")]
    EmptyCart,
}

/// Cart row rendering failures.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// Failures that stop the widget from starting.
#[derive(Debug, Error)]
pub enum AppError {
    /// The browser environment is missing something the widget needs.
    #[error("Environment error: {0}")]
    Environment(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display() {
        let err = StorageError::Write {
            key: "mignon_cart_v1".to_string(),
            reason: "QuotaExceededError".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to write mignon_cart_v1: QuotaExceededError"
        );
    }

    #[test]
    fn test_checkout_error_display() {
        assert_eq!(CheckoutError::EmptyCart.to_string(), "Cart is empty");
    }

    #[test]
    fn test_environment_error_display() {
        let err = AppError::Environment("no window".to_string());
        assert_eq!(err.to_string(), "Environment error: no window");
    }
}
