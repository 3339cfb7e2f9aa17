//! Cart persistence.
//!
//! The cart lives in a single key of the browser's origin-scoped key-value
//! storage. [`KeyValueStorage`] abstracts that storage so the controller can
//! run against [`MemoryStorage`] outside a browser, and [`CartStore`] owns
//! the key and the (de)serialization rules.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use mignon_core::Cart;
use tracing::{debug, warn};

use crate::error::StorageError;

/// String key-value storage with `localStorage` semantics.
pub trait KeyValueStorage {
    /// Read a value. `Ok(None)` when the key is absent.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the storage cannot be reached.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the storage cannot be reached or refuses
    /// the write.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value. Deleting an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the storage cannot be reached.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory storage. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    /// Create empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage holding one key.
    #[must_use]
    pub fn with_item(key: &str, value: &str) -> Self {
        let storage = Self::new();
        storage
            .items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        storage
    }

    /// Raw value of a key, bypassing the trait's error type.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.raw(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

/// The cart's storage slot.
///
/// Every read goes back to storage; nothing is cached, so the slot stays the
/// single source of truth across handlers and tabs.
#[derive(Debug, Clone)]
pub struct CartStore<S> {
    storage: S,
    key: String,
}

impl<S: KeyValueStorage> CartStore<S> {
    /// Create a store over `storage` using `key` as the slot.
    pub fn new(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// The storage key of the slot.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The underlying storage.
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Read the cart.
    ///
    /// An absent slot, an unreachable storage or content that is not a
    /// serialized cart all read as an empty cart.
    #[must_use]
    pub fn load(&self) -> Cart {
        let raw = match self.storage.get_item(&self.key) {
            Ok(Some(raw)) if !raw.is_empty() => raw,
            Ok(_) => return Cart::new(),
            Err(e) => {
                warn!(key = %self.key, "Failed to read cart: {e}");
                return Cart::new();
            }
        };

        Cart::from_json(&raw).unwrap_or_else(|e| {
            warn!(key = %self.key, "Discarding malformed cart: {e}");
            Cart::new()
        })
    }

    /// Overwrite the slot with `cart`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if serialization or the write fails.
    pub fn save(&self, cart: &Cart) -> Result<(), StorageError> {
        let json = cart.to_json()?;
        self.storage.set_item(&self.key, &json)?;
        debug!(key = %self.key, lines = cart.len(), "Cart saved");
        Ok(())
    }

    /// Delete the slot.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the storage cannot be reached.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove_item(&self.key)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use mignon_core::{Price, ProductDetails, ProductId};

    use super::*;

    const KEY: &str = "mignon_cart_v1";

    /// Storage whose every operation fails.
    struct BrokenStorage;

    impl KeyValueStorage for BrokenStorage {
        fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("SecurityError".to_string()))
        }

        fn set_item(&self, key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Write {
                key: key.to_string(),
                reason: "QuotaExceededError".to_string(),
            })
        }

        fn remove_item(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("SecurityError".to_string()))
        }
    }

    fn sample_cart() -> Cart {
        let mut cart = Cart::new();
        cart.add(
            ProductDetails {
                id: ProductId::new("p1"),
                name: "Filet".to_string(),
                price: Price::new("12.5".parse().unwrap()),
                img: "img/filet.jpg".to_string(),
            },
            Utc::now(),
        );
        cart
    }

    #[test]
    fn test_load_absent_slot_is_empty() {
        let store = CartStore::new(MemoryStorage::new(), KEY);
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_load_malformed_is_empty() {
        for raw in ["", "{oops", "null", "42", r#"{"id":"p1"}"#] {
            let store = CartStore::new(MemoryStorage::with_item(KEY, raw), KEY);
            assert!(store.load().is_empty(), "{raw:?} should read as empty");
        }
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let store = CartStore::new(MemoryStorage::new(), KEY);
        let cart = sample_cart();
        store.save(&cart).unwrap();
        assert_eq!(store.load(), cart);
    }

    #[test]
    fn test_save_writes_under_key() {
        let storage = MemoryStorage::new();
        let store = CartStore::new(storage.clone(), KEY);
        store.save(&sample_cart()).unwrap();
        assert!(storage.raw(KEY).unwrap().starts_with(r#"[{"id":"p1""#));
    }

    #[test]
    fn test_clear_removes_slot() {
        let storage = MemoryStorage::new();
        let store = CartStore::new(storage.clone(), KEY);
        store.save(&sample_cart()).unwrap();
        store.clear().unwrap();
        assert_eq!(storage.raw(KEY), None);
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_broken_storage_degrades() {
        let store = CartStore::new(BrokenStorage, KEY);
        assert!(store.load().is_empty());
        assert!(matches!(
            store.save(&sample_cart()),
            Err(StorageError::Write { .. })
        ));
    }
}
