//! Widget configuration.
//!
//! The defaults describe the markup contract of the storefront pages: the
//! element IDs and class names the widget looks for, the storage key, and
//! the French copy shown to shoppers. A page may override any of them with a
//! JSON block:
//!
//! ```html
//! <script type="application/json" id="mignon-config">
//!   { "storageKey": "mignon_cart_v2", "feedbackDurationMs": 800 }
//! </script>
//! ```
//!
//! Omitted fields keep their defaults.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// ID of the optional `<script>` block holding a JSON configuration.
pub const CONFIG_ELEMENT_ID: &str = "mignon-config";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid configuration value {0}: {1}")]
    Invalid(String, String),
}

/// Cart widget configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StorefrontConfig {
    /// Browser storage key holding the serialized cart
    pub storage_key: String,
    /// How long an add-to-cart control shows its confirmation label
    pub feedback_duration_ms: u64,
    /// IDs of the singleton elements the widget drives
    pub ids: ElementIds,
    /// Class names marking controls and states
    pub classes: ClassNames,
    /// Selectors used inside a product card
    pub card: CardSelectors,
    /// Shopper-facing copy
    pub messages: Messages,
}

/// IDs of the page's singleton elements. Every one of them is optional in
/// the markup; a missing element disables the matching feature.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ElementIds {
    pub menu_toggle: String,
    pub nav_list: String,
    pub cart_count: String,
    pub cart_items: String,
    pub cart_total: String,
    pub cart_empty: String,
    pub checkout_form: String,
}

/// Class names read from and written to the markup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClassNames {
    /// Marks add-to-cart controls
    pub add_to_cart: String,
    /// Marks the product card enclosing an add-to-cart control
    pub product_card: String,
    /// Set on `<body>` of the cart page
    pub cart_page: String,
    /// Toggled on the navigation list
    pub nav_open: String,
    /// Hides the empty-cart message
    pub hidden: String,
    pub row: String,
    pub remove: String,
    pub qty_incr: String,
    pub qty_decr: String,
}

/// Selectors resolved within a product card when its data attributes are
/// incomplete.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CardSelectors {
    pub name: String,
    pub price: String,
    pub image: String,
}

/// Shopper-facing copy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Messages {
    /// Temporary label of an add-to-cart control after a click
    pub added_label: String,
    /// Name used when a card has neither `data-name` nor a heading
    pub default_product_name: String,
    /// Alert shown when checking out an empty cart
    pub empty_cart: String,
    /// Alert shown after a successful checkout
    pub order_confirmed: String,
    /// Console prefix of the demo order payload
    pub order_log_prefix: String,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            storage_key: "mignon_cart_v1".to_string(),
            feedback_duration_ms: 1200,
            ids: ElementIds::default(),
            classes: ClassNames::default(),
            card: CardSelectors::default(),
            messages: Messages::default(),
        }
    }
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            menu_toggle: "menu-toggle".to_string(),
            nav_list: "nav-list".to_string(),
            cart_count: "cart-count".to_string(),
            cart_items: "cart-items".to_string(),
            cart_total: "cart-total".to_string(),
            cart_empty: "cart-empty".to_string(),
            checkout_form: "checkout-form".to_string(),
        }
    }
}

impl Default for ClassNames {
    fn default() -> Self {
        Self {
            add_to_cart: "add-to-cart".to_string(),
            product_card: "product-card".to_string(),
            cart_page: "page-cart".to_string(),
            nav_open: "open".to_string(),
            hidden: "hidden".to_string(),
            row: "cart-row".to_string(),
            remove: "remove".to_string(),
            qty_incr: "qty-incr".to_string(),
            qty_decr: "qty-decr".to_string(),
        }
    }
}

impl Default for CardSelectors {
    fn default() -> Self {
        Self {
            name: "h3".to_string(),
            price: ".price".to_string(),
            image: "img".to_string(),
        }
    }
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            added_label: "Ajouté ✓".to_string(),
            default_product_name: "Produit".to_string(),
            empty_cart: "Votre panier est vide.".to_string(),
            order_confirmed: "Commande reçue — merci ! (demo)".to_string(),
            order_log_prefix: "Commande envoyée (demo):".to_string(),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from a JSON document, filling omitted fields with
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the JSON is malformed or a value fails
    /// [`validate`](Self::validate).
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every key, ID, class name and selector is usable.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first empty field, or a
    /// zero feedback duration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.feedback_duration_ms == 0 {
            return Err(ConfigError::Invalid(
                "feedbackDurationMs".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        let required = [
            ("storageKey", &self.storage_key),
            ("ids.menuToggle", &self.ids.menu_toggle),
            ("ids.navList", &self.ids.nav_list),
            ("ids.cartCount", &self.ids.cart_count),
            ("ids.cartItems", &self.ids.cart_items),
            ("ids.cartTotal", &self.ids.cart_total),
            ("ids.cartEmpty", &self.ids.cart_empty),
            ("ids.checkoutForm", &self.ids.checkout_form),
            ("classes.addToCart", &self.classes.add_to_cart),
            ("classes.productCard", &self.classes.product_card),
            ("classes.cartPage", &self.classes.cart_page),
            ("classes.navOpen", &self.classes.nav_open),
            ("classes.hidden", &self.classes.hidden),
            ("classes.row", &self.classes.row),
            ("classes.remove", &self.classes.remove),
            ("classes.qtyIncr", &self.classes.qty_incr),
            ("classes.qtyDecr", &self.classes.qty_decr),
            ("card.name", &self.card.name),
            ("card.price", &self.card.price),
            ("card.image", &self.card.image),
        ];

        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    field.to_string(),
                    "must not be empty".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// How long add-to-cart feedback stays visible.
    #[must_use]
    pub const fn feedback_duration(&self) -> Duration {
        Duration::from_millis(self.feedback_duration_ms)
    }
}
