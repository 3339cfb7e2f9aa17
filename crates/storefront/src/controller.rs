//! The cart controller.
//!
//! One controller drives one page. [`CartController::setup`] runs once after
//! the document has loaded: it refreshes the badge, collects the bindings for
//! the menu toggle, the add-to-cart controls and (on the cart page) the
//! checkout form, and renders the cart rows. Everything afterwards happens in
//! [`CartController::dispatch`], one command at a time, each handler running
//! a complete read-modify-write of the stored cart before returning.
//!
//! Every render recreates the row elements, so every render also produces
//! the row bindings that replace the previous ones.

use chrono::Utc;
use mignon_core::types::legacy_price;
use mignon_core::{Cart, Price, ProductDetails, ProductId};
use tracing::{debug, error, info, instrument};

use crate::checkout::OrderPayload;
use crate::config::StorefrontConfig;
use crate::error::CheckoutError;
use crate::markup;
use crate::page::{Binding, Command, Page, Reaction, Setup, Task};
use crate::storage::{CartStore, KeyValueStorage};

/// Singleton elements resolved once at construction.
#[derive(Debug, Clone)]
struct Elements<E> {
    menu_toggle: Option<E>,
    nav_list: Option<E>,
    badge: Option<E>,
    rows: Option<E>,
    total: Option<E>,
    empty_message: Option<E>,
    checkout_form: Option<E>,
}

/// Cart widget controller.
pub struct CartController<P: Page, S> {
    page: P,
    store: CartStore<S>,
    config: StorefrontConfig,
    elements: Elements<P::Element>,
}

impl<P: Page, S: KeyValueStorage> CartController<P, S> {
    /// Create a controller for `page`, persisting to `storage`.
    pub fn new(page: P, storage: S, config: StorefrontConfig) -> Self {
        let ids = &config.ids;
        let elements = Elements {
            menu_toggle: page.element_by_id(&ids.menu_toggle),
            nav_list: page.element_by_id(&ids.nav_list),
            badge: page.element_by_id(&ids.cart_count),
            rows: page.element_by_id(&ids.cart_items),
            total: page.element_by_id(&ids.cart_total),
            empty_message: page.element_by_id(&ids.cart_empty),
            checkout_form: page.element_by_id(&ids.checkout_form),
        };
        let store = CartStore::new(storage, config.storage_key.clone());

        Self {
            page,
            store,
            config,
            elements,
        }
    }

    pub const fn page(&self) -> &P {
        &self.page
    }

    pub const fn store(&self) -> &CartStore<S> {
        &self.store
    }

    pub const fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    /// The cart as currently stored.
    #[must_use]
    pub fn cart(&self) -> Cart {
        self.store.load()
    }

    /// Whether this page is the cart page.
    #[must_use]
    pub fn is_cart_page(&self) -> bool {
        self.page.body_has_class(&self.config.classes.cart_page)
    }

    /// Initialize the page and return the bindings to register.
    pub fn setup(&self) -> Setup<P::Element> {
        self.update_cart_count();

        let mut bindings = Vec::new();
        if let Some(toggle) = &self.elements.menu_toggle {
            bindings.push(Binding::click(toggle.clone(), Command::ToggleMenu));
        }

        for control in self.page.elements_by_class(&self.config.classes.add_to_cart) {
            bindings.push(Binding::click(control.clone(), Command::AddToCart(control)));
        }

        let cart_page = self.is_cart_page();
        let mut rows = Vec::new();
        if cart_page {
            if let Some(form) = &self.elements.checkout_form {
                bindings.push(Binding::submit(form.clone(), Command::Checkout));
            }
            rows = self.render().unwrap_or_default();
        }

        info!(
            bindings = bindings.len(),
            rows = rows.len(),
            cart_page,
            "Cart widget ready"
        );
        Setup { bindings, rows }
    }

    /// Run the handler for a fired binding.
    #[instrument(level = "debug", skip(self))]
    pub fn dispatch(&self, command: Command<P::Element>) -> Reaction<P::Element> {
        match command {
            Command::ToggleMenu => {
                self.toggle_menu();
                Reaction::none()
            }
            Command::AddToCart(control) => self.add_to_cart(&control),
            Command::RemoveLine(id) => Reaction::rerendered(self.remove_line(&id)),
            Command::IncrementLine(id) => self.increment_line(&id).map_or_else(
                Reaction::none,
                Reaction::rerendered,
            ),
            Command::DecrementLine(id) => self.decrement_line(&id).map_or_else(
                Reaction::none,
                Reaction::rerendered,
            ),
            Command::Checkout => match self.checkout() {
                Ok(rows) => Reaction::rerendered(rows),
                Err(CheckoutError::EmptyCart) => {
                    debug!("Checkout refused: cart is empty");
                    self.page.alert(&self.config.messages.empty_cart);
                    Reaction::none()
                }
            },
        }
    }

    /// Run a deferred task.
    pub fn run(&self, task: Task<P::Element>) {
        match task {
            Task::RestoreControl { control, label } => {
                self.page.set_text(&control, &label);
                self.page.set_disabled(&control, false);
            }
        }
    }

    /// Persist `cart` and refresh the badge.
    ///
    /// A failed write is logged; the badge then reflects whatever storage
    /// still holds.
    pub fn set_cart(&self, cart: &Cart) {
        if let Err(e) = self.store.save(cart) {
            error!("Failed to persist cart: {e}");
        }
        self.update_cart_count();
    }

    /// Write the total quantity into the badge, if the page has one.
    pub fn update_cart_count(&self) -> u64 {
        let count = self.store.load().total_quantity();
        if let Some(badge) = &self.elements.badge {
            self.page.set_text(badge, &count.to_string());
        }
        count
    }

    fn toggle_menu(&self) {
        let Some(toggle) = &self.elements.menu_toggle else {
            return;
        };

        let expanded = self.page.attribute(toggle, "aria-expanded").as_deref() == Some("true");
        self.page.set_attribute(
            toggle,
            "aria-expanded",
            if expanded { "false" } else { "true" },
        );

        if let Some(nav) = &self.elements.nav_list {
            self.page.toggle_class(nav, &self.config.classes.nav_open);
        }
    }

    fn add_to_cart(&self, control: &P::Element) -> Reaction<P::Element> {
        let Some(card) = self
            .page
            .closest(control, &self.config.classes.product_card)
        else {
            debug!("Add-to-cart control is outside a product card");
            return Reaction::none();
        };

        let product = self.read_product(&card);
        let mut cart = self.store.load();
        let outcome = cart.add(product, Utc::now());
        debug!(?outcome, "Product added");
        self.set_cart(&cart);

        let label = self.page.text(control);
        self.page.set_text(control, &self.config.messages.added_label);
        self.page.set_disabled(control, true);

        Reaction::deferred(
            self.config.feedback_duration(),
            Task::RestoreControl {
                control: control.clone(),
                label,
            },
        )
    }

    /// Read a product from its card: data attributes first, then the card's
    /// visible content.
    fn read_product(&self, card: &P::Element) -> ProductDetails {
        let page = &self.page;
        let selectors = &self.config.card;

        let id = page.data(card, "id").unwrap_or_default();

        let name = page
            .data(card, "name")
            .filter(|name| !name.is_empty())
            .or_else(|| {
                page.query(card, &selectors.name)
                    .map(|heading| page.text(&heading))
                    .filter(|name| !name.is_empty())
            })
            .unwrap_or_else(|| self.config.messages.default_product_name.clone());

        let price_text = page
            .query(card, &selectors.price)
            .map(|element| page.text(&element));
        let price =
            legacy_price::resolve_price(page.data(card, "price").as_deref(), price_text.as_deref());

        let img = page
            .query(card, &selectors.image)
            .and_then(|img| page.image_src(&img))
            .unwrap_or_default();

        ProductDetails {
            id: ProductId::new(id),
            name,
            price,
            img,
        }
    }

    /// Re-render the cart rows and return their bindings.
    ///
    /// `None` when the page has no row container, in which case nothing is
    /// touched.
    pub fn render(&self) -> Option<Vec<Binding<P::Element>>> {
        let container = self.elements.rows.as_ref()?;
        let cart = self.store.load();
        let classes = &self.config.classes;

        if cart.is_empty() {
            self.page.set_inner_html(container, "");
            if let Some(empty) = &self.elements.empty_message {
                self.page.remove_class(empty, &classes.hidden);
            }
            if let Some(total) = &self.elements.total {
                self.page.set_text(total, &Price::ZERO.to_string());
            }
            return Some(Vec::new());
        }

        if let Some(empty) = &self.elements.empty_message {
            self.page.add_class(empty, &classes.hidden);
        }

        match markup::render_rows(cart.items(), classes) {
            Ok(html) => self.page.set_inner_html(container, &html),
            Err(e) => {
                error!("Failed to render cart rows: {e}");
                self.page.set_inner_html(container, "");
            }
        }

        if let Some(total) = &self.elements.total {
            self.page.set_text(total, &cart.subtotal().to_string());
        }

        Some(self.row_bindings())
    }

    fn row_bindings(&self) -> Vec<Binding<P::Element>> {
        let classes = &self.config.classes;
        let kinds: [(&str, fn(ProductId) -> Command<P::Element>); 3] = [
            (classes.remove.as_str(), Command::RemoveLine),
            (classes.qty_incr.as_str(), Command::IncrementLine),
            (classes.qty_decr.as_str(), Command::DecrementLine),
        ];

        kinds
            .into_iter()
            .flat_map(|(class, command)| {
                self.page
                    .elements_by_class(class)
                    .into_iter()
                    .map(move |control| {
                        let id = self.page.data(&control, "id").unwrap_or_default();
                        Binding::click(control, command(ProductId::new(id)))
                    })
            })
            .collect()
    }

    fn remove_line(&self, id: &ProductId) -> Option<Vec<Binding<P::Element>>> {
        let mut cart = self.store.load();
        cart.remove(id);
        self.set_cart(&cart);
        self.render()
    }

    /// `None` when the product is not in the cart.
    fn increment_line(&self, id: &ProductId) -> Option<Option<Vec<Binding<P::Element>>>> {
        let mut cart = self.store.load();
        cart.increment(id)?;
        self.set_cart(&cart);
        Some(self.render())
    }

    /// `None` when the product is not in the cart.
    fn decrement_line(&self, id: &ProductId) -> Option<Option<Vec<Binding<P::Element>>>> {
        let mut cart = self.store.load();
        cart.decrement(id)?;
        self.set_cart(&cart);
        Some(self.render())
    }

    /// Submit the demo order: log it, confirm, then empty the cart and the
    /// form.
    fn checkout(&self) -> Result<Option<Vec<Binding<P::Element>>>, CheckoutError> {
        let cart = self.store.load();
        let form = self.elements.checkout_form.as_ref();
        let entries = form
            .map(|form| self.page.form_entries(form))
            .unwrap_or_default();
        let payload = OrderPayload::new(entries, &cart)?;

        let value = payload.to_value();
        self.page.log(&self.config.messages.order_log_prefix, &value);
        info!(order = %value, lines = cart.len(), "Demo order submitted");
        self.page.alert(&self.config.messages.order_confirmed);

        if let Err(e) = self.store.clear() {
            error!("Failed to clear cart: {e}");
        }
        self.set_cart(&Cart::new());
        let rows = self.render();

        if let Some(form) = form {
            self.page.reset_form(form);
        }

        Ok(rows)
    }
}
