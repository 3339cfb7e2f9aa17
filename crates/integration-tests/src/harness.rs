//! Test host.

use std::time::Duration;

use mignon_core::Cart;
use mignon_storefront::{
    Binding, CartController, Command, EventKind, MemoryStorage, Reaction, StorefrontConfig, Task,
};

use crate::Error;
use crate::dom::NodeId;
use crate::page::FakePage;

#[derive(Debug)]
struct Timer {
    due: Duration,
    task: Task<NodeId>,
}

/// Plays the browser host for one page load.
///
/// Events bubble from the target through its ancestors, firing every binding
/// registered on the way, page bindings before row bindings. Clicks on a
/// disabled control fire nothing. Deferred tasks wait on a virtual clock
/// moved by [`advance`](Self::advance).
pub struct Harness {
    page: FakePage,
    storage: MemoryStorage,
    controller: CartController<FakePage, MemoryStorage>,
    bindings: Vec<Binding<NodeId>>,
    rows: Vec<Binding<NodeId>>,
    timers: Vec<Timer>,
    now: Duration,
}

impl Harness {
    /// Load `html` with empty storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the markup or its configuration block is invalid.
    pub fn load(html: &str) -> Result<Self, Error> {
        Self::load_with_storage(html, MemoryStorage::new())
    }

    /// Load `html` over existing storage, as a later page load would.
    ///
    /// # Errors
    ///
    /// Returns an error if the markup or its configuration block is invalid.
    pub fn load_with_storage(html: &str, storage: MemoryStorage) -> Result<Self, Error> {
        let page = FakePage::parse(html)?;
        let config = page.config()?;
        Ok(Self::start(page, storage, config))
    }

    /// Run setup for an already loaded page.
    #[must_use]
    pub fn start(page: FakePage, storage: MemoryStorage, config: StorefrontConfig) -> Self {
        let controller = CartController::new(page.clone(), storage.clone(), config);
        let setup = controller.setup();

        Self {
            page,
            storage,
            controller,
            bindings: setup.bindings,
            rows: setup.rows,
            timers: Vec::new(),
            now: Duration::ZERO,
        }
    }

    pub const fn page(&self) -> &FakePage {
        &self.page
    }

    pub const fn storage(&self) -> &MemoryStorage {
        &self.storage
    }

    pub const fn controller(&self) -> &CartController<FakePage, MemoryStorage> {
        &self.controller
    }

    /// The stored cart.
    #[must_use]
    pub fn cart(&self) -> Cart {
        self.controller.cart()
    }

    /// Bindings registered for the page's lifetime.
    #[must_use]
    pub fn bindings(&self) -> &[Binding<NodeId>] {
        &self.bindings
    }

    /// Bindings of the currently rendered cart rows.
    #[must_use]
    pub fn row_bindings(&self) -> &[Binding<NodeId>] {
        &self.rows
    }

    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Click `target`. Returns how many bindings fired.
    pub fn click(&mut self, target: NodeId) -> usize {
        if self.page.is_disabled(target) {
            return 0;
        }
        self.fire(target, EventKind::Click)
    }

    /// Click the element with the given `id`.
    ///
    /// # Panics
    ///
    /// Panics if there is no such element.
    pub fn click_id(&mut self, id: &str) -> usize {
        let target = self
            .page
            .by_id(id)
            .unwrap_or_else(|| panic!("no element #{id}"));
        self.click(target)
    }

    /// Submit `form`. Returns how many bindings fired.
    pub fn submit(&mut self, form: NodeId) -> usize {
        self.fire(form, EventKind::Submit)
    }

    fn fire(&mut self, target: NodeId, event: EventKind) -> usize {
        let mut commands: Vec<Command<NodeId>> = Vec::new();
        for node in self.page.event_path(target) {
            for binding in self.bindings.iter().chain(&self.rows) {
                if binding.target == node && binding.event == event {
                    commands.push(binding.command.clone());
                }
            }
        }

        let fired = commands.len();
        for command in commands {
            let reaction = self.controller.dispatch(command);
            self.apply(reaction);
        }
        fired
    }

    fn apply(&mut self, reaction: Reaction<NodeId>) {
        if let Some(rows) = reaction.rows {
            self.rows = rows;
        }
        for deferred in reaction.deferred {
            self.timers.push(Timer {
                due: self.now + deferred.delay,
                task: deferred.task,
            });
        }
    }

    /// Move the clock forward and run the tasks that fell due, earliest
    /// first.
    pub fn advance(&mut self, by: Duration) {
        self.now += by;
        let now = self.now;
        let (mut due, pending): (Vec<Timer>, Vec<Timer>) =
            std::mem::take(&mut self.timers)
                .into_iter()
                .partition(|timer| timer.due <= now);
        self.timers = pending;

        due.sort_by_key(|timer| timer.due);
        for timer in due {
            self.controller.run(timer.task);
        }
    }
}
