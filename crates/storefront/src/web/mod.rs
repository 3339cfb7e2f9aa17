//! Browser host.
//!
//! Binds the controller to the live document: registers a listener per
//! [`Binding`], forwards fired events to [`CartController::dispatch`], swaps
//! row listeners after each render and schedules deferred tasks on
//! `setTimeout`.

pub mod page;
pub mod storage;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use gloo_timers::callback::Timeout;
use tracing::{error, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, Event};

pub use page::WebPage;
pub use storage::LocalStorage;

use crate::config::StorefrontConfig;
use crate::controller::CartController;
use crate::error::AppError;
use crate::page::{Binding, Command, Deferred, EventKind};
use storage::describe;

thread_local! {
    static HOST: RefCell<Option<Rc<Host>>> = const { RefCell::new(None) };
}

/// Module entry point.
///
/// # Errors
///
/// Returns the failure as a JS value if the widget cannot attach to the page.
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let page = WebPage::new().map_err(to_js)?;
    if page.is_loading() {
        let on_ready = Closure::once(move || {
            if let Err(e) = boot(page) {
                error!("Cart widget failed to start: {e}");
            }
        });
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;
        document
            .add_event_listener_with_callback("DOMContentLoaded", on_ready.as_ref().unchecked_ref())?;
        on_ready.forget();
        Ok(())
    } else {
        boot(page).map_err(to_js)
    }
}

fn to_js(e: AppError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn boot(page: WebPage) -> Result<(), AppError> {
    let config = page.config().unwrap_or_else(|e| {
        warn!("Ignoring invalid page configuration: {e}");
        StorefrontConfig::default()
    });
    let controller = CartController::new(page, LocalStorage, config);

    let host = Rc::new_cyclic(|this| Host {
        controller,
        this: this.clone(),
        page_listeners: RefCell::default(),
        rows: RefCell::default(),
        retired: RefCell::default(),
    });

    let setup = host.controller.setup();
    for binding in setup.bindings {
        let listener = host
            .listen(binding)
            .map_err(|e| AppError::Environment(describe(&e)))?;
        host.page_listeners.borrow_mut().push(listener);
    }
    host.replace_rows(setup.rows);

    HOST.with(|slot| *slot.borrow_mut() = Some(host));
    Ok(())
}

/// A registered DOM listener.
struct Listener {
    target: Element,
    event: EventKind,
    closure: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn detach(&self) {
        let _ = self.target.remove_event_listener_with_callback(
            self.event.as_str(),
            self.closure.as_ref().unchecked_ref(),
        );
    }
}

struct Host {
    controller: CartController<WebPage, LocalStorage>,
    this: Weak<Self>,
    page_listeners: RefCell<Vec<Listener>>,
    rows: RefCell<Vec<Listener>>,
    /// Row listeners detached by the latest render. The one that triggered
    /// it may still be running, so its closure is dropped a render later.
    retired: RefCell<Vec<Listener>>,
}

impl Host {
    fn listen(&self, binding: Binding<Element>) -> Result<Listener, JsValue> {
        let Binding {
            target,
            event,
            command,
        } = binding;
        let host = self.this.clone();

        let closure = Closure::<dyn FnMut(Event)>::new(move |dom_event: Event| {
            if event == EventKind::Submit {
                dom_event.prevent_default();
            }
            if let Some(host) = host.upgrade() {
                host.dispatch(command.clone());
            }
        });
        target.add_event_listener_with_callback(event.as_str(), closure.as_ref().unchecked_ref())?;

        Ok(Listener {
            target,
            event,
            closure,
        })
    }

    fn dispatch(&self, command: Command<Element>) {
        let reaction = self.controller.dispatch(command);
        if let Some(rows) = reaction.rows {
            self.replace_rows(rows);
        }
        for deferred in reaction.deferred {
            self.schedule(deferred);
        }
    }

    fn replace_rows(&self, bindings: Vec<Binding<Element>>) {
        let mut fresh = Vec::with_capacity(bindings.len());
        for binding in bindings {
            match self.listen(binding) {
                Ok(listener) => fresh.push(listener),
                Err(e) => error!("Failed to bind cart row control: {}", describe(&e)),
            }
        }

        let previous = self.rows.replace(fresh);
        for listener in &previous {
            listener.detach();
        }
        self.retired.replace(previous);
    }

    fn schedule(&self, deferred: Deferred<Element>) {
        let host = self.this.clone();
        let Deferred { delay, task } = deferred;
        let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);

        Timeout::new(millis, move || {
            if let Some(host) = host.upgrade() {
                host.controller.run(task);
            }
        })
        .forget();
    }
}
