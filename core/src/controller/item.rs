//! The todo currently shown, with its version token.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use futures::future::AbortHandle;
use tracing::debug;

use crate::api::TodoApi;
use crate::classify::classify;
use crate::http::Transport;
use crate::types::{Todo, Versioned};

pub const MSG_FETCH_FAILED: &str = "failed to fetch the todo";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemState {
    pub loading: bool,
    pub error: Option<String>,
    pub current: Option<Versioned<Todo>>,
}

/// Fetches and holds a single todo.
///
/// At most one fetch is outstanding: starting a new one aborts the previous
/// and bumps a generation counter. A fetch whose generation is no longer
/// current drops its result, even if the response made it back.
pub struct ItemController<T> {
    api: Rc<TodoApi<T>>,
    state: RefCell<ItemState>,
    id: RefCell<Option<String>>,
    in_flight: RefCell<Option<AbortHandle>>,
    generation: Cell<u64>,
}

impl<T: Transport> ItemController<T> {
    pub fn new(api: Rc<TodoApi<T>>) -> Self {
        Self {
            api,
            state: RefCell::new(ItemState::default()),
            id: RefCell::new(None),
            in_flight: RefCell::new(None),
            generation: Cell::new(0),
        }
    }

    pub fn state(&self) -> ItemState {
        self.state.borrow().clone()
    }

    pub fn current(&self) -> Option<Versioned<Todo>> {
        self.state.borrow().current.clone()
    }

    /// Id of the todo this controller is bound to.
    pub fn id(&self) -> Option<String> {
        self.id.borrow().clone()
    }

    /// Fetch `id`, superseding any fetch still in flight.
    pub async fn fetch(&self, id: &str) {
        let generation = self.supersede();
        let (handle, registration) = AbortHandle::new_pair();
        *self.in_flight.borrow_mut() = Some(handle);

        let rebound = self.id.borrow().as_deref() != Some(id);
        if rebound {
            *self.id.borrow_mut() = Some(id.to_string());
        }
        {
            let mut state = self.state.borrow_mut();
            state.loading = true;
            state.error = None;
            if rebound {
                state.current = None;
            }
        }

        let result = self.api.fetch_one(id, Some(registration)).await;

        if self.generation.get() != generation {
            debug!(id, "discarding superseded fetch");
            return;
        }
        self.in_flight.borrow_mut().take();

        let mut state = self.state.borrow_mut();
        state.loading = false;
        match result {
            Ok(todo) => state.current = Some(todo),
            Err(err) => {
                if let Some(classified) = classify(&err, MSG_FETCH_FAILED) {
                    state.error = Some(classified.message);
                }
            }
        }
    }

    /// Fetch the bound todo again. Does nothing when unbound.
    pub async fn reload(&self) {
        let id = self.id.borrow().clone();
        if let Some(id) = id {
            self.fetch(&id).await;
        }
    }

    /// Abort any fetch and forget the bound todo.
    pub fn clear(&self) {
        self.supersede();
        *self.id.borrow_mut() = None;
        *self.state.borrow_mut() = ItemState::default();
    }

    /// Invalidate the running fetch, if any, and return the next generation.
    fn supersede(&self) -> u64 {
        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        if let Some(previous) = self.in_flight.take() {
            previous.abort();
        }
        generation
    }
}

impl<T> Drop for ItemController<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.get_mut().take() {
            handle.abort();
        }
    }
}
