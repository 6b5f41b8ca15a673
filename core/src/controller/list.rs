//! The currently loaded page of todos and the cursor over pages.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;

use crate::api::TodoApi;
use crate::classify::classify;
use crate::http::Transport;
use crate::page::{clamp_page, Cursor};
use crate::types::{Page, Todo};

pub const MSG_LIST_FAILED: &str = "failed to fetch the todo list";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListState {
    pub loading: bool,
    pub error: Option<String>,
    pub page: Page<Todo>,
    pub current_page: u32,
    /// Number of pages as last reported by the server. 1 until then.
    pub total_pages: u32,
}

impl Default for ListState {
    fn default() -> Self {
        Self {
            loading: false,
            error: None,
            page: Page::default(),
            current_page: 0,
            total_pages: 1,
        }
    }
}

/// Fetches pages and moves the cursor between them.
///
/// Pages already read are cached by index. Moving to another page serves it
/// from the cache when possible. Asking for the page the cursor is on always
/// goes to the network and drops every other cached page. Any successful
/// write must call [`invalidate`](Self::invalidate) or
/// [`refresh`](Self::refresh) so no cached page outlives it.
pub struct ListController<T> {
    api: Rc<TodoApi<T>>,
    state: RefCell<ListState>,
    cache: RefCell<HashMap<u32, Page<Todo>>>,
    generation: Cell<u64>,
}

impl<T: Transport> ListController<T> {
    pub fn new(api: Rc<TodoApi<T>>) -> Self {
        Self {
            api,
            state: RefCell::new(ListState::default()),
            cache: RefCell::new(HashMap::new()),
            generation: Cell::new(0),
        }
    }

    pub fn state(&self) -> ListState {
        self.state.borrow().clone()
    }

    pub fn current_page(&self) -> u32 {
        self.state.borrow().current_page
    }

    pub fn total_pages(&self) -> u32 {
        self.state.borrow().total_pages
    }

    /// Whether the loaded page holds the todo `id`.
    pub fn contains(&self, id: &str) -> bool {
        self.state.borrow().page.contains(id)
    }

    /// Show the page under the cursor, from the cache if it is there.
    pub async fn load(&self) {
        self.show(self.current_page()).await;
    }

    /// Read the page under the cursor from the network again.
    pub async fn reload(&self) {
        self.refresh(self.current_page()).await;
    }

    /// Drop every cached page and read `page`, clamped into range, from the
    /// network.
    pub async fn refresh(&self, page: u32) {
        self.cache.borrow_mut().clear();
        self.fetch(page).await;
    }

    /// Drop the cached pages other than the one under the cursor.
    pub fn invalidate(&self) {
        let current = self.current_page();
        self.cache.borrow_mut().retain(|&page, _| page == current);
    }

    pub async fn previous(&self) {
        if let Some(page) = self.cursor().previous() {
            self.show(page).await;
        }
    }

    pub async fn next(&self) {
        if let Some(page) = self.cursor().next() {
            self.show(page).await;
        }
    }

    /// Jump to `page`, clamped into range. Jumping to the current page
    /// reloads it.
    pub async fn go_to(&self, page: u32) {
        let cursor = self.cursor();
        let target = cursor.go_to(page);
        if target == cursor.current {
            self.reload().await;
        } else {
            self.show(target).await;
        }
    }

    fn cursor(&self) -> Cursor {
        let state = self.state.borrow();
        Cursor::new(state.current_page, state.total_pages)
    }

    async fn show(&self, page: u32) {
        let cached = self.cache.borrow().get(&page).cloned();
        match cached {
            Some(cached) => {
                debug!(page, "serving page from cache");
                self.generation.set(self.generation.get() + 1);
                let mut state = self.state.borrow_mut();
                state.loading = false;
                state.error = None;
                state.current_page = page;
                state.total_pages = cached.total_pages;
                state.page = cached;
            }
            None => self.fetch(page).await,
        }
    }

    async fn fetch(&self, mut page: u32) {
        loop {
            let generation = self.generation.get() + 1;
            self.generation.set(generation);
            {
                let mut state = self.state.borrow_mut();
                state.loading = true;
                state.error = None;
            }

            let size = self.api.config().page_size;
            let result = self.api.fetch_page(page, size, None).await;

            if self.generation.get() != generation {
                debug!(page, "discarding superseded page read");
                return;
            }

            let fetched = match result {
                Ok(fetched) => fetched,
                Err(err) => {
                    let mut state = self.state.borrow_mut();
                    state.loading = false;
                    state.error = classify(&err, MSG_LIST_FAILED).map(|c| c.message);
                    return;
                }
            };

            let clamped = clamp_page(page, fetched.total_pages);
            if clamped != page {
                debug!(
                    page,
                    clamped,
                    total_pages = fetched.total_pages,
                    "page out of range"
                );
                page = clamped;
                continue;
            }

            self.cache.borrow_mut().insert(page, fetched.clone());
            let mut state = self.state.borrow_mut();
            state.loading = false;
            state.current_page = page;
            state.total_pages = fetched.total_pages;
            state.page = fetched;
            return;
        }
    }
}
