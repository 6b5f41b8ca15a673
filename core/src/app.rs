//! User actions end to end: validate, write, then bring dependent state in
//! line with the server.
//!
//! # Design
//! `TodoApp` owns the one current view, the item controller and the list
//! controller, so nothing else can write them. Every mutation follows the
//! same order: local checks first, then the conditional write, then the
//! reads that depend on it. Reads are never issued before the write settles.
//!
//! Failures are classified and stored as the action's message. A failure
//! that means local state can no longer be trusted moves the view to the
//! `error` screen instead. Callers learn whether an action succeeded from its
//! return value; an empty message alone proves nothing.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, error};

use crate::api::TodoApi;
use crate::classify::classify;
use crate::config::ClientConfig;
use crate::controller::{ItemController, ListController};
use crate::error::ApiError;
use crate::http::Transport;
use crate::types::{CreateTodo, DeleteTodo, Todo, TodoPatch, UpdateTodo, Versioned};
use crate::view_mode::{
    ContentView, ContentViewMachine, ContentViewMode, ItemView, RawViewMode, ViewMode,
};

pub const MSG_CREATE_FAILED: &str = "failed to create the todo";
pub const MSG_UPDATE_FAILED: &str = "failed to update the todo";
pub const MSG_DELETE_FAILED: &str = "failed to delete the todo";
pub const MSG_NOTHING_CHANGED: &str = "nothing changed";
pub const MSG_NO_CURRENT: &str = "no todo is selected";

/// The user actions that write to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mutation {
    Create,
    Update,
    Toggle,
    Delete,
}

/// Progress and outcome message of one kind of action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationStatus {
    pub in_progress: bool,
    pub message: Option<String>,
}

/// Marks an action as running until dropped, even if its future is.
struct Running<'a> {
    status: &'a RefCell<MutationStatus>,
}

impl<'a> Running<'a> {
    fn start(status: &'a RefCell<MutationStatus>) -> Self {
        *status.borrow_mut() = MutationStatus {
            in_progress: true,
            message: None,
        };
        Self { status }
    }

    fn fail(&self, message: impl Into<String>) {
        self.status.borrow_mut().message = Some(message.into());
    }
}

impl Drop for Running<'_> {
    fn drop(&mut self) {
        self.status.borrow_mut().in_progress = false;
    }
}

pub struct TodoApp<T> {
    api: Rc<TodoApi<T>>,
    view: RefCell<ContentViewMachine>,
    item: ItemController<T>,
    list: ListController<T>,
    create_status: RefCell<MutationStatus>,
    update_status: RefCell<MutationStatus>,
    toggle_status: RefCell<MutationStatus>,
    delete_status: RefCell<MutationStatus>,
}

impl<T: Transport> TodoApp<T> {
    pub fn new(config: ClientConfig, transport: T) -> Self {
        let api = Rc::new(TodoApi::new(config, transport));
        Self {
            item: ItemController::new(Rc::clone(&api)),
            list: ListController::new(Rc::clone(&api)),
            api,
            view: RefCell::new(ContentViewMachine::for_content()),
            create_status: RefCell::default(),
            update_status: RefCell::default(),
            toggle_status: RefCell::default(),
            delete_status: RefCell::default(),
        }
    }

    pub fn api(&self) -> &TodoApi<T> {
        &self.api
    }

    pub fn item(&self) -> &ItemController<T> {
        &self.item
    }

    pub fn list(&self) -> &ListController<T> {
        &self.list
    }

    pub fn view(&self) -> ContentViewMode {
        self.view.borrow().current().clone()
    }

    pub fn status(&self, mutation: Mutation) -> MutationStatus {
        self.status_cell(mutation).borrow().clone()
    }

    /// Load the first list page.
    pub async fn start(&self) {
        self.list.load().await;
    }

    /// Change the view. Undeclared views are ignored (see `ViewModeMachine`).
    pub fn change_view(&self, next: ContentViewMode) -> bool {
        self.view.borrow_mut().change(next)
    }

    pub fn change_view_raw(&self, next: &RawViewMode) -> bool {
        self.view.borrow_mut().change_raw(next)
    }

    /// Show the todo `id`.
    pub async fn open(&self, id: &str) {
        if self.change_view(ViewMode::dynamic(ItemView::Item, id)) {
            self.item.fetch(id).await;
        }
    }

    /// Show the edit form of `id`, reusing the loaded todo when it is the same.
    pub async fn open_edit(&self, id: &str) {
        if !self.change_view(ViewMode::dynamic(ItemView::Edit, id)) {
            return;
        }
        let loaded = self.item.current().is_some_and(|todo| todo.id() == id);
        if !loaded {
            self.item.fetch(id).await;
        }
    }

    pub fn open_create(&self) {
        if self.change_view(ViewMode::Static(ContentView::Create)) {
            self.item.clear();
        }
    }

    pub fn close(&self) {
        if self.change_view(ViewMode::Static(ContentView::None)) {
            self.item.clear();
        }
    }

    /// Create a todo and show it. Returns the new id.
    pub async fn create(&self, title: &str) -> Option<String> {
        let running = Running::start(&self.create_status);
        let title = match self.api.client().validate_title(title) {
            Ok(title) => title.to_string(),
            Err(err) => {
                self.report(&running, &err, MSG_CREATE_FAILED);
                return None;
            }
        };

        let created = match self.api.create(&CreateTodo { title }).await {
            Ok(created) => created,
            Err(err) => {
                self.report(&running, &err, MSG_CREATE_FAILED);
                return None;
            }
        };

        let id = created.data.id;
        debug!(%id, "todo created");
        self.open(&id).await;
        // Newest first: the new todo lands on page 0 and shifts the others.
        self.list.refresh(0).await;
        Some(id)
    }

    /// Apply `patch` to `origin`, guarded by `origin`'s version token.
    /// Returns the updated id.
    pub async fn update(&self, origin: &Versioned<Todo>, patch: TodoPatch) -> Option<String> {
        let running = Running::start(&self.update_status);
        self.apply_update(&running, origin, patch).await
    }

    /// [`update`](Self::update) against the todo held by the item controller.
    pub async fn edit_current(&self, patch: TodoPatch) -> Option<String> {
        let running = Running::start(&self.update_status);
        let Some(origin) = self.item.current() else {
            running.fail(MSG_NO_CURRENT);
            return None;
        };
        self.apply_update(&running, &origin, patch).await
    }

    /// Flip the completed flag of `origin`.
    pub async fn toggle_completed(&self, origin: &Versioned<Todo>) -> Option<String> {
        let running = Running::start(&self.toggle_status);
        self.apply_update(&running, origin, toggled(origin)).await
    }

    pub async fn toggle_current(&self) -> Option<String> {
        let running = Running::start(&self.toggle_status);
        let Some(origin) = self.item.current() else {
            running.fail(MSG_NO_CURRENT);
            return None;
        };
        self.apply_update(&running, &origin, toggled(&origin)).await
    }

    /// Delete `origin`, guarded by its version token.
    pub async fn delete(&self, origin: &Versioned<Todo>) -> bool {
        let running = Running::start(&self.delete_status);
        self.apply_delete(&running, origin).await
    }

    pub async fn delete_current(&self) -> bool {
        let running = Running::start(&self.delete_status);
        let Some(origin) = self.item.current() else {
            running.fail(MSG_NO_CURRENT);
            return false;
        };
        self.apply_delete(&running, &origin).await
    }

    async fn apply_update(
        &self,
        running: &Running<'_>,
        origin: &Versioned<Todo>,
        patch: TodoPatch,
    ) -> Option<String> {
        // A blank title keeps the current one.
        let title = patch
            .title
            .as_deref()
            .map(str::trim)
            .filter(|title| !title.is_empty());
        if let Some(title) = title {
            if let Err(err) = self.api.client().validate_title(title) {
                self.report(running, &err, MSG_UPDATE_FAILED);
                return None;
            }
        }

        let request = UpdateTodo {
            id: origin.data.id.clone(),
            title: title.map(str::to_string),
            completed: patch.completed,
        }
        .diff(&origin.data);
        if request.is_empty() {
            debug!(id = %origin.data.id, "update skipped, nothing changed");
            running.fail(MSG_NOTHING_CHANGED);
            return None;
        }

        let updated = match self.api.update(&request, &origin.etag).await {
            Ok(updated) => updated,
            Err(err) => {
                self.report(running, &err, MSG_UPDATE_FAILED);
                return None;
            }
        };

        let id = updated.data.id;
        let shown = self.view().target() == Some(id.as_str());
        if shown {
            self.change_view(ViewMode::dynamic(ItemView::Item, id.as_str()));
            self.item.fetch(&id).await;
        }
        self.list.invalidate();
        if self.list.contains(&id) {
            self.list.reload().await;
        }
        Some(id)
    }

    async fn apply_delete(&self, running: &Running<'_>, origin: &Versioned<Todo>) -> bool {
        let id = origin.data.id.clone();
        let request = DeleteTodo { id: id.clone() };
        let deleted = match self.api.delete(&request, &origin.etag).await {
            Ok(deleted) => deleted,
            Err(err) => {
                self.report(running, &err, MSG_DELETE_FAILED);
                return false;
            }
        };
        if !deleted {
            running.fail(MSG_DELETE_FAILED);
            return false;
        }

        let shown = self.view.borrow().is_target(&id);
        if shown {
            self.close();
        }
        self.list.invalidate();
        if self.list.contains(&id) {
            self.list.reload().await;
        }
        true
    }

    /// Store the classified message, or leave for the error view when the
    /// failure cannot be handled in place. Cancellations are dropped.
    fn report(&self, running: &Running<'_>, err: &ApiError, fallback: &str) {
        let Some(classified) = classify(err, fallback) else {
            return;
        };
        if classified.kind.escalates() {
            error!(
                error = %err,
                view = %self.view(),
                "unexpected failure, showing the error view"
            );
            self.change_view(ViewMode::Static(ContentView::Error));
            return;
        }
        running.fail(classified.message);
    }

    fn status_cell(&self, mutation: Mutation) -> &RefCell<MutationStatus> {
        match mutation {
            Mutation::Create => &self.create_status,
            Mutation::Update => &self.update_status,
            Mutation::Toggle => &self.toggle_status,
            Mutation::Delete => &self.delete_status,
        }
    }
}

fn toggled(origin: &Versioned<Todo>) -> TodoPatch {
    TodoPatch {
        title: None,
        completed: Some(!origin.data.completed),
    }
}
