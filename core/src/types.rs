//! Domain DTOs for the todo API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently.
//! Integration tests catch any schema drift between the two crates.
//!
//! `Todo` and `Page<Todo>` only ever come out of a server response. The client
//! never builds one from scratch; it holds the last one it was given until a
//! newer response replaces it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single todo item returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: String,
    pub title: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A resource paired with the version token the server issued for it.
///
/// The token is only meaningful together with the id of `data`. Inside a page
/// each element carries its own token; for single reads and writes the token
/// comes from the `etag` response header.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Versioned<T> {
    pub data: T,
    pub etag: String,
}

impl Versioned<Todo> {
    pub fn id(&self) -> &str {
        &self.data.id
    }
}

/// One page of resources as returned by the list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<Versioned<T>>,
    pub total_pages: u32,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            content: Vec::new(),
            total_pages: 0,
        }
    }
}

impl Page<Todo> {
    /// Whether a todo with `id` is part of this page.
    pub fn contains(&self, id: &str) -> bool {
        self.content.iter().any(|item| item.data.id == id)
    }
}

/// Request payload for creating a new todo.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateTodo {
    pub title: String,
}

/// Request payload for updating an existing todo. Only the fields present in
/// the JSON are applied; omitted fields remain unchanged on the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateTodo {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl UpdateTodo {
    /// Keep only the fields that differ from `origin`.
    ///
    /// A field that is absent, or equal to the one in `origin`, is dropped.
    pub fn diff(&self, origin: &Todo) -> UpdateTodo {
        UpdateTodo {
            id: self.id.clone(),
            title: self.title.clone().filter(|title| *title != origin.title),
            completed: self
                .completed
                .filter(|completed| *completed != origin.completed),
        }
    }

    /// True when the patch carries no field at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.completed.is_none()
    }
}

/// Request payload for deleting a todo. Sent as path only, never as a body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteTodo {
    pub id: String,
}

/// The user-editable fields of a todo, as entered in an edit form or produced
/// by a toggle. Turned into an `UpdateTodo` against a known version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub completed: Option<bool>,
}
