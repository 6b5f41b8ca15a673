//! Client core for the todo service.
//!
//! # Overview
//! Keeps a single-focus todo UI consistent with a remote API: a typed
//! navigation state, a controller for the shown todo, a paged list, and the
//! actions that write to the server under optimistic concurrency (every
//! write carries the version token of the resource it was based on).
//!
//! # Design
//! - `TodoClient` is stateless and only builds `HttpRequest`s and parses
//!   `HttpResponse`s. The host plugs in the network through `Transport`.
//! - `TodoApi` runs the four CRUD operations over a transport and returns raw
//!   `ApiError`s; `classify` alone turns them into messages.
//! - `TodoApp` owns the view machine and both controllers and sequences every
//!   mutation: write first, then the reads that depend on it.
//! - Everything runs on one thread; state sits in `RefCell`s that are never
//!   borrowed across an `.await`.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod api;
pub mod app;
pub mod classify;
pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod http;
pub mod page;
pub mod types;
pub mod view_mode;

pub use api::TodoApi;
pub use app::{Mutation, MutationStatus, TodoApp};
pub use classify::{classify, Classified, ErrorKind, Severity};
pub use client::TodoClient;
pub use config::{ClientConfig, API_BASE_URL, MAX_TITLE_LENGTH, PAGE_SIZE};
pub use controller::{ItemController, ItemState, ListController, ListState};
pub use error::{ApiError, ApiErrorResponse};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use types::{CreateTodo, DeleteTodo, Page, Todo, TodoPatch, UpdateTodo, Versioned};
pub use view_mode::{
    ContentView, ContentViewMachine, ContentViewMode, ItemView, RawViewMode, ViewMode,
    ViewModeMachine, ViewTag,
};
