//! In-memory todo API with version tokens.
//!
//! Every todo carries a version number that is bumped on each write and sent
//! back as the `etag` header (or as `etag` next to each element of a page).
//! Writes must present the current token in `If-Match`; a stale one is
//! answered with `412 SYS-412-ETAG`. Failures use the structured body
//! `{status, errorCode, title, detail}`.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const MAX_TITLE_LENGTH: usize = 100;
pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: String,
    pub title: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VersionedTodo {
    pub data: Todo,
    pub etag: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoPage {
    pub content: Vec<VersionedTodo>,
    pub total_pages: usize,
}

#[derive(Deserialize)]
pub struct CreateTodo {
    pub title: String,
}

#[derive(Deserialize)]
pub struct UpdateTodo {
    pub title: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub page: usize,
    #[serde(default = "default_page_size")]
    pub size: usize,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

/// The error body every failing endpoint answers with.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub status: u16,
    pub error_code: String,
    pub title: String,
    pub detail: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    detail: String,
}

impl ApiError {
    fn bad_argument(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "TODO-400-ARG",
            detail: detail.into(),
        }
    }

    fn validation(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "SYS-400-VALIDATION",
            detail: detail.into(),
        }
    }

    fn not_found(id: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            code: "TODO-404",
            detail: format!("todo {id} does not exist"),
        }
    }

    fn precondition_failed(id: &str) -> Self {
        Self {
            status: StatusCode::PRECONDITION_FAILED,
            code: "SYS-412-ETAG",
            detail: format!("todo {id} was modified since it was read"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            status: self.status.as_u16(),
            error_code: self.code.to_string(),
            title: self
                .status
                .canonical_reason()
                .unwrap_or("Error")
                .to_string(),
            detail: self.detail,
        };
        (self.status, Json(body)).into_response()
    }
}

struct Entry {
    todo: Todo,
    version: u64,
    seq: u64,
}

impl Entry {
    fn etag(&self) -> String {
        format!("\"v{}\"", self.version)
    }

    fn versioned(&self) -> VersionedTodo {
        VersionedTodo {
            data: self.todo.clone(),
            etag: self.etag(),
        }
    }

    fn respond(&self, status: StatusCode) -> Response {
        let headers = [(header::ETAG, self.etag())];
        (status, headers, Json(self.todo.clone())).into_response()
    }
}

#[derive(Default)]
pub struct Store {
    todos: HashMap<String, Entry>,
    next_seq: u64,
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/api/todos", get(list_todos).post(create_todo))
        .route(
            "/api/todos/{id}",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn checked_title(title: &str) -> Result<String, ApiError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ApiError::bad_argument("title must not be blank"));
    }
    if trimmed.chars().count() > MAX_TITLE_LENGTH {
        return Err(ApiError::bad_argument(format!(
            "title must be at most {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(trimmed.to_string())
}

fn check_version(entry: &Entry, id: &str, headers: &HeaderMap) -> Result<(), ApiError> {
    let expected = headers
        .get(header::IF_MATCH)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::validation("If-Match header is required"))?;
    if expected != entry.etag() {
        tracing::debug!(
            id,
            expected,
            current = %entry.etag(),
            "rejecting stale write"
        );
        return Err(ApiError::precondition_failed(id));
    }
    Ok(())
}

async fn list_todos(
    State(db): State<Db>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<TodoPage>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::validation(e.body_text()))?;
    if params.size == 0 {
        return Err(ApiError::validation("size must be at least 1"));
    }

    let store = db.read().await;
    let mut entries: Vec<&Entry> = store.todos.values().collect();
    entries.sort_by(|a, b| b.seq.cmp(&a.seq));

    let total_pages = entries.len().div_ceil(params.size);
    let content = entries
        .into_iter()
        .skip(params.page.saturating_mul(params.size))
        .take(params.size)
        .map(Entry::versioned)
        .collect();
    Ok(Json(TodoPage {
        content,
        total_pages,
    }))
}

async fn create_todo(
    State(db): State<Db>,
    payload: Result<Json<CreateTodo>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(input) = payload.map_err(|e| ApiError::validation(e.body_text()))?;
    let title = checked_title(&input.title)?;

    let now = Utc::now();
    let mut store = db.write().await;
    let seq = store.next_seq;
    store.next_seq += 1;
    let entry = Entry {
        todo: Todo {
            id: Uuid::new_v4().to_string(),
            title,
            completed: false,
            created_at: now,
            updated_at: now,
        },
        version: 1,
        seq,
    };
    let response = entry.respond(StatusCode::CREATED);
    store.todos.insert(entry.todo.id.clone(), entry);
    Ok(response)
}

async fn get_todo(State(db): State<Db>, Path(id): Path<String>) -> Result<Response, ApiError> {
    let store = db.read().await;
    let entry = store.todos.get(&id).ok_or_else(|| ApiError::not_found(&id))?;
    Ok(entry.respond(StatusCode::OK))
}

async fn update_todo(
    State(db): State<Db>,
    Path(id): Path<String>,
    headers: HeaderMap,
    payload: Result<Json<UpdateTodo>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(input) = payload.map_err(|e| ApiError::validation(e.body_text()))?;
    let title = input.title.as_deref().map(checked_title).transpose()?;

    let mut store = db.write().await;
    let entry = store
        .todos
        .get_mut(&id)
        .ok_or_else(|| ApiError::not_found(&id))?;
    check_version(entry, &id, &headers)?;

    if let Some(title) = title {
        entry.todo.title = title;
    }
    if let Some(completed) = input.completed {
        entry.todo.completed = completed;
    }
    entry.todo.updated_at = Utc::now();
    entry.version += 1;
    Ok(entry.respond(StatusCode::OK))
}

async fn delete_todo(
    State(db): State<Db>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let mut store = db.write().await;
    let entry = store.todos.get(&id).ok_or_else(|| ApiError::not_found(&id))?;
    check_version(entry, &id, &headers)?;
    store.todos.remove(&id);
    Ok(StatusCode::NO_CONTENT)
}
