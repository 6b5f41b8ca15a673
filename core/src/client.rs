//! Stateless HTTP request builder and response parser for the todo API.
//!
//! # Design
//! `TodoClient` holds only its `ClientConfig` and carries no mutable state
//! between calls. Each CRUD operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. [`crate::api::TodoApi`] glues the two around a
//! `Transport`; nothing in this file touches the network.
//!
//! Conditional writes take the expected version as an explicit argument and
//! send it as `If-Match`. It is never looked up from ambient state.

use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::{ApiError, ApiErrorResponse};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, ETAG, IF_MATCH};
use crate::types::{CreateTodo, DeleteTodo, Page, Todo, UpdateTodo, Versioned};

pub const MSG_TITLE_REQUIRED: &str = "title is required";

/// Synchronous, stateless client for the todo API.
#[derive(Debug, Clone)]
pub struct TodoClient {
    config: ClientConfig,
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_config(ClientConfig::new(base_url))
    }

    pub fn with_config(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Check a title against the local rules: non-blank after trimming and
    /// no longer than the configured maximum.
    ///
    /// Returns the trimmed title.
    pub fn validate_title<'a>(&self, title: &'a str) -> Result<&'a str, ApiError> {
        let trimmed = title.trim();
        if trimmed.is_empty() {
            return Err(ApiError::Validation(MSG_TITLE_REQUIRED.to_string()));
        }
        let max = self.config.max_title_length;
        if trimmed.chars().count() > max {
            return Err(ApiError::Validation(format!(
                "title must be at most {max} characters"
            )));
        }
        Ok(trimmed)
    }

    pub fn build_list_todos(&self, page: u32, size: u32) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/todos?page={page}&size={size}", self.config.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_get_todo(&self, id: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: self.todo_path(id),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_create_todo(&self, input: &CreateTodo) -> Result<HttpRequest, ApiError> {
        let title = self.validate_title(&input.title)?;
        let body = to_json(&CreateTodo {
            title: title.to_string(),
        })?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/todos", self.config.base_url),
            headers: vec![json_content_type()],
            body: Some(body),
        })
    }

    pub fn build_update_todo(
        &self,
        input: &UpdateTodo,
        expected_version: &str,
    ) -> Result<HttpRequest, ApiError> {
        if let Some(title) = &input.title {
            self.validate_title(title)?;
        }
        let body = to_json(input)?;
        Ok(HttpRequest {
            method: HttpMethod::Put,
            path: self.todo_path(&input.id),
            headers: vec![json_content_type(), if_match(expected_version)],
            body: Some(body),
        })
    }

    pub fn build_delete_todo(&self, input: &DeleteTodo, expected_version: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: self.todo_path(&input.id),
            headers: vec![if_match(expected_version)],
            body: None,
        }
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<Page<Todo>, ApiError> {
        check_status(&response, 200)?;
        from_json(&response.body)
    }

    pub fn parse_get_todo(&self, response: HttpResponse) -> Result<Versioned<Todo>, ApiError> {
        check_status(&response, 200)?;
        versioned(&response)
    }

    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<Versioned<Todo>, ApiError> {
        check_status(&response, 201)?;
        versioned(&response)
    }

    pub fn parse_update_todo(&self, response: HttpResponse) -> Result<Versioned<Todo>, ApiError> {
        check_status(&response, 200)?;
        versioned(&response)
    }

    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 204)?;
        Ok(())
    }

    fn todo_path(&self, id: &str) -> String {
        format!("{}/todos/{id}", self.config.base_url)
    }
}

fn json_content_type() -> (String, String) {
    ("content-type".to_string(), "application/json".to_string())
}

fn if_match(version: &str) -> (String, String) {
    (IF_MATCH.to_string(), version.to_string())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string(value).map_err(|e| ApiError::Serialization(e.to_string()))
}

fn from_json<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Parse the body and pair it with the `etag` header.
fn versioned(response: &HttpResponse) -> Result<Versioned<Todo>, ApiError> {
    let etag = response.header(ETAG).ok_or(ApiError::MissingVersion)?;
    Ok(Versioned {
        data: from_json(&response.body)?,
        etag: etag.to_string(),
    })
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }
    match serde_json::from_str::<ApiErrorResponse>(&response.body) {
        Ok(body) => Err(ApiError::Api(body)),
        Err(_) => Err(ApiError::Http {
            status: response.status,
            body: response.body.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TODO_JSON: &str = r#"{"id":"abc","title":"Test","completed":false,"createdAt":"2024-05-01T10:00:00Z","updatedAt":"2024-05-01T10:00:00Z"}"#;

    fn client() -> TodoClient {
        TodoClient::new("http://localhost:3000/api")
    }

    fn response(status: u16, etag: Option<&str>, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: etag
                .map(|tag| vec![("etag".to_string(), tag.to_string())])
                .unwrap_or_default(),
            body: body.to_string(),
        }
    }

    #[test]
    fn build_list_todos_carries_page_and_size() {
        let req = client().build_list_todos(2, 10);
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:3000/api/todos?page=2&size=10");
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn build_create_todo_trims_title() {
        let input = CreateTodo {
            title: "  Buy milk ".to_string(),
        };
        let req = client().build_create_todo(&input).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:3000/api/todos");
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["title"], "Buy milk");
    }

    #[test]
    fn build_create_todo_rejects_blank_title() {
        let input = CreateTodo {
            title: "  ".to_string(),
        };
        let err = client().build_create_todo(&input).unwrap_err();
        assert!(matches!(err, ApiError::Validation(ref m) if m == MSG_TITLE_REQUIRED));
    }

    #[test]
    fn build_create_todo_rejects_long_title() {
        let input = CreateTodo {
            title: "x".repeat(101),
        };
        let err = client().build_create_todo(&input).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let input = CreateTodo {
            title: "x".repeat(100),
        };
        assert!(client().build_create_todo(&input).is_ok());
    }

    #[test]
    fn title_length_counts_characters() {
        let title = "é".repeat(100);
        assert!(client().validate_title(&title).is_ok());
    }

    #[test]
    fn build_update_todo_sends_if_match() {
        let input = UpdateTodo {
            id: "abc".to_string(),
            title: None,
            completed: Some(true),
        };
        let req = client().build_update_todo(&input, "\"v1\"").unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.path, "http://localhost:3000/api/todos/abc");
        assert_eq!(req.header("if-match"), Some("\"v1\""));
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["completed"], true);
        assert!(body.get("title").is_none());
    }

    #[test]
    fn build_delete_todo_sends_if_match_without_body() {
        let req = client().build_delete_todo(
            &DeleteTodo {
                id: "abc".to_string(),
            },
            "\"v3\"",
        );
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.header(IF_MATCH), Some("\"v3\""));
        assert!(req.body.is_none());
    }

    #[test]
    fn parse_get_todo_reads_etag() {
        let todo = client()
            .parse_get_todo(response(200, Some("\"v1\""), TODO_JSON))
            .unwrap();
        assert_eq!(todo.etag, "\"v1\"");
        assert_eq!(todo.data.title, "Test");
    }

    #[test]
    fn parse_get_todo_without_etag_fails() {
        let err = client()
            .parse_get_todo(response(200, None, TODO_JSON))
            .unwrap_err();
        assert!(matches!(err, ApiError::MissingVersion));
    }

    #[test]
    fn structured_error_body_is_kept() {
        let body = r#"{"status":412,"errorCode":"SYS-412-ETAG","title":"Precondition Failed","detail":"version moved"}"#;
        let err = client()
            .parse_update_todo(response(412, None, body))
            .unwrap_err();
        assert!(err.is_version_conflict());
    }

    #[test]
    fn unstructured_error_body_is_raw() {
        let err = client()
            .parse_create_todo(response(500, None, "internal error"))
            .unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 500, .. }));
    }

    #[test]
    fn parse_list_todos_bad_json() {
        let err = client()
            .parse_list_todos(response(200, None, "not json"))
            .unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }

    #[test]
    fn parse_delete_todo_success() {
        assert!(client().parse_delete_todo(response(204, None, "")).is_ok());
    }
}
