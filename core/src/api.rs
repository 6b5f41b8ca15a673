//! Async CRUD operations over a [`Transport`].
//!
//! Each call builds the request with [`TodoClient`], hands it to the
//! transport and parses the answer. Failures come back as raw `ApiError`s;
//! classifying them is left to the caller.
//!
//! Reads accept an optional `AbortRegistration`. Aborting its handle drops
//! the in-flight transport future and the call resolves to
//! `ApiError::Cancelled`.

use futures::future::{AbortRegistration, Abortable};
use tracing::debug;

use crate::client::TodoClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, Transport};
use crate::types::{CreateTodo, DeleteTodo, Page, Todo, UpdateTodo, Versioned};

#[derive(Debug, Clone)]
pub struct TodoApi<T> {
    client: TodoClient,
    transport: T,
}

impl<T: Transport> TodoApi<T> {
    pub fn new(config: ClientConfig, transport: T) -> Self {
        Self {
            client: TodoClient::with_config(config),
            transport,
        }
    }

    pub fn client(&self) -> &TodoClient {
        &self.client
    }

    pub fn config(&self) -> &ClientConfig {
        self.client.config()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn fetch_page(
        &self,
        page: u32,
        size: u32,
        abort: Option<AbortRegistration>,
    ) -> Result<Page<Todo>, ApiError> {
        let request = self.client.build_list_todos(page, size);
        let response = self.send(request, abort).await?;
        self.client.parse_list_todos(response)
    }

    pub async fn fetch_one(
        &self,
        id: &str,
        abort: Option<AbortRegistration>,
    ) -> Result<Versioned<Todo>, ApiError> {
        let request = self.client.build_get_todo(id);
        let response = self.send(request, abort).await?;
        self.client.parse_get_todo(response)
    }

    pub async fn create(&self, input: &CreateTodo) -> Result<Versioned<Todo>, ApiError> {
        let request = self.client.build_create_todo(input)?;
        let response = self.send(request, None).await?;
        self.client.parse_create_todo(response)
    }

    /// Apply `input` only if the server still holds `expected_version`.
    pub async fn update(
        &self,
        input: &UpdateTodo,
        expected_version: &str,
    ) -> Result<Versioned<Todo>, ApiError> {
        let request = self.client.build_update_todo(input, expected_version)?;
        let response = self.send(request, None).await?;
        self.client.parse_update_todo(response)
    }

    /// Delete only if the server still holds `expected_version`.
    pub async fn delete(
        &self,
        input: &DeleteTodo,
        expected_version: &str,
    ) -> Result<bool, ApiError> {
        let request = self.client.build_delete_todo(input, expected_version);
        let response = self.send(request, None).await?;
        self.client.parse_delete_todo(response)?;
        Ok(true)
    }

    async fn send(
        &self,
        request: HttpRequest,
        abort: Option<AbortRegistration>,
    ) -> Result<HttpResponse, ApiError> {
        debug!(
            method = request.method.as_str(),
            path = %request.path,
            "sending request"
        );
        let response = match abort {
            Some(registration) => Abortable::new(self.transport.execute(request), registration)
                .await
                .map_err(|_| ApiError::Cancelled)??,
            None => self.transport.execute(request).await?,
        };
        debug!(status = response.status, "received response");
        Ok(response)
    }
}
