//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The core
//! builds `HttpRequest` values and parses `HttpResponse` values; the network
//! round-trip itself happens behind the [`Transport`] trait, which the host
//! implements with whatever HTTP library it already uses.
//!
//! Cancellation is expressed by dropping the future returned from
//! [`Transport::execute`]. Implementations should release the underlying
//! connection when that happens.

use std::future::Future;

use crate::error::ApiError;

/// Header carrying the version token on responses.
pub const ETAG: &str = "etag";

/// Header carrying the expected version token on conditional requests.
pub const IF_MATCH: &str = "If-Match";

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// An HTTP request described as plain data.
///
/// Built by `TodoClient::build_*` methods and handed to a `Transport`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// An HTTP response described as plain data.
///
/// Produced by a `Transport`, then passed to `TodoClient::parse_*` methods
/// for deserialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Executes an `HttpRequest` against the network.
///
/// Non-2xx statuses are not errors at this level: they must come back as an
/// `HttpResponse` so the client can interpret the body. Only a failure to get
/// any response at all is reported, as `ApiError::Transport`.
pub trait Transport {
    fn execute(&self, request: HttpRequest)
        -> impl Future<Output = Result<HttpResponse, ApiError>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_ignores_case() {
        let response = HttpResponse {
            status: 200,
            headers: vec![("ETag".to_string(), "\"v1\"".to_string())],
            body: String::new(),
        };
        assert_eq!(response.header(ETAG), Some("\"v1\""));
        assert_eq!(response.header("content-type"), None);
    }

    #[test]
    fn method_names() {
        assert_eq!(HttpMethod::Put.as_str(), "PUT");
        assert_eq!(HttpMethod::Delete.as_str(), "DELETE");
    }
}
