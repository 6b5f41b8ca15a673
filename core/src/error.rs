//! Error types for the todo API client.
//!
//! # Design
//! `ApiError` is the raw failure as seen by the resource client. It is never
//! turned into a user-facing message here; that is the job of
//! [`crate::classify`]. A structured error body gets its own variant so the
//! classifier can dispatch on `errorCode`. Any other non-2xx response lands in
//! `Http` with the raw status and body for debugging.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes the API is known to send in `errorCode`.
pub mod codes {
    pub const TODO_BAD_ARGUMENT: &str = "TODO-400-ARG";
    pub const VALIDATION: &str = "SYS-400-VALIDATION";
    pub const TODO_NOT_FOUND: &str = "TODO-404";
    pub const PRECONDITION_FAILED: &str = "SYS-412-ETAG";
    pub const INTERNAL_ETAG: &str = "SYS-500-ETAG";
    pub const INTERNAL: &str = "SYS-500";
}

/// The structured error body the API returns on failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    pub status: u16,
    pub error_code: String,
    pub title: String,
    pub detail: String,
}

/// Errors returned by `TodoClient` parse methods and the `Transport`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The operation was aborted before it completed. Not a failure.
    #[error("request cancelled")]
    Cancelled,

    /// No response was received at all.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The server answered with a structured error body.
    #[error("[{}] {}: {}", .0.error_code, .0.title, .0.detail)]
    Api(ApiErrorResponse),

    /// The server answered with a non-2xx status and an unrecognised body.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The request was rejected locally before any network call.
    #[error("{0}")]
    Validation(String),

    /// A versioned response came back without an `etag` header.
    #[error("response carried no version token")]
    MissingVersion,

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    /// The `errorCode` of a structured error, if this is one.
    pub fn error_code(&self) -> Option<&str> {
        match self {
            ApiError::Api(body) => Some(&body.error_code),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ApiError::Cancelled)
    }

    pub fn is_not_found(&self) -> bool {
        self.error_code() == Some(codes::TODO_NOT_FOUND)
    }

    pub fn is_version_conflict(&self) -> bool {
        self.error_code() == Some(codes::PRECONDITION_FAILED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_body_parses_camel_case() {
        let body: ApiErrorResponse = serde_json::from_str(
            r#"{"status":412,"errorCode":"SYS-412-ETAG","title":"Precondition Failed","detail":"stale"}"#,
        )
        .unwrap();
        assert_eq!(body.error_code, "SYS-412-ETAG");
        assert!(ApiError::Api(body).is_version_conflict());
    }

    #[test]
    fn structured_body_requires_every_field() {
        let parsed: Result<ApiErrorResponse, _> =
            serde_json::from_str(r#"{"status":404,"errorCode":"TODO-404"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn display_includes_code_and_detail() {
        let err = ApiError::Api(ApiErrorResponse {
            status: 404,
            error_code: codes::TODO_NOT_FOUND.to_string(),
            title: "Not Found".to_string(),
            detail: "no todo abc".to_string(),
        });
        assert_eq!(err.to_string(), "[TODO-404] Not Found: no todo abc");
        assert!(err.is_not_found());
        assert!(!err.is_version_conflict());
    }
}
