//! Turns a raw `ApiError` into something a user can be shown.
//!
//! # Design
//! The resource client reports failures as-is; this module is the only place
//! that decides what they mean. The `errorCode` table is closed: an unknown
//! code degrades to the caller's fallback message instead of failing, and is
//! logged at error level so it shows up when the API grows a new code.

use tracing::{error, warn};

use crate::error::{codes, ApiError, ApiErrorResponse};

pub const MSG_CONNECTIVITY: &str = "could not connect to the server";
pub const MSG_VALIDATION: &str = "please check your input";
pub const MSG_NOT_FOUND: &str = "the todo was not found";
pub const MSG_VERSION_CONFLICT: &str = "the data was modified elsewhere";
pub const MSG_SERVER_FAULT: &str = "an unexpected error occurred on the server";

/// How loudly a classified failure is logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warn,
    Error,
}

/// What kind of failure occurred, and therefore how it is recovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input, detected locally or by the server.
    Validation,
    NotFound,
    /// The `If-Match` precondition failed: someone else wrote first.
    VersionConflict,
    /// No response from the server.
    Connectivity,
    ServerFault,
    /// An error response the table does not know about.
    Unrecognized,
    /// A client-side inconsistency. Local state can no longer be trusted.
    Unexpected,
}

impl ErrorKind {
    /// Whether the failure must take the whole view to the error screen
    /// instead of being shown inline.
    pub fn escalates(self) -> bool {
        matches!(self, ErrorKind::Unexpected)
    }

    /// Failures the user can act on are warnings; the rest are errors.
    pub fn severity(self) -> Severity {
        match self {
            ErrorKind::Validation | ErrorKind::NotFound | ErrorKind::VersionConflict => {
                Severity::Warn
            }
            ErrorKind::Connectivity
            | ErrorKind::ServerFault
            | ErrorKind::Unrecognized
            | ErrorKind::Unexpected => Severity::Error,
        }
    }
}

/// A failure ready to be displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    pub kind: ErrorKind,
    pub severity: Severity,
    pub message: String,
}

impl Classified {
    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: kind.severity(),
            message: message.into(),
        }
    }
}

/// Classify `err`, falling back to `fallback` when it cannot be identified.
///
/// Returns `None` for a cancelled operation: that is not a failure and must
/// not be shown or logged.
pub fn classify(err: &ApiError, fallback: &str) -> Option<Classified> {
    let classified = match err {
        ApiError::Cancelled => return None,
        ApiError::Transport(reason) => {
            error!(%reason, "[API Error] no response received from server");
            Classified::new(ErrorKind::Connectivity, MSG_CONNECTIVITY)
        }
        ApiError::Http { status, body } => {
            error!(status, %body, "[API Error] unexpected API response format");
            Classified::new(ErrorKind::Unrecognized, fallback)
        }
        ApiError::Api(body) => classify_body(body, fallback),
        ApiError::Validation(message) => {
            warn!(%message, "[Validation] request rejected locally");
            Classified::new(ErrorKind::Validation, message.as_str())
        }
        ApiError::MissingVersion | ApiError::Deserialization(_) | ApiError::Serialization(_) => {
            error!(error = %err, "[API Error] unexpected error occurred");
            Classified::new(ErrorKind::Unexpected, fallback)
        }
    };
    Some(classified)
}

fn classify_body(body: &ApiErrorResponse, fallback: &str) -> Classified {
    let code = body.error_code.as_str();
    let (kind, message) = match code {
        codes::TODO_BAD_ARGUMENT | codes::VALIDATION => (ErrorKind::Validation, MSG_VALIDATION),
        codes::TODO_NOT_FOUND => (ErrorKind::NotFound, MSG_NOT_FOUND),
        codes::PRECONDITION_FAILED => (ErrorKind::VersionConflict, MSG_VERSION_CONFLICT),
        codes::INTERNAL_ETAG | codes::INTERNAL => (ErrorKind::ServerFault, MSG_SERVER_FAULT),
        _ => {
            error!(
                code,
                status = body.status,
                title = %body.title,
                detail = %body.detail,
                "[API Error] unhandled errorCode received"
            );
            return Classified::new(ErrorKind::Unrecognized, fallback);
        }
    };
    match kind.severity() {
        Severity::Warn => warn!("[{code}] {}: {}", body.title, body.detail),
        Severity::Error => error!("[{code}] {}: {}", body.title, body.detail),
    }
    Classified::new(kind, message)
}
