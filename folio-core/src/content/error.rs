//! Content API error types

use http::StatusCode;
use serde::Deserialize;

/// Error code the content service uses when a caller may not see an item.
/// Reads by primary key answer with it for items that do not exist, so the
/// service does not leak which keys are taken.
pub const FORBIDDEN_CODE: &str = "FORBIDDEN";

/// Error code for an unknown route or collection
pub const ROUTE_NOT_FOUND_CODE: &str = "ROUTE_NOT_FOUND";

/// Failure to move bytes between Folio and the content service
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    /// Could not reach the service (DNS, connect, TLS, reset)
    #[error("connection failed: {0}")]
    Connect(String),
    /// The request could not be built
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// Reading the response body failed
    #[error("failed to read response body: {0}")]
    Body(String),
}

/// Errors returned by [`ContentClient`](super::ContentClient) reads
#[derive(Debug, Clone, thiserror::Error)]
pub enum ContentError {
    /// The service answered a primary-key read with "no such item"
    #[error("{collection}/{key} not found")]
    NotFound { collection: String, key: String },

    /// The service answered with a non-success status
    #[error("content service returned {status}: {message}")]
    Status { status: StatusCode, code: Option<String>, message: String },

    /// The request never got a response
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The response body did not match the expected shape
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The configured endpoint cannot carry a path
    #[error("invalid content endpoint: {0}")]
    InvalidEndpoint(String),
}

impl ContentError {
    /// True when the error means the requested item is absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, ContentError::NotFound { .. })
    }
}

/// Error body shape: `{"errors":[{"message":..,"extensions":{"code":..}}]}`
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub errors: Vec<ErrorEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEntry {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub extensions: Option<ErrorExtensions>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorExtensions {
    #[serde(default)]
    pub code: Option<String>,
}

impl ErrorBody {
    /// First error's code and message, falling back to the status text
    pub(crate) fn parse(status: StatusCode, body: &[u8]) -> (Option<String>, String) {
        let parsed: ErrorBody = serde_json::from_slice(body).unwrap_or_default();
        match parsed.errors.into_iter().next() {
            Some(entry) => {
                let code = entry.extensions.and_then(|e| e.code);
                (code, entry.message)
            }
            None => (None, status.canonical_reason().unwrap_or("unknown error").to_string()),
        }
    }
}

/// Classify a failed response.
///
/// For a primary-key read, 404 and 403/`FORBIDDEN` mean the item is absent.
/// Everything else, including 403 on list reads (a misconfigured public
/// role), is a service fault.
pub(crate) fn classify_status(
    status: StatusCode,
    body: &[u8],
    by_key: Option<(&str, &str)>,
) -> ContentError {
    let (code, message) = ErrorBody::parse(status, body);

    if let Some((collection, key)) = by_key {
        let absent = status == StatusCode::NOT_FOUND
            || (status == StatusCode::FORBIDDEN && code.as_deref() == Some(FORBIDDEN_CODE));
        if absent {
            return ContentError::NotFound { collection: collection.to_string(), key: key.to_string() };
        }
    }

    ContentError::Status { status, code, message }
}
