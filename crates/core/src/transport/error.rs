use reqwest::StatusCode;
use thiserror::Error;

/// Errors surfaced by the transport and every operation built on it.
///
/// Operations never wrap or summarize these: the value produced by the
/// transport is the value the caller receives.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network-level failure (connection refused, timeout, broken body stream).
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// Server answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// Server answered with a payload of a different shape than the call declared.
    #[error("expected {expected} response, server sent content-type '{content_type}'")]
    UnexpectedContentType {
        expected: &'static str,
        content_type: String,
    },

    /// Response body was declared JSON but could not be parsed.
    #[error("failed to decode JSON body: {0}")]
    Decode(#[from] serde_json::Error),

    /// Request body could not be serialized to JSON. Nothing was sent.
    #[error("failed to encode JSON body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}

impl ApiError {
    /// HTTP status for `Status` errors and for reqwest errors that carry one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status(),
            _ => None,
        }
    }

    pub fn is_connect(&self) -> bool {
        matches!(self, ApiError::Transport(e) if e.is_connect())
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Transport(e) if e.is_timeout())
    }
}

/// Failure relay: log once with the operation's message, hand the error back untouched.
pub(crate) fn relay<T>(context: &'static str, result: Result<T, ApiError>) -> Result<T, ApiError> {
    if let Err(e) = &result {
        tracing::error!("{}: {}", context, e);
    }
    result
}
