//! API client errors.

use kkomi_core::ApiFailure;
use reqwest::StatusCode;
use thiserror::Error;

use crate::messages;

/// Errors returned by [`super::ApiClient`].
#[derive(Debug, Error)]
pub enum ApiError {
    /// No response was received (connection refused, DNS, timeout).
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The backend answered with a non-2xx status.
    #[error("backend returned {status}: {}", failure.message().unwrap_or("(no message)"))]
    Status {
        status: StatusCode,
        failure: ApiFailure,
    },

    /// A 2xx body could not be decoded into the expected type.
    #[error("failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),

    /// A request body could not be encoded.
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// The operation needs a body but the backend sent none.
    #[error("response body was empty")]
    EmptyBody,

    /// The endpoint could not be joined onto the base URL.
    #[error("invalid endpoint '{endpoint}': {source}")]
    InvalidEndpoint {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },

    /// A multipart part could not be built.
    #[error("invalid multipart field '{field}': {reason}")]
    Multipart { field: String, reason: String },
}

impl ApiError {
    /// HTTP status, if the backend answered.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The decoded error body, if the backend answered.
    #[must_use]
    pub const fn failure(&self) -> Option<&ApiFailure> {
        match self {
            Self::Status { failure, .. } => Some(failure),
            _ => None,
        }
    }

    /// Whether the backend rejected the credentials.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    /// The server-provided message, or field messages for a validation
    /// failure. `None` when the server said nothing useful.
    #[must_use]
    pub fn server_message(&self) -> Option<String> {
        match self.failure()? {
            failure @ ApiFailure::Validation { .. } => failure
                .flattened()
                .filter(|s| !s.is_empty())
                .or_else(|| failure.message().map(str::to_owned)),
            ApiFailure::General { message } => message.clone(),
        }
    }

    /// Text to show a person.
    ///
    /// Transport failures get the network message, validation failures the
    /// flattened field messages, general failures the server's message.
    /// Everything else falls back to the generic message.
    #[must_use]
    pub fn user_message(&self) -> String {
        self.user_message_or(messages::GENERIC_FAILURE)
    }

    /// Like [`Self::user_message`] with a caller-chosen fallback.
    #[must_use]
    pub fn user_message_or(&self, fallback: &str) -> String {
        match self {
            Self::Transport(_) => messages::NETWORK_FAILURE.to_string(),
            _ => self
                .server_message()
                .unwrap_or_else(|| fallback.to_string()),
        }
    }
}
