//! Admin error type.

use std::path::PathBuf;

use kkomi_storefront::api::ApiError;
use kkomi_storefront::messages;
use thiserror::Error;

use crate::products::FormErrors;

/// Errors from admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// The product form did not validate; nothing was sent.
    #[error("invalid product form: {0}")]
    Invalid(FormErrors),

    /// The backend rejected the request.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// An image file could not be read.
    #[error("failed to read image {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AdminError {
    /// Text to show a person, with `fallback` for failures the server did
    /// not explain.
    #[must_use]
    pub fn user_message_or(&self, fallback: &str) -> String {
        match self {
            Self::Invalid(errors) => errors.flattened(),
            Self::Api(e) => e.user_message_or(fallback),
            Self::Image { .. } => fallback.to_string(),
        }
    }

    /// Text to show a person.
    #[must_use]
    pub fn user_message(&self) -> String {
        self.user_message_or(messages::GENERIC_FAILURE)
    }
}
