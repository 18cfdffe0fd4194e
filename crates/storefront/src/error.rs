//! Coordinator error type.

use thiserror::Error;

use crate::api::ApiError;
use crate::auth::AuthError;
use crate::config::ConfigError;
use crate::session::SessionError;

/// Errors surfaced by [`crate::app::App`].
#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("session error: {0}")]
    Session(#[from] SessionError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl AppError {
    /// Text to show a person.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(e) => e.user_message(),
            Self::Auth(e) => e.user_message(),
            Self::Config(_) | Self::Session(_) => crate::messages::GENERIC_FAILURE.to_string(),
        }
    }
}
