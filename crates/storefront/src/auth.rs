//! Authentication endpoints.

use kkomi_core::User;
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::api::{ApiClient, ApiError};
use crate::messages;

/// Which form the signed-out screen shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthView {
    #[default]
    Login,
    Register,
}

/// Errors from login and registration.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Password and confirmation differ; nothing was sent.
    #[error("password and confirmation do not match")]
    PasswordMismatch,

    /// The backend rejected the request.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl AuthError {
    /// Text to show a person.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::PasswordMismatch => messages::PASSWORD_MISMATCH.to_string(),
            Self::Api(e) => e.user_message(),
        }
    }
}

/// A successful login: the user and their bearer token.
#[derive(Debug)]
pub struct LoginResponse {
    pub user: User,
    pub access_token: SecretString,
}

#[derive(Deserialize)]
struct RawLoginResponse {
    user: User,
    access_token: String,
}

/// Registration form contents.
#[derive(Debug)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: SecretString,
    pub password_confirmation: SecretString,
}

impl Registration {
    /// Whether the password was typed the same way twice.
    #[must_use]
    pub fn passwords_match(&self) -> bool {
        self.password.expose_secret() == self.password_confirmation.expose_secret()
    }
}

/// `POST /auth/login`.
///
/// # Errors
///
/// Returns the API error unchanged; a missing body or a blank token is
/// [`ApiError::EmptyBody`].
#[instrument(skip(api, password))]
pub async fn login(
    api: &ApiClient,
    email: &str,
    password: &SecretString,
) -> Result<LoginResponse, ApiError> {
    let body = serde_json::json!({
        "email": email.trim(),
        "password": password.expose_secret(),
    });
    let raw: RawLoginResponse = api.fetch(Method::POST, "auth/login", Some(&body)).await?;
    if raw.access_token.trim().is_empty() {
        warn!(user_id = %raw.user.id, "Login response carried no token");
        return Err(ApiError::EmptyBody);
    }

    info!(user_id = %raw.user.id, role = %raw.user.role, "Logged in");
    Ok(LoginResponse {
        user: raw.user,
        access_token: SecretString::from(raw.access_token),
    })
}

/// `POST /auth/register`.
///
/// The confirmation is checked locally first; a mismatch never reaches the
/// backend.
///
/// # Errors
///
/// Returns [`AuthError::PasswordMismatch`] or the API error.
#[instrument(skip(api, registration), fields(email = %registration.email))]
pub async fn register(api: &ApiClient, registration: &Registration) -> Result<(), AuthError> {
    if !registration.passwords_match() {
        return Err(AuthError::PasswordMismatch);
    }

    let body = serde_json::json!({
        "name": registration.name.trim(),
        "email": registration.email.trim(),
        "password": registration.password.expose_secret(),
        "password_confirmation": registration.password_confirmation.expose_secret(),
    });
    api.request::<serde_json::Value>(Method::POST, "auth/register", Some(&body))
        .await?;

    info!("Registered");
    Ok(())
}

/// `POST /auth/logout`, invalidating the current token on the backend.
///
/// # Errors
///
/// Returns the API error unchanged.
#[instrument(skip(api))]
pub async fn logout(api: &ApiClient) -> Result<(), ApiError> {
    api.request::<serde_json::Value>(Method::POST, "auth/logout", None)
        .await
        .map(|_| ())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::ClientConfig;
    use crate::session::{MemoryStorage, SessionStore};

    fn registration(password: &str, confirmation: &str) -> Registration {
        Registration {
            name: "Siti".to_string(),
            email: "siti@kkomi.id".to_string(),
            password: SecretString::from(password),
            password_confirmation: SecretString::from(confirmation),
        }
    }

    #[test]
    fn test_login_response_shape() {
        let raw: RawLoginResponse = serde_json::from_str(
            r#"{"user":{"id":1,"name":"Admin","email":"admin@kkomi.id","role":"admin"},"access_token":"1|abc"}"#,
        )
        .unwrap();
        assert!(raw.user.is_admin());
        assert_eq!(raw.access_token, "1|abc");
    }

    #[tokio::test]
    async fn test_register_mismatch_never_sends() {
        // Unroutable base: any request would fail with a transport error.
        let config = ClientConfig::for_base_url("http://127.0.0.1:1/api").unwrap();
        let session = SessionStore::open(Arc::new(MemoryStorage::new())).unwrap();
        let api = ApiClient::new(&config, session).unwrap();

        let err = register(&api, &registration("rahasia1", "rahasia2"))
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::PasswordMismatch));
        assert_eq!(err.user_message(), messages::PASSWORD_MISMATCH);
    }
}
