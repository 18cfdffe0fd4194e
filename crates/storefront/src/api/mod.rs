//! REST client for the Kkomi backend.
//!
//! # Behavior
//!
//! - Endpoints are joined onto the configured base URL.
//! - Every request sends `Accept: application/json`; the bearer token is
//!   attached whenever the [`SessionStore`] holds one.
//! - A 2xx response is decoded into the requested type; a 204 or an empty
//!   body resolves to `None` without decoding.
//! - A non-2xx response becomes [`ApiError::Status`] carrying the decoded
//!   [`ApiFailure`](kkomi_core::ApiFailure). A 401 on a request that carried
//!   a token also raises the session-expired signal.
//! - Failures are logged with `tracing::error!` and returned. Nothing is
//!   retried.
//!
//! # Example
//!
//! ```rust,ignore
//! use kkomi_storefront::api::ApiClient;
//!
//! let api = ApiClient::new(&config, session.clone())?;
//! let page: Option<Page<Product>> = api.get("products").await?;
//! ```

mod error;

pub use error::ApiError;

use std::sync::Arc;

use kkomi_core::ApiFailure;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::multipart::Form;
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, instrument};
use url::Url;

use crate::config::ClientConfig;
use crate::session::SessionStore;

/// How a multipart upload reaches the backend.
///
/// The backend only parses multipart bodies on POST, so an update is sent as
/// POST with a `_method=PUT` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadMethod {
    /// Create.
    Post,
    /// Update via method override.
    Put,
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the Kkomi REST API.
///
/// Cheap to clone; clones share the connection pool and the session.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: Url,
    session: SessionStore,
}

impl ApiClient {
    /// Create a client for `config.api_base_url` that reads its token from
    /// `session`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &ClientConfig, session: SessionStore) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.http_timeout)
            .build()
            .map_err(ApiError::Transport)?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                base_url: config.api_base_url.clone(),
                session,
            }),
        })
    }

    /// The API base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// The session this client authenticates with.
    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    /// Resolve `endpoint` (optionally carrying a query string) against the
    /// base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidEndpoint`] if the result is not a URL.
    pub fn url(&self, endpoint: &str) -> Result<Url, ApiError> {
        self.inner
            .base_url
            .join(endpoint.trim_start_matches('/'))
            .map_err(|source| ApiError::InvalidEndpoint {
                endpoint: endpoint.to_string(),
                source,
            })
    }

    /// Send a request with an optional JSON body.
    ///
    /// Resolves to `None` when the backend answered 204 or with an empty
    /// body.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-2xx status, or an
    /// undecodable body.
    #[instrument(skip(self, body), fields(%method))]
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<Option<T>, ApiError> {
        let url = self.url(endpoint)?;
        let mut builder = self.inner.http.request(method.clone(), url);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        self.dispatch(&method, endpoint, builder).await
    }

    /// Send a multipart form. The transport sets the content type and
    /// boundary.
    ///
    /// # Errors
    ///
    /// Same as [`Self::request`].
    #[instrument(skip(self, form))]
    pub async fn upload<T: DeserializeOwned>(
        &self,
        method: UploadMethod,
        endpoint: &str,
        form: Form,
    ) -> Result<Option<T>, ApiError> {
        let form = match method {
            UploadMethod::Post => form,
            UploadMethod::Put => form.text("_method", "PUT"),
        };
        let url = self.url(endpoint)?;
        let builder = self.inner.http.post(url).multipart(form);
        self.dispatch(&Method::POST, endpoint, builder).await
    }

    /// `GET endpoint`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::request`].
    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<Option<T>, ApiError> {
        self.request(Method::GET, endpoint, None).await
    }

    /// `POST endpoint` with a JSON body.
    ///
    /// # Errors
    ///
    /// Same as [`Self::request`], plus [`ApiError::Encode`].
    pub async fn post<B, T>(&self, endpoint: &str, body: &B) -> Result<Option<T>, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body).map_err(ApiError::Encode)?;
        self.request(Method::POST, endpoint, Some(&body)).await
    }

    /// `PUT endpoint` with a JSON body.
    ///
    /// # Errors
    ///
    /// Same as [`Self::request`], plus [`ApiError::Encode`].
    pub async fn put<B, T>(&self, endpoint: &str, body: &B) -> Result<Option<T>, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body).map_err(ApiError::Encode)?;
        self.request(Method::PUT, endpoint, Some(&body)).await
    }

    /// `DELETE endpoint`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::request`].
    pub async fn delete<T: DeserializeOwned>(
        &self,
        endpoint: &str,
    ) -> Result<Option<T>, ApiError> {
        self.request(Method::DELETE, endpoint, None).await
    }

    /// Like [`Self::request`] for endpoints that always answer with a body.
    ///
    /// # Errors
    ///
    /// Same as [`Self::request`], plus [`ApiError::EmptyBody`] when the
    /// backend sent nothing.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<T, ApiError> {
        self.request(method, endpoint, body)
            .await?
            .ok_or(ApiError::EmptyBody)
    }

    async fn dispatch<T: DeserializeOwned>(
        &self,
        method: &Method,
        endpoint: &str,
        builder: RequestBuilder,
    ) -> Result<Option<T>, ApiError> {
        let token = self.inner.session.token();
        let builder = match &token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        };

        let response = builder.send().await.map_err(|e| {
            error!(%method, endpoint, error = %e, "API request failed to send");
            ApiError::Transport(e)
        })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            error!(%method, endpoint, %status, error = %e, "Failed to read API response body");
            ApiError::Transport(e)
        })?;

        if status.is_success() {
            if status == StatusCode::NO_CONTENT || body.iter().all(u8::is_ascii_whitespace) {
                debug!(%method, endpoint, %status, "API request returned no content");
                return Ok(None);
            }
            return serde_json::from_slice(&body).map(Some).map_err(|e| {
                error!(
                    %method,
                    endpoint,
                    error = %e,
                    body = %String::from_utf8_lossy(&body).chars().take(500).collect::<String>(),
                    "Failed to decode API response"
                );
                ApiError::Decode(e)
            });
        }

        let failure = ApiFailure::from_body(&body);
        error!(
            %method,
            endpoint,
            status = status.as_u16(),
            message = failure.message().unwrap_or_default(),
            "API returned non-success status"
        );

        if status == StatusCode::UNAUTHORIZED && token.is_some() {
            self.inner.session.raise_expired();
        }

        Err(ApiError::Status { status, failure })
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::session::MemoryStorage;

    fn client(base: &str) -> ApiClient {
        let config = ClientConfig::for_base_url(base).unwrap();
        let session = SessionStore::open(Arc::new(MemoryStorage::new())).unwrap();
        ApiClient::new(&config, session).unwrap()
    }

    #[test]
    fn test_url_joins_under_base_path() {
        let api = client("http://127.0.0.1:8000/api");
        assert_eq!(
            api.url("/products/4").unwrap().as_str(),
            "http://127.0.0.1:8000/api/products/4"
        );
        assert_eq!(
            api.url("auth/login").unwrap().as_str(),
            "http://127.0.0.1:8000/api/auth/login"
        );
    }

    #[test]
    fn test_url_keeps_query() {
        let api = client("http://127.0.0.1:8000/api/");
        let url = api.url("products?search=melon&page=2").unwrap();
        assert_eq!(url.path(), "/api/products");
        assert_eq!(url.query(), Some("search=melon&page=2"));
    }

    #[tokio::test]
    async fn test_transport_failure_is_reported() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let api = client(&format!("http://127.0.0.1:{port}/api"));
        let err = api.get::<serde_json::Value>("products").await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
        assert_eq!(err.user_message(), crate::messages::NETWORK_FAILURE);
    }
}
