//! Integration tests for Kkomi.
//!
//! [`MockBackend`] is an in-process axum server that stands in for the REST
//! backend. Tests script a response per route, drive the real client
//! against it, then inspect what was sent.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p kkomi-integration-tests
//! ```
//!
//! Unscripted routes answer `404 {"message": "Not Found"}`.

#![allow(clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderName, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use kkomi_storefront::ClientConfig;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Every route is mounted under this prefix.
pub const API_PREFIX: &str = "/api";

// ============================================================================
// Recorded requests
// ============================================================================

/// A request the backend received.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl Recorded {
    /// The body as JSON, if it is JSON.
    #[must_use]
    pub fn json(&self) -> Option<Value> {
        serde_json::from_slice(&self.body).ok()
    }

    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Whether the body is `multipart/form-data`.
    #[must_use]
    pub fn is_multipart(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|c| c.starts_with("multipart/form-data"))
    }

    /// Value of a multipart text field.
    #[must_use]
    pub fn form_field(&self, name: &str) -> Option<String> {
        let marker = format!("name=\"{name}\"\r\n\r\n");
        let text = self.body_text();
        let start = text.find(&marker)? + marker.len();
        let rest = text.get(start..)?;
        let end = rest.find("\r\n")?;
        rest.get(..end).map(str::to_owned)
    }

    /// Whether the multipart body carries a file part called `name`.
    #[must_use]
    pub fn has_file(&self, name: &str) -> bool {
        self.body_text()
            .contains(&format!("name=\"{name}\"; filename="))
    }
}

// ============================================================================
// Mock backend
// ============================================================================

#[derive(Debug, Clone)]
struct Canned {
    status: StatusCode,
    body: Option<Value>,
}

#[derive(Debug, Default)]
struct Inner {
    routes: HashMap<(Method, String), Canned>,
    requests: Vec<Recorded>,
}

type Shared = Arc<Mutex<Inner>>;

fn lock(inner: &Shared) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-process stand-in for the REST backend.
pub struct MockBackend {
    addr: SocketAddr,
    inner: Shared,
    server: JoinHandle<()>,
}

impl MockBackend {
    /// Start on an ephemeral local port.
    pub async fn start() -> Self {
        let inner = Shared::default();
        let app = Router::new()
            .fallback(handle)
            .with_state(Arc::clone(&inner));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock backend");
        let addr = listener
            .local_addr()
            .expect("Failed to read mock backend address");
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            inner,
            server,
        }
    }

    /// Base URL the client should use, e.g. `http://127.0.0.1:5123/api`.
    #[must_use]
    pub fn api_base(&self) -> String {
        format!("http://{}{API_PREFIX}", self.addr)
    }

    /// Client configuration pointed at this backend.
    #[must_use]
    pub fn config(&self) -> ClientConfig {
        ClientConfig::for_base_url(&self.api_base()).expect("Mock backend URL is valid")
    }

    /// Answer `method path` with `status` and a JSON body. `path` is relative
    /// to [`API_PREFIX`].
    pub fn respond(&self, method: Method, path: &str, status: StatusCode, body: Value) {
        self.script(method, path, status, Some(body));
    }

    /// Answer `method path` with `status` and no body.
    pub fn respond_empty(&self, method: Method, path: &str, status: StatusCode) {
        self.script(method, path, status, None);
    }

    fn script(&self, method: Method, path: &str, status: StatusCode, body: Option<Value>) {
        let path = format!("{API_PREFIX}/{}", path.trim_start_matches('/'));
        lock(&self.inner)
            .routes
            .insert((method, path), Canned { status, body });
    }

    /// Everything received so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<Recorded> {
        lock(&self.inner).requests.clone()
    }

    /// Requests to one route. `path` is relative to [`API_PREFIX`].
    #[must_use]
    pub fn requests_to(&self, method: &Method, path: &str) -> Vec<Recorded> {
        let path = format!("{API_PREFIX}/{}", path.trim_start_matches('/'));
        lock(&self.inner)
            .requests
            .iter()
            .filter(|r| r.method == *method && r.path == path)
            .cloned()
            .collect()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn handle(
    State(inner): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header_value = |name: HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
    };
    let recorded = Recorded {
        method: method.clone(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_owned),
        authorization: header_value(header::AUTHORIZATION),
        content_type: header_value(header::CONTENT_TYPE),
        body,
    };

    let canned = {
        let mut inner = lock(&inner);
        let canned = inner.routes.get(&(method, recorded.path.clone())).cloned();
        inner.requests.push(recorded);
        canned
    };

    match canned {
        Some(Canned {
            status,
            body: Some(body),
        }) => (status, Json(body)).into_response(),
        Some(Canned { status, body: None }) => status.into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({ "message": "Not Found" }))).into_response(),
    }
}

// ============================================================================
// Fixtures
// ============================================================================

/// JSON payloads shaped like the backend's.
pub mod fixtures {
    use serde_json::{Value, json};

    #[must_use]
    pub fn user(id: i64, role: &str) -> Value {
        json!({
            "id": id,
            "name": if role == "admin" { "Admin Kkomi" } else { "Siti" },
            "email": if role == "admin" { "admin@kkomi.id" } else { "siti@kkomi.id" },
            "role": role,
        })
    }

    #[must_use]
    pub fn login(role: &str) -> Value {
        json!({ "user": user(1, role), "access_token": "tok-abc" })
    }

    #[must_use]
    pub fn product(id: i64, name: &str, price: &str, stock: u32) -> Value {
        json!({
            "id": id,
            "name": name,
            "description": null,
            "price": price,
            "stock": stock,
            "image_url": format!("/storage/products/{id}.jpg"),
        })
    }

    #[must_use]
    pub fn page(data: Vec<Value>) -> Value {
        let total = data.len();
        json!({ "data": data, "current_page": 1, "last_page": 1, "total": total })
    }

    #[must_use]
    pub fn order(id: i64, status: &str) -> Value {
        json!({
            "id": id,
            "user_id": 2,
            "total_amount": "45000.00",
            "status": status,
            "payment_method": "cash",
            "created_at": "2025-03-01T08:00:00.000000Z",
            "user": { "id": 2, "name": "Siti", "email": "siti@kkomi.id" },
            "details": [
                { "id": 1, "order_id": id, "product_id": 1, "quantity": 2, "price": "20000.00",
                  "product": { "id": 1, "name": "Melon Juice", "image_url": "/storage/products/1.jpg" } },
                { "id": 2, "order_id": id, "product_id": 4, "quantity": 1, "price": "5000.00",
                  "product": { "id": 4, "name": "Cucumber" } }
            ]
        })
    }

    #[must_use]
    pub fn validation(field: &str, message: &str) -> Value {
        json!({ "message": "The given data was invalid.", "errors": { field: [message] } })
    }
}
