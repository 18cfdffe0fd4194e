//! Integration tests for the REST client.
//!
//! Run with: cargo test -p kkomi-integration-tests --test api_client

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use kkomi_core::{Page, Product};
use kkomi_integration_tests::{MockBackend, fixtures};
use kkomi_storefront::api::{ApiClient, ApiError, UploadMethod};
use kkomi_storefront::catalog;
use kkomi_storefront::session::{MemoryStorage, SessionStore};
use kkomi_storefront::messages;
use reqwest::multipart::Form;
use secrecy::SecretString;
use serde_json::{Value, json};

fn client(backend: &MockBackend) -> (ApiClient, SessionStore) {
    let session = SessionStore::open(Arc::new(MemoryStorage::new())).unwrap();
    let api = ApiClient::new(&backend.config(), session.clone()).unwrap();
    (api, session)
}

fn sign_in(session: &SessionStore) {
    let user = serde_json::from_value(fixtures::user(1, "customer")).unwrap();
    session.login(user, SecretString::from("tok-abc")).unwrap();
}

// ============================================================================
// Headers
// ============================================================================

#[tokio::test]
async fn test_bearer_only_when_signed_in() {
    let backend = MockBackend::start().await;
    backend.respond(Method::GET, "products", StatusCode::OK, fixtures::page(vec![]));
    let (api, session) = client(&backend);

    api.get::<Value>("products").await.unwrap();
    sign_in(&session);
    api.get::<Value>("products").await.unwrap();

    let requests = backend.requests_to(&Method::GET, "products");
    assert_eq!(requests.len(), 2);
    assert_eq!(requests.first().unwrap().authorization, None);
    assert_eq!(
        requests.last().unwrap().authorization.as_deref(),
        Some("Bearer tok-abc")
    );
}

#[tokio::test]
async fn test_json_body_is_sent() {
    let backend = MockBackend::start().await;
    backend.respond(Method::POST, "checkout", StatusCode::CREATED, json!({}));
    let (api, _) = client(&backend);

    api.post::<_, Value>("checkout", &json!({ "a": 1 }))
        .await
        .unwrap();

    let request = backend.requests_to(&Method::POST, "checkout").pop().unwrap();
    assert_eq!(request.json(), Some(json!({ "a": 1 })));
    assert!(
        request
            .content_type
            .as_deref()
            .unwrap()
            .starts_with("application/json")
    );
}

// ============================================================================
// Responses
// ============================================================================

#[tokio::test]
async fn test_no_content_is_none() {
    let backend = MockBackend::start().await;
    backend.respond_empty(Method::DELETE, "products/4", StatusCode::NO_CONTENT);
    backend.respond_empty(Method::POST, "auth/logout", StatusCode::OK);
    let (api, _) = client(&backend);

    assert!(api.delete::<Value>("products/4").await.unwrap().is_none());
    assert!(
        api.post::<_, Value>("auth/logout", &json!({}))
            .await
            .unwrap()
            .is_none()
    );
    let err = api
        .fetch::<Value>(Method::DELETE, "products/4", None)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::EmptyBody));
}

#[tokio::test]
async fn test_validation_failure_is_flattened() {
    let backend = MockBackend::start().await;
    backend.respond(
        Method::POST,
        "auth/register",
        StatusCode::UNPROCESSABLE_ENTITY,
        json!({
            "message": "The given data was invalid.",
            "errors": {
                "email": ["Email sudah terdaftar."],
                "password": ["Password minimal 8 karakter."]
            }
        }),
    );
    let (api, _) = client(&backend);

    let err = api
        .post::<_, Value>("auth/register", &json!({}))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(StatusCode::UNPROCESSABLE_ENTITY));
    assert_eq!(
        err.user_message(),
        "Email sudah terdaftar. Password minimal 8 karakter."
    );
}

#[tokio::test]
async fn test_general_failure_message_is_verbatim() {
    let backend = MockBackend::start().await;
    backend.respond(
        Method::POST,
        "checkout",
        StatusCode::BAD_REQUEST,
        json!({ "message": "Stok tidak mencukupi" }),
    );
    backend.respond_empty(Method::GET, "orders/report", StatusCode::INTERNAL_SERVER_ERROR);
    let (api, _) = client(&backend);

    let err = api.post::<_, Value>("checkout", &json!({})).await.unwrap_err();
    assert_eq!(err.user_message(), "Stok tidak mencukupi");

    let err = api.get::<Value>("orders/report").await.unwrap_err();
    assert_eq!(err.user_message(), messages::GENERIC_FAILURE);
}

#[tokio::test]
async fn test_undecodable_body() {
    let backend = MockBackend::start().await;
    backend.respond(Method::GET, "products", StatusCode::OK, json!({ "data": "nope" }));
    let (api, _) = client(&backend);

    let err = api.get::<Page<Product>>("products").await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

// ============================================================================
// Expiry
// ============================================================================

#[tokio::test]
async fn test_unauthorized_with_token_raises_expiry() {
    let backend = MockBackend::start().await;
    backend.respond(
        Method::GET,
        "orders/report",
        StatusCode::UNAUTHORIZED,
        json!({ "message": "Unauthenticated." }),
    );
    let (api, session) = client(&backend);
    let mut expired = session.subscribe_expired();

    api.get::<Value>("orders/report").await.unwrap_err();
    assert!(expired.try_recv().is_err(), "no token, no expiry");

    sign_in(&session);
    let err = api.get::<Value>("orders/report").await.unwrap_err();
    assert!(err.is_unauthorized());
    assert!(expired.try_recv().is_ok());
}

// ============================================================================
// Uploads and queries
// ============================================================================

#[tokio::test]
async fn test_put_upload_is_post_with_method_field() {
    let backend = MockBackend::start().await;
    backend.respond(
        Method::POST,
        "products/4",
        StatusCode::OK,
        fixtures::product(4, "Fresh Bread", "15000.00", 12),
    );
    let (api, _) = client(&backend);

    let form = Form::new().text("name", "Fresh Bread");
    let saved: Option<Product> = api
        .upload(UploadMethod::Put, "products/4", form)
        .await
        .unwrap();

    assert_eq!(saved.unwrap().name, "Fresh Bread");
    let request = backend.requests_to(&Method::POST, "products/4").pop().unwrap();
    assert!(request.is_multipart());
    assert_eq!(request.form_field("_method").as_deref(), Some("PUT"));
    assert_eq!(request.form_field("name").as_deref(), Some("Fresh Bread"));
}

#[tokio::test]
async fn test_search_query_is_encoded() {
    let backend = MockBackend::start().await;
    backend.respond(
        Method::GET,
        "products",
        StatusCode::OK,
        fixtures::page(vec![fixtures::product(1, "Melon Juice", "20000.00", 5)]),
    );
    let (api, _) = client(&backend);

    let page = catalog::fetch_products(&api, Some("melon juice"), Some(2))
        .await
        .unwrap();
    catalog::fetch_products(&api, Some("   "), None).await.unwrap();

    assert_eq!(page.data.len(), 1);
    let requests = backend.requests_to(&Method::GET, "products");
    assert_eq!(
        requests.first().unwrap().query.as_deref(),
        Some("search=melon+juice&page=2")
    );
    assert_eq!(requests.last().unwrap().query, None);
}
