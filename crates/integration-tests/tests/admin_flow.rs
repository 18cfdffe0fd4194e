//! Integration tests for the admin panel.
//!
//! Run with: cargo test -p kkomi-integration-tests --test admin_flow

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use kkomi_admin::{AdminPanel, DeleteOutcome, ImageUpload, Listing, StatusBadge, SubmitOutcome};
use kkomi_core::{OrderId, Product, ProductId};
use kkomi_integration_tests::{MockBackend, fixtures};
use kkomi_storefront::api::ApiClient;
use kkomi_storefront::session::{MemoryStorage, SessionStore};
use kkomi_storefront::{messages, notice::NoticeKind};
use secrecy::SecretString;
use serde_json::json;

fn admin_panel(backend: &MockBackend) -> AdminPanel {
    let session = SessionStore::open(Arc::new(MemoryStorage::new())).unwrap();
    let user = serde_json::from_value(fixtures::user(1, "admin")).unwrap();
    session.login(user, SecretString::from("tok-admin")).unwrap();
    let api = ApiClient::new(&backend.config(), session).unwrap();
    AdminPanel::new(api, "http://127.0.0.1:8000")
}

fn script_listings(backend: &MockBackend) {
    backend.respond(
        Method::GET,
        "products",
        StatusCode::OK,
        fixtures::page(vec![
            fixtures::product(1, "Melon Juice", "20000.00", 5),
            fixtures::product(4, "Fresh Bread", "15000.00", 12),
        ]),
    );
    backend.respond(
        Method::GET,
        "orders/report",
        StatusCode::OK,
        fixtures::page(vec![fixtures::order(3, "completed"), fixtures::order(9, "pending")]),
    );
    backend.respond(
        Method::GET,
        "dashboard/stats",
        StatusCode::OK,
        json!({
            "summary": { "total_revenue": "50000000", "total_orders": 290, "items_sold": 1520,
                         "total_products": 2, "total_stock": 17 },
            "monthly_sales": [{ "month": "2025-03", "total": "4500000" }],
            "best_sellers": [{ "product_id": 1, "name": "Melon Juice", "total_sold": 300 }],
            "stock_levels": [{ "name": "Melon Juice", "stock": 5 }, { "name": "Fresh Bread", "stock": 12 }]
        }),
    );
}

fn listed(panel: &AdminPanel, id: i64) -> Product {
    panel
        .products()
        .loaded()
        .unwrap()
        .data
        .iter()
        .find(|p| p.id == ProductId::new(id))
        .cloned()
        .unwrap()
}

#[tokio::test]
async fn test_mount_loads_every_listing() {
    let backend = MockBackend::start().await;
    script_listings(&backend);
    let mut panel = admin_panel(&backend);

    panel.mount().await;

    assert_eq!(panel.products().loaded().unwrap().data.len(), 2);
    let stats = panel.stats().loaded().unwrap();
    assert_eq!(stats.summary.total_orders, 290);
    assert_eq!(stats.low_stock(10).len(), 1);

    panel.select_order(OrderId::new(3));
    let detail = panel.order_detail().unwrap();
    assert_eq!(detail.badge, StatusBadge::Success);
    assert_eq!(detail.date.as_deref(), Some("1 Maret 2025"));
    assert_eq!(
        detail.lines.first().unwrap().image_src,
        "http://127.0.0.1:8000/storage/products/1.jpg"
    );

    for request in backend.requests() {
        assert_eq!(request.authorization.as_deref(), Some("Bearer tok-admin"));
    }
}

#[tokio::test]
async fn test_one_failed_listing_does_not_block_the_others() {
    let backend = MockBackend::start().await;
    script_listings(&backend);
    backend.respond_empty(Method::GET, "orders/report", StatusCode::INTERNAL_SERVER_ERROR);
    let mut panel = admin_panel(&backend);

    panel.mount().await;

    assert!(matches!(panel.products(), Listing::Loaded(_)));
    assert_eq!(panel.orders().error(), Some(messages::ORDERS_LOAD_FAILED));
    assert!(matches!(panel.stats(), Listing::Loaded(_)));
}

#[tokio::test]
async fn test_create_is_multipart_without_image() {
    let backend = MockBackend::start().await;
    script_listings(&backend);
    backend.respond(
        Method::POST,
        "products",
        StatusCode::CREATED,
        fixtures::product(10, "Taro Latte", "18000", 20),
    );
    let mut panel = admin_panel(&backend);
    panel.mount().await;
    let before = backend.requests_to(&Method::GET, "products").len();

    panel.open_create();
    let form = panel.form_mut().unwrap();
    form.name = "Taro Latte".to_string();
    form.price = "18000".to_string();
    form.stock = "20".to_string();

    assert_eq!(panel.submit_editor().await, SubmitOutcome::Saved);

    let sent = backend.requests_to(&Method::POST, "products").pop().unwrap();
    assert!(sent.is_multipart());
    assert_eq!(sent.form_field("name").as_deref(), Some("Taro Latte"));
    assert_eq!(sent.form_field("price").as_deref(), Some("18000"));
    assert_eq!(sent.form_field("stock").as_deref(), Some("20"));
    assert_eq!(sent.form_field("_method"), None);
    assert!(!sent.has_file("image"));

    assert!(panel.editor().is_none());
    assert_eq!(
        backend.requests_to(&Method::GET, "products").len(),
        before + 1,
        "listing refreshed after save"
    );
    assert_eq!(panel.feedback().unwrap().message(), messages::PRODUCT_SAVED);
}

#[tokio::test]
async fn test_update_overrides_method_and_sends_image() {
    let backend = MockBackend::start().await;
    script_listings(&backend);
    backend.respond(
        Method::POST,
        "products/4",
        StatusCode::OK,
        fixtures::product(4, "Fresh Bread", "16000", 12),
    );
    let mut panel = admin_panel(&backend);
    panel.mount().await;

    panel.open_edit(&listed(&panel, 4));
    let form = panel.form_mut().unwrap();
    form.price = "16000".to_string();
    form.image = Some(ImageUpload::new("bread.png", "image/png", vec![0x89, b'P', b'N', b'G']));

    assert_eq!(panel.submit_editor().await, SubmitOutcome::Saved);

    let sent = backend.requests_to(&Method::POST, "products/4").pop().unwrap();
    assert_eq!(sent.form_field("_method").as_deref(), Some("PUT"));
    assert_eq!(sent.form_field("name").as_deref(), Some("Fresh Bread"));
    assert_eq!(sent.form_field("price").as_deref(), Some("16000"));
    assert!(sent.has_file("image"));
    assert!(backend.requests_to(&Method::PUT, "products/4").is_empty());
}

#[tokio::test]
async fn test_server_validation_keeps_editor_open() {
    let backend = MockBackend::start().await;
    script_listings(&backend);
    backend.respond(
        Method::POST,
        "products",
        StatusCode::UNPROCESSABLE_ENTITY,
        fixtures::validation("name", "Nama produk sudah digunakan."),
    );
    let mut panel = admin_panel(&backend);
    panel.mount().await;

    panel.open_create();
    let form = panel.form_mut().unwrap();
    form.name = "Melon Juice".to_string();
    form.price = "1".to_string();
    form.stock = "1".to_string();

    let outcome = panel.submit_editor().await;

    assert_eq!(
        outcome,
        SubmitOutcome::Rejected("Nama produk sudah digunakan.".to_string())
    );
    assert_eq!(
        panel.editor().unwrap().error.as_deref(),
        Some("Nama produk sudah digunakan.")
    );
}

#[tokio::test]
async fn test_delete_needs_confirmation_then_refreshes() {
    let backend = MockBackend::start().await;
    script_listings(&backend);
    backend.respond_empty(Method::DELETE, "products/4", StatusCode::NO_CONTENT);
    let mut panel = admin_panel(&backend);
    panel.mount().await;

    panel.request_delete(listed(&panel, 4));
    assert!(panel.delete_prompt().unwrap().contains("Fresh Bread"));
    panel.cancel_delete();
    assert_eq!(panel.confirm_delete().await, DeleteOutcome::Idle);
    assert!(backend.requests_to(&Method::DELETE, "products/4").is_empty());

    panel.request_delete(listed(&panel, 4));
    let outcome = panel.confirm_delete().await;

    assert!(matches!(outcome, DeleteOutcome::Deleted(ref p) if p.id == ProductId::new(4)));
    assert_eq!(backend.requests_to(&Method::DELETE, "products/4").len(), 1);
    assert!(panel.delete_prompt().is_none());
    let feedback = panel.feedback().unwrap();
    assert_eq!(feedback.kind(), NoticeKind::Success);
    assert_eq!(feedback.message(), messages::PRODUCT_DELETED);
}

#[tokio::test]
async fn test_failed_delete_resets_guard() {
    let backend = MockBackend::start().await;
    script_listings(&backend);
    backend.respond(
        Method::DELETE,
        "products/1",
        StatusCode::CONFLICT,
        json!({ "message": "Produk masih memiliki pesanan." }),
    );
    let mut panel = admin_panel(&backend);
    panel.mount().await;

    panel.request_delete(listed(&panel, 1));
    let outcome = panel.confirm_delete().await;

    assert_eq!(
        outcome,
        DeleteOutcome::Failed("Produk masih memiliki pesanan.".to_string())
    );
    assert!(panel.delete_prompt().is_none());
    assert_eq!(panel.feedback().unwrap().kind(), NoticeKind::Error);
}
