//! Integration tests for cart and checkout through the coordinator.
//!
//! Run with: cargo test -p kkomi-integration-tests --test checkout_flow

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use kkomi_core::{Price, Product, ProductId};
use kkomi_integration_tests::{MockBackend, fixtures};
use kkomi_storefront::checkout::CheckoutReceipt;
use kkomi_storefront::session::MemoryStorage;
use kkomi_storefront::{App, CheckoutOutcome, messages};
use secrecy::SecretString;
use serde_json::json;

fn product(id: i64, name: &str, price: &str) -> Product {
    serde_json::from_value(fixtures::product(id, name, price, 10)).unwrap()
}

async fn signed_in(backend: &MockBackend) -> App {
    backend.respond(Method::POST, "auth/login", StatusCode::OK, fixtures::login("customer"));
    let mut app = App::with_storage(backend.config(), Arc::new(MemoryStorage::new())).unwrap();
    app.login("siti@kkomi.id", &SecretString::from("rahasia123"))
        .await
        .unwrap();
    app
}

#[tokio::test]
async fn test_empty_cart_sends_nothing() {
    let backend = MockBackend::start().await;
    let mut app = signed_in(&backend).await;

    assert_eq!(app.checkout().await, CheckoutOutcome::Skipped);
    assert!(backend.requests_to(&Method::POST, "checkout").is_empty());
}

#[tokio::test]
async fn test_checkout_sends_cart_and_clears_it() {
    let backend = MockBackend::start().await;
    backend.respond(
        Method::POST,
        "checkout",
        StatusCode::CREATED,
        json!({
            "message": "Checkout berhasil",
            "order": { "id": 12, "total_amount": "25000.00", "status": "pending" }
        }),
    );
    let mut app = signed_in(&backend).await;

    app.add_to_cart(product(1, "Melon Juice", "10000.00"), 2);
    app.add_to_cart(product(5, "Cucumber", "5000.00"), 1);
    assert!(app.is_cart_open());
    assert_eq!(app.cart().total_price(), Price::from_rupiah(25_000));

    let outcome = app.checkout().await;

    let CheckoutOutcome::Placed(CheckoutReceipt { order, .. }) = outcome else {
        panic!("expected a placed order, got {outcome:?}");
    };
    assert_eq!(order.unwrap().total_amount, Some(Price::from_rupiah(25_000)));

    let sent = backend.requests_to(&Method::POST, "checkout").pop().unwrap();
    assert_eq!(sent.authorization.as_deref(), Some("Bearer tok-abc"));
    assert_eq!(
        sent.json(),
        Some(json!({
            "payment_method": "cash",
            "items": [
                { "product_id": 1, "quantity": 2 },
                { "product_id": 5, "quantity": 1 }
            ]
        }))
    );

    assert!(app.cart().is_empty());
    assert!(!app.is_cart_open());
    assert_eq!(
        app.notices().last().unwrap().message(),
        messages::CHECKOUT_SUCCESS
    );
}

#[tokio::test]
async fn test_failed_checkout_leaves_cart_identical() {
    let backend = MockBackend::start().await;
    backend.respond(
        Method::POST,
        "checkout",
        StatusCode::UNPROCESSABLE_ENTITY,
        json!({ "message": "Stok Melon Juice tidak mencukupi" }),
    );
    let mut app = signed_in(&backend).await;

    app.add_to_cart(product(7, "Melon Juice", "10000.00"), 3);
    app.add_to_cart(product(7, "Melon Juice", "10000.00"), 2);
    app.add_to_cart(product(2, "Taro Latte", "18000.00"), 1);
    app.update_quantity(ProductId::new(2), 1);
    let before = app.cart().clone();

    let outcome = app.checkout().await;

    assert_eq!(
        outcome,
        CheckoutOutcome::Failed {
            message: "Stok Melon Juice tidak mencukupi".to_string()
        }
    );
    assert_eq!(app.cart(), &before);
    assert_eq!(app.cart().line(ProductId::new(7)).unwrap().quantity(), 5);
    assert_eq!(app.cart().total_items(), 7);
}

#[tokio::test]
async fn test_failure_without_message_uses_fallback() {
    let backend = MockBackend::start().await;
    backend.respond_empty(Method::POST, "checkout", StatusCode::INTERNAL_SERVER_ERROR);
    let mut app = signed_in(&backend).await;

    app.add_to_cart(product(1, "Melon Juice", "10000.00"), 1);
    let outcome = app.checkout().await;

    assert_eq!(
        outcome,
        CheckoutOutcome::Failed {
            message: messages::CHECKOUT_FAILED.to_string()
        }
    );
    assert_eq!(app.cart().len(), 1);
}
