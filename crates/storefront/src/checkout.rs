//! Checkout submission.
//!
//! One attempt per call. The caller decides what happens to the cart; this
//! module never touches it beyond reading its lines.

use kkomi_core::{OrderId, OrderStatus, Price, ProductId};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::api::{ApiClient, ApiError};
use crate::cart::Cart;

/// Payment method sent with every order. The store only takes cash.
pub const PAYMENT_METHOD: &str = "cash";

const CHECKOUT_ENDPOINT: &str = "checkout";

/// One `{product_id, quantity}` pair of an order request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Body of `POST /checkout`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRequest {
    pub payment_method: &'static str,
    pub items: Vec<OrderItem>,
}

impl OrderRequest {
    /// Build a request from the cart's current lines. `None` for an empty
    /// cart.
    #[must_use]
    pub fn from_cart(cart: &Cart) -> Option<Self> {
        if cart.is_empty() {
            return None;
        }
        Some(Self {
            payment_method: PAYMENT_METHOD,
            items: cart.to_order_items(),
        })
    }
}

/// What the backend says about an accepted order.
///
/// Both fields are optional; some deployments answer with an empty body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CheckoutReceipt {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub order: Option<OrderSummary>,
}

/// The order created by a checkout.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrderSummary {
    pub id: OrderId,
    #[serde(default)]
    pub total_amount: Option<Price>,
    #[serde(default)]
    pub status: Option<OrderStatus>,
}

/// Result of a checkout attempt as seen by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// The cart was empty; nothing was sent.
    Skipped,
    /// The order was accepted and the cart cleared.
    Placed(CheckoutReceipt),
    /// The backend or transport rejected the order; the cart is unchanged.
    Failed {
        /// Text shown to the user.
        message: String,
    },
}

/// Submit the cart as an order.
///
/// Returns `Ok(None)` without any request when the cart is empty.
///
/// # Errors
///
/// Returns the API error unchanged; there is no retry.
#[instrument(skip(api, cart), fields(lines = cart.len(), total = %cart.total_price()))]
pub async fn submit(api: &ApiClient, cart: &Cart) -> Result<Option<CheckoutReceipt>, ApiError> {
    let Some(request) = OrderRequest::from_cart(cart) else {
        return Ok(None);
    };

    let receipt = api
        .post::<_, CheckoutReceipt>(CHECKOUT_ENDPOINT, &request)
        .await?
        .unwrap_or_default();

    info!(
        order_id = receipt.order.as_ref().map(|o| o.id.as_i64()),
        "Checkout accepted"
    );
    Ok(Some(receipt))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use kkomi_core::Product;

    use super::*;

    fn product(id: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            description: None,
            price: Price::from_rupiah(10_000),
            stock: 5,
            image_url: None,
            category: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_request_wire_shape() {
        let mut cart = Cart::new();
        cart.add(product(1), 2);
        cart.add(product(5), 1);

        let request = OrderRequest::from_cart(&cart).unwrap();
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "payment_method": "cash",
                "items": [
                    { "product_id": 1, "quantity": 2 },
                    { "product_id": 5, "quantity": 1 }
                ]
            })
        );
    }

    #[test]
    fn test_empty_cart_has_no_request() {
        assert!(OrderRequest::from_cart(&Cart::new()).is_none());
    }

    #[test]
    fn test_receipt_tolerates_partial_bodies() {
        let receipt: CheckoutReceipt =
            serde_json::from_str(r#"{"message":"Order created"}"#).unwrap();
        assert_eq!(receipt.message.as_deref(), Some("Order created"));
        assert!(receipt.order.is_none());

        let receipt: CheckoutReceipt = serde_json::from_str(
            r#"{"order":{"id":12,"total_amount":"25000.00","status":"pending","user_id":2}}"#,
        )
        .unwrap();
        let order = receipt.order.unwrap();
        assert_eq!(order.id, OrderId::new(12));
        assert_eq!(order.total_amount, Some(Price::from_rupiah(25_000)));
        assert_eq!(order.status, Some(OrderStatus::Pending));
    }
}
