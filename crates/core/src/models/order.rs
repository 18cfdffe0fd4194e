//! Orders as listed in the admin transaction report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::product::resolve_image_url;
use crate::{Email, OrderDetailId, OrderId, OrderStatus, Price, ProductId, UserId};

/// A submitted checkout. Owned by the backend; the client only displays it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub total_amount: Price,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    pub user: OrderCustomer,
    #[serde(default)]
    pub details: Vec<OrderDetail>,
}

/// The customer embedded in an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCustomer {
    pub id: UserId,
    pub name: String,
    pub email: Email,
}

/// One line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetail {
    pub id: OrderDetailId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: u32,
    /// Unit price at the time of purchase.
    pub price: Price,
    pub product: OrderProduct,
}

/// The product embedded in an order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderProduct {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl OrderDetail {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

impl OrderProduct {
    /// Absolute image URL, or the placeholder.
    #[must_use]
    pub fn image_src(&self, storage_base: &str) -> String {
        resolve_image_url(self.image_url.as_deref(), storage_base)
    }
}

impl Order {
    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.details.iter().map(|d| u64::from(d.quantity)).sum()
    }
}
