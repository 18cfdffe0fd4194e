//! Order report.

use chrono::{DateTime, Datelike, Utc};
use kkomi_core::{Order, OrderId, OrderStatus, Page};
use kkomi_storefront::api::{ApiClient, ApiError};
use tracing::instrument;

const REPORT_ENDPOINT: &str = "orders/report";

const MONTHS_ID: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

/// `GET /orders/report`.
///
/// # Errors
///
/// Returns the API error unchanged.
#[instrument(skip(api))]
pub async fn fetch_order_report(api: &ApiClient) -> Result<Page<Order>, ApiError> {
    Ok(api.get(REPORT_ENDPOINT).await?.unwrap_or_default())
}

/// Visual tone of an order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusBadge {
    Success,
    Warning,
    Neutral,
}

impl StatusBadge {
    /// Badge for `status`: completed is a success, pending a warning,
    /// everything else neutral.
    #[must_use]
    pub const fn for_status(status: OrderStatus) -> Self {
        match status {
            OrderStatus::Completed => Self::Success,
            OrderStatus::Pending => Self::Warning,
            OrderStatus::Cancelled | OrderStatus::Unknown => Self::Neutral,
        }
    }

    /// CSS class for styling the badge.
    #[must_use]
    pub const fn badge_class(self) -> &'static str {
        match self {
            Self::Success => "badge-success",
            Self::Warning => "badge-warning",
            Self::Neutral => "badge-neutral",
        }
    }
}

/// One product line of [`OrderDetailView`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLineView {
    pub name: String,
    pub image_src: String,
    pub quantity: u32,
    pub unit_price: String,
    pub subtotal: String,
}

/// Everything the order detail dialog shows, pre-formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDetailView {
    pub id: OrderId,
    pub customer_name: String,
    pub customer_email: String,
    pub date: Option<String>,
    pub status: OrderStatus,
    pub badge: StatusBadge,
    pub payment_method: String,
    pub total: String,
    pub item_count: u64,
    pub lines: Vec<OrderLineView>,
}

impl OrderDetailView {
    /// Build the view, resolving product images against `storage_base`.
    #[must_use]
    pub fn new(order: &Order, storage_base: &str) -> Self {
        Self {
            id: order.id,
            customer_name: order.user.name.clone(),
            customer_email: order.user.email.to_string(),
            date: order.created_at.map(format_date_id),
            status: order.status,
            badge: StatusBadge::for_status(order.status),
            payment_method: order.payment_method.clone(),
            total: order.total_amount.display_idr(),
            item_count: order.item_count(),
            lines: order
                .details
                .iter()
                .map(|d| OrderLineView {
                    name: d.product.name.clone(),
                    image_src: d.product.image_src(storage_base),
                    quantity: d.quantity,
                    unit_price: d.price.display_idr(),
                    subtotal: d.line_total().display_idr(),
                })
                .collect(),
        }
    }
}

/// Long Indonesian date, e.g. `1 Maret 2025`.
#[must_use]
pub fn format_date_id(at: DateTime<Utc>) -> String {
    let month = MONTHS_ID
        .get(at.month0() as usize)
        .copied()
        .unwrap_or_default();
    format!("{} {month} {}", at.day(), at.year())
}
