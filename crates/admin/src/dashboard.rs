//! Dashboard statistics.

use kkomi_core::{DashboardStats, StockLevel};
use kkomi_storefront::api::{ApiClient, ApiError};
use tracing::instrument;

const STATS_ENDPOINT: &str = "dashboard/stats";

/// Products at or below this stock are flagged on the dashboard.
pub const LOW_STOCK_THRESHOLD: u32 = 10;

/// `GET /dashboard/stats`. An empty body yields empty statistics.
///
/// # Errors
///
/// Returns the API error unchanged.
#[instrument(skip(api))]
pub async fn fetch_dashboard_stats(api: &ApiClient) -> Result<DashboardStats, ApiError> {
    Ok(api.get(STATS_ENDPOINT).await?.unwrap_or_default())
}

/// One headline number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryCard {
    pub title: &'static str,
    pub value: String,
}

/// The headline cards, in display order.
#[must_use]
pub fn summary_cards(stats: &DashboardStats) -> Vec<SummaryCard> {
    let s = &stats.summary;
    vec![
        SummaryCard {
            title: "Total Semua Pendapatan",
            value: s.total_revenue.display_idr(),
        },
        SummaryCard {
            title: "Total Pesanan",
            value: group_thousands(s.total_orders),
        },
        SummaryCard {
            title: "Barang Telah Terjual",
            value: group_thousands(s.items_sold),
        },
        SummaryCard {
            title: "Jumlah Produk",
            value: group_thousands(s.total_products),
        },
        SummaryCard {
            title: "Stok Barang",
            value: group_thousands(s.total_stock),
        },
    ]
}

/// Stock entries the dashboard should warn about.
#[must_use]
pub fn low_stock_alerts(stats: &DashboardStats) -> Vec<&StockLevel> {
    stats.low_stock(LOW_STOCK_THRESHOLD)
}

/// `1234567` → `1.234.567`
fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}
