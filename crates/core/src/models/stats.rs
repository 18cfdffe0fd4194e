//! Dashboard statistics from `/dashboard/stats`.
//!
//! Every field is defaulted: the aggregation backend is free to omit a
//! section and the dashboard still renders the rest.

use serde::{Deserialize, Serialize};

use crate::{Price, ProductId};

/// The whole dashboard payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    #[serde(default)]
    pub summary: SalesSummary,
    #[serde(default)]
    pub monthly_sales: Vec<MonthlySales>,
    #[serde(default)]
    pub best_sellers: Vec<BestSeller>,
    #[serde(default)]
    pub stock_levels: Vec<StockLevel>,
}

/// Headline numbers shown as summary cards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesSummary {
    #[serde(default)]
    pub total_revenue: Price,
    #[serde(default)]
    pub total_orders: u64,
    #[serde(default)]
    pub items_sold: u64,
    #[serde(default)]
    pub total_products: u64,
    #[serde(default)]
    pub total_stock: u64,
}

/// Revenue for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlySales {
    /// Month label as sent by the backend (e.g. `2025-03` or `Mar`).
    pub month: String,
    pub total: Price,
}

/// A product ranked by units sold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestSeller {
    #[serde(default)]
    pub product_id: Option<ProductId>,
    pub name: String,
    pub total_sold: u64,
}

/// Remaining stock for one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevel {
    pub name: String,
    pub stock: u32,
}

impl DashboardStats {
    /// Products with stock at or below `threshold`, lowest first.
    #[must_use]
    pub fn low_stock(&self, threshold: u32) -> Vec<&StockLevel> {
        let mut low: Vec<&StockLevel> = self
            .stock_levels
            .iter()
            .filter(|s| s.stock <= threshold)
            .collect();
        low.sort_by_key(|s| s.stock);
        low
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_payload_parses() {
        let stats: DashboardStats =
            serde_json::from_str(r#"{"summary":{"total_revenue":"50000000","total_orders":290}}"#)
                .unwrap();
        assert_eq!(stats.summary.total_revenue, Price::from_rupiah(50_000_000));
        assert_eq!(stats.summary.total_orders, 290);
        assert!(stats.monthly_sales.is_empty());
    }

    #[test]
    fn test_low_stock_sorted() {
        let stats = DashboardStats {
            stock_levels: vec![
                StockLevel { name: "Melon".into(), stock: 80 },
                StockLevel { name: "Strawberry".into(), stock: 20 },
                StockLevel { name: "Chocolate".into(), stock: 5 },
            ],
            ..DashboardStats::default()
        };
        let names: Vec<&str> = stats.low_stock(20).iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Chocolate", "Strawberry"]);
    }
}
