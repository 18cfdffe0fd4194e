//! Catalog product.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Price, ProductId};

/// Image shown when a product has no image of its own.
pub const PLACEHOLDER_IMAGE_URL: &str = "https://placehold.co/100x100/e2e8f0/333?text=N/A";

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Price,
    #[serde(default)]
    pub stock: u32,
    /// Path relative to the storage host (e.g. `/storage/products/melon.jpg`).
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Resolve a stored image path against `storage_base`.
///
/// Absolute URLs pass through; a missing or blank path becomes
/// [`PLACEHOLDER_IMAGE_URL`].
#[must_use]
pub fn resolve_image_url(image_url: Option<&str>, storage_base: &str) -> String {
    match image_url.map(str::trim) {
        None | Some("") => PLACEHOLDER_IMAGE_URL.to_string(),
        Some(url) if url.starts_with("http://") || url.starts_with("https://") => url.to_string(),
        Some(path) => format!(
            "{}/{}",
            storage_base.trim_end_matches('/'),
            path.trim_start_matches('/')
        ),
    }
}

impl Product {
    /// Absolute image URL, resolved against the storage host, or the
    /// placeholder when the product has no image.
    #[must_use]
    pub fn image_src(&self, storage_base: &str) -> String {
        resolve_image_url(self.image_url.as_deref(), storage_base)
    }

    /// Whether any units are left.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(image_url: Option<&str>) -> Product {
        Product {
            id: ProductId::new(1),
            name: "Sunstar Fresh Melon Juice".to_string(),
            description: None,
            price: Price::from_rupiah(20_000),
            stock: 3,
            image_url: image_url.map(str::to_string),
            category: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_deserialize_backend_payload() {
        let json = r#"{
            "id": 9,
            "name": "Fresh Bread",
            "description": null,
            "price": "15000.00",
            "stock": 12,
            "image_url": "/storage/products/bread.jpg",
            "created_at": "2025-03-01T08:00:00.000000Z",
            "updated_at": "2025-03-02T08:00:00.000000Z"
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, ProductId::new(9));
        assert_eq!(product.price, Price::from_rupiah(15_000));
        assert!(product.created_at.is_some());
        assert!(product.category.is_none());
    }

    #[test]
    fn test_image_src() {
        let base = "http://127.0.0.1:8000/";
        assert_eq!(
            product(Some("/storage/a.jpg")).image_src(base),
            "http://127.0.0.1:8000/storage/a.jpg"
        );
        assert_eq!(
            product(Some("https://cdn.kkomi.id/a.jpg")).image_src(base),
            "https://cdn.kkomi.id/a.jpg"
        );
        assert_eq!(product(None).image_src(base), PLACEHOLDER_IMAGE_URL);
        assert_eq!(product(Some(" ")).image_src(base), PLACEHOLDER_IMAGE_URL);
    }
}
