//! Product catalog: listing, debounced search and client-side filters.

mod debounce;
mod search;

pub use debounce::Debouncer;
pub use search::{ProductSearch, SearchState};

use std::future::Future;

use kkomi_core::{Page, Product};
use tracing::instrument;

use crate::api::{ApiClient, ApiError};

const PRODUCTS_ENDPOINT: &str = "products";

/// Anything that can answer a product search.
///
/// [`ApiClient`] is the production source; tests substitute their own.
pub trait ProductSource: Send + Sync + 'static {
    /// Fetch the first page of products matching `query`. `None` means
    /// unfiltered.
    fn search_products(
        &self,
        query: Option<String>,
    ) -> impl Future<Output = Result<Page<Product>, ApiError>> + Send;
}

impl ProductSource for ApiClient {
    async fn search_products(&self, query: Option<String>) -> Result<Page<Product>, ApiError> {
        fetch_products(self, query.as_deref(), None).await
    }
}

/// `GET /products?search=<query>&page=<page>`.
///
/// A blank query is left out, so it fetches the unfiltered listing. A
/// response without a body is an empty page.
///
/// # Errors
///
/// Returns the API error unchanged.
#[instrument(skip(api))]
pub async fn fetch_products(
    api: &ApiClient,
    query: Option<&str>,
    page: Option<u32>,
) -> Result<Page<Product>, ApiError> {
    let endpoint = products_endpoint(query, page);
    Ok(api.get(&endpoint).await?.unwrap_or_default())
}

fn products_endpoint(query: Option<&str>, page: Option<u32>) -> String {
    let mut params = url::form_urlencoded::Serializer::new(String::new());
    if let Some(query) = query.map(str::trim).filter(|q| !q.is_empty()) {
        params.append_pair("search", query);
    }
    if let Some(page) = page {
        params.append_pair("page", &page.to_string());
    }

    let params = params.finish();
    if params.is_empty() {
        PRODUCTS_ENDPOINT.to_string()
    } else {
        format!("{PRODUCTS_ENDPOINT}?{params}")
    }
}

/// Products in `category` (case-insensitive). `None` keeps everything.
#[must_use]
pub fn filter_by_category<'a>(products: &'a [Product], category: Option<&str>) -> Vec<&'a Product> {
    products
        .iter()
        .filter(|p| {
            category.is_none_or(|wanted| {
                p.category
                    .as_deref()
                    .is_some_and(|c| c.eq_ignore_ascii_case(wanted))
            })
        })
        .collect()
}

/// Products whose name contains `term` (case-insensitive).
#[must_use]
pub fn filter_by_name<'a, I>(products: I, term: &str) -> Vec<&'a Product>
where
    I: IntoIterator<Item = &'a Product>,
{
    let needle = term.trim().to_lowercase();
    products
        .into_iter()
        .filter(|p| needle.is_empty() || p.name.to_lowercase().contains(&needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use kkomi_core::{Price, ProductId};

    use super::*;

    fn product(id: i64, name: &str, category: Option<&str>) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            description: None,
            price: Price::from_rupiah(20_000),
            stock: 1,
            image_url: None,
            category: category.map(str::to_string),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_endpoint_query_encoding() {
        assert_eq!(products_endpoint(None, None), "products");
        assert_eq!(products_endpoint(Some("   "), None), "products");
        assert_eq!(
            products_endpoint(Some(" melon juice "), Some(2)),
            "products?search=melon+juice&page=2"
        );
        assert_eq!(
            products_endpoint(Some("a&b"), None),
            "products?search=a%26b"
        );
    }

    #[test]
    fn test_category_filter() {
        let products = vec![
            product(1, "Melon Juice", Some("JUICES")),
            product(2, "Fresh Bread", Some("BREADS")),
            product(3, "Cucumber", None),
        ];

        let juices = filter_by_category(&products, Some("juices"));
        assert_eq!(juices.len(), 1);
        assert_eq!(filter_by_category(&products, None).len(), 3);
    }

    #[test]
    fn test_name_filter_composes_with_category() {
        let products = vec![
            product(1, "Sunstar Fresh Melon Juice", Some("JUICES")),
            product(2, "Fresh Bread", Some("BREADS")),
            product(3, "Sunstar Banana Juice", Some("FRUITS & VEGES")),
        ];

        let hits = filter_by_name(filter_by_category(&products, Some("JUICES")), "MELON");
        assert_eq!(hits.len(), 1);
        assert_eq!(filter_by_name(&products, "fresh").len(), 2);
        assert_eq!(filter_by_name(&products, "").len(), 3);
    }
}
