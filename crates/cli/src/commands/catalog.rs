//! Catalog listing.

#![allow(clippy::print_stdout)]

use kkomi_core::Product;
use kkomi_storefront::{ClientConfig, catalog};

use super::{CliError, open_app};

/// List one page of products, optionally searched and filtered by category.
pub async fn products(
    config: ClientConfig,
    search: Option<String>,
    page: Option<u32>,
    category: Option<String>,
) -> Result<(), CliError> {
    let app = open_app(config)?;
    let listing = catalog::fetch_products(app.api(), search.as_deref(), page)
        .await
        .map_err(|e| CliError::Rejected(e.user_message()))?;

    let shown = catalog::filter_by_category(&listing.data, category.as_deref());
    if shown.is_empty() {
        println!("Tidak ada produk.");
    }
    let storage = app.config().storage_base_url.as_str();
    for product in shown {
        print_product(product, storage);
    }
    println!(
        "Halaman {} dari {} ({} produk)",
        listing.current_page, listing.last_page, listing.total
    );
    Ok(())
}

pub fn print_product(product: &Product, storage_base: &str) {
    println!(
        "#{:<4} {:<30} {:>14}  stok {:<5} {}",
        product.id,
        product.name,
        product.price.display_idr(),
        product.stock,
        product.image_src(storage_base)
    );
}
