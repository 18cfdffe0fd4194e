//! Admin console commands.
//!
//! # Usage
//!
//! ```bash
//! kkomi admin products
//! kkomi admin orders --detail 3
//! kkomi admin stats
//! kkomi admin create --name "Melon Juice" --price 20000 --stock 10 --image melon.jpg
//! kkomi admin update 4 --stock 25
//! kkomi admin delete 4 --yes
//! ```
//!
//! All of these need a stored admin session (`kkomi login`).

#![allow(clippy::print_stdout)]

use std::path::PathBuf;

use kkomi_admin::dashboard::{low_stock_alerts, summary_cards};
use kkomi_admin::orders::StatusBadge;
use kkomi_admin::{AdminPanel, DeleteOutcome, ImageUpload, Listing, OrderDetailView, SubmitOutcome};
use kkomi_core::{OrderId, ProductId};
use kkomi_storefront::app::ExpiryAction;
use kkomi_storefront::{App, ClientConfig, messages};

use super::catalog::print_product;
use super::{CliError, find_product, prompt, signed_in_app};

/// Field values for create and update. `None` leaves a field as it is.
#[derive(Debug, Default)]
pub struct ProductFields {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub stock: Option<String>,
    pub image: Option<PathBuf>,
}

/// Open an admin panel over the stored session.
fn open_panel(config: ClientConfig) -> Result<(App, AdminPanel), CliError> {
    let app = signed_in_app(config)?;
    if !app.user().is_some_and(|u| u.is_admin()) {
        return Err(CliError::NotAdmin);
    }
    let panel = AdminPanel::new(app.api().clone(), app.config().storage_base_url.as_str());
    Ok((app, panel))
}

/// Sign out if the backend rejected the token during the command.
fn check_expiry(app: &mut App) -> Result<(), CliError> {
    if let Some(ExpiryAction::SignedOut) = app.poll_session_signals()? {
        return Err(CliError::Rejected(messages::ADMIN_SESSION_EXPIRED.to_string()));
    }
    Ok(())
}

fn loaded<T>(listing: &Listing<T>) -> Result<&T, CliError> {
    match listing {
        Listing::Loaded(value) => Ok(value),
        Listing::Failed(message) => Err(CliError::Rejected(message.clone())),
        Listing::Loading => Err(CliError::Rejected(messages::GENERIC_FAILURE.to_string())),
    }
}

/// List products.
pub async fn products(config: ClientConfig) -> Result<(), CliError> {
    let (mut app, mut panel) = open_panel(config)?;
    panel.refresh_products().await;
    check_expiry(&mut app)?;

    let page = loaded(panel.products())?;
    for product in &page.data {
        print_product(product, panel.storage_base());
    }
    println!("{} produk", page.total);
    Ok(())
}

/// Print the order report, or one order in detail.
pub async fn orders(config: ClientConfig, detail: Option<OrderId>) -> Result<(), CliError> {
    let (mut app, mut panel) = open_panel(config)?;
    panel.refresh_orders().await;
    check_expiry(&mut app)?;

    let report = loaded(panel.orders())?;
    let Some(id) = detail else {
        for order in &report.data {
            println!(
                "#{:<4} {:<20} {:>14}  [{}] {}",
                order.id,
                order.user.name,
                order.total_amount.display_idr(),
                StatusBadge::for_status(order.status).badge_class(),
                order.status
            );
        }
        println!("{} pesanan", report.total);
        return Ok(());
    };

    panel.select_order(id);
    let view = panel
        .order_detail()
        .ok_or_else(|| CliError::Rejected(format!("Pesanan #{id} tidak ditemukan.")))?;
    print_order_detail(&view);
    Ok(())
}

fn print_order_detail(view: &OrderDetailView) {
    println!("Pesanan #{}", view.id);
    println!("Pelanggan: {} <{}>", view.customer_name, view.customer_email);
    if let Some(date) = &view.date {
        println!("Tanggal:   {date}");
    }
    println!("Status:    {} [{}]", view.status, view.badge.badge_class());
    println!("Bayar:     {}", view.payment_method);
    for line in &view.lines {
        println!(
            "  {:<30} {:>3} x {:>12} = {:>14}  {}",
            line.name, line.quantity, line.unit_price, line.subtotal, line.image_src
        );
    }
    println!("Total:     {} ({} barang)", view.total, view.item_count);
}

/// Print dashboard statistics.
pub async fn stats(config: ClientConfig) -> Result<(), CliError> {
    let (mut app, mut panel) = open_panel(config)?;
    panel.refresh_stats().await;
    check_expiry(&mut app)?;

    let stats = loaded(panel.stats())?;
    for card in summary_cards(stats) {
        println!("{:<24} {}", card.title, card.value);
    }
    if !stats.monthly_sales.is_empty() {
        println!("\nPenjualan bulanan");
        for month in &stats.monthly_sales {
            println!("  {:<10} {}", month.month, month.total.display_idr());
        }
    }
    if !stats.best_sellers.is_empty() {
        println!("\nProduk terlaris");
        for seller in &stats.best_sellers {
            println!("  {:<30} {}", seller.name, seller.total_sold);
        }
    }
    let low = low_stock_alerts(stats);
    if !low.is_empty() {
        println!("\nStok menipis");
        for level in low {
            println!("  {:<30} {}", level.name, level.stock);
        }
    }
    Ok(())
}

/// Create a product.
pub async fn create(config: ClientConfig, fields: ProductFields) -> Result<(), CliError> {
    let (mut app, mut panel) = open_panel(config)?;
    panel.open_create();
    submit(&mut app, &mut panel, fields).await
}

/// Update a product from the first page of the listing.
pub async fn update(config: ClientConfig, id: ProductId, fields: ProductFields) -> Result<(), CliError> {
    let (mut app, mut panel) = open_panel(config)?;
    panel.refresh_products().await;
    check_expiry(&mut app)?;

    let product = find_product(&loaded(panel.products())?.data, id)?;
    panel.open_edit(&product);
    submit(&mut app, &mut panel, fields).await
}

async fn submit(app: &mut App, panel: &mut AdminPanel, fields: ProductFields) -> Result<(), CliError> {
    let image = match &fields.image {
        Some(path) => Some(ImageUpload::from_path(path).await?),
        None => None,
    };
    if let Some(form) = panel.form_mut() {
        if let Some(name) = fields.name {
            form.name = name;
        }
        if let Some(description) = fields.description {
            form.description = description;
        }
        if let Some(price) = fields.price {
            form.price = price;
        }
        if let Some(stock) = fields.stock {
            form.stock = stock;
        }
        form.image = image;
    }

    let outcome = panel.submit_editor().await;
    check_expiry(app)?;
    match outcome {
        SubmitOutcome::Saved => {
            println!("{}", messages::PRODUCT_SAVED);
            Ok(())
        }
        SubmitOutcome::Rejected(message) => Err(CliError::Rejected(message)),
        SubmitOutcome::Idle => Ok(()),
    }
}

/// Delete a product after confirmation.
pub async fn delete(config: ClientConfig, id: ProductId, yes: bool) -> Result<(), CliError> {
    let (mut app, mut panel) = open_panel(config)?;
    panel.refresh_products().await;
    check_expiry(&mut app)?;

    let product = find_product(&loaded(panel.products())?.data, id)?;
    panel.request_delete(product);

    if !yes {
        let question = panel.delete_prompt().unwrap_or_default();
        let answer = prompt(&format!("{question} [y/N]"))?;
        if !answer.eq_ignore_ascii_case("y") {
            panel.cancel_delete();
            println!("Dibatalkan.");
            return Ok(());
        }
    }

    let outcome = panel.confirm_delete().await;
    check_expiry(&mut app)?;
    match outcome {
        DeleteOutcome::Deleted(product) => {
            println!("{} ({})", messages::PRODUCT_DELETED, product.name);
            Ok(())
        }
        DeleteOutcome::Failed(message) => Err(CliError::Rejected(message)),
        DeleteOutcome::Idle => Ok(()),
    }
}
