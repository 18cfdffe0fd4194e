//! Admin panel state.
//!
//! [`AdminPanel`] owns the three listings (products, order report,
//! dashboard statistics), the product editor, the delete confirmation and a
//! feedback notice. Every mutating action is followed by a refresh of the
//! affected listings; the panel never patches a listing locally.

use kkomi_core::{DashboardStats, Order, OrderId, Page, Product};
use kkomi_storefront::api::{ApiClient, ApiError};
use kkomi_storefront::messages;
use kkomi_storefront::notice::{Notice, Notices};
use tracing::{instrument, warn};

use crate::dashboard::fetch_dashboard_stats;
use crate::error::AdminError;
use crate::orders::{OrderDetailView, fetch_order_report};
use crate::products::{self, DeleteGuard, ProductForm, ProductTarget};

// =============================================================================
// Listing
// =============================================================================

/// A remotely loaded list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing<T> {
    Loading,
    Loaded(T),
    /// Message to show in place of the list.
    Failed(String),
}

impl<T> Listing<T> {
    fn from_result(result: Result<T, ApiError>, fallback: &str) -> Self {
        match result {
            Ok(value) => Self::Loaded(value),
            Err(e) => Self::Failed(e.user_message_or(fallback)),
        }
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    #[must_use]
    pub const fn loaded(&self) -> Option<&T> {
        match self {
            Self::Loaded(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

// =============================================================================
// Editor
// =============================================================================

/// The open product dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Editor {
    pub target: ProductTarget,
    pub form: ProductForm,
    /// Why the last save was rejected.
    pub error: Option<String>,
}

/// Result of [`AdminPanel::submit_editor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// No editor was open.
    Idle,
    /// Saved; the editor is closed.
    Saved,
    /// Not saved; the editor stays open with this message.
    Rejected(String),
}

/// Result of [`AdminPanel::confirm_delete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Nothing was awaiting confirmation.
    Idle,
    Deleted(Product),
    Failed(String),
}

// =============================================================================
// Panel
// =============================================================================

/// State behind the admin screens.
#[derive(Debug)]
pub struct AdminPanel {
    api: ApiClient,
    storage_base: String,
    products: Listing<Page<Product>>,
    orders: Listing<Page<Order>>,
    stats: Listing<DashboardStats>,
    editor: Option<Editor>,
    delete: DeleteGuard,
    selected_order: Option<OrderId>,
    feedback: Notices,
}

impl AdminPanel {
    /// A panel with every listing still loading. Call [`mount`](Self::mount)
    /// to fetch them.
    #[must_use]
    pub fn new(api: ApiClient, storage_base: impl Into<String>) -> Self {
        Self {
            api,
            storage_base: storage_base.into(),
            products: Listing::Loading,
            orders: Listing::Loading,
            stats: Listing::Loading,
            editor: None,
            delete: DeleteGuard::new(),
            selected_order: None,
            feedback: Notices::new(),
        }
    }

    /// Load all three listings concurrently.
    #[instrument(skip(self))]
    pub async fn mount(&mut self) {
        self.products = Listing::Loading;
        self.orders = Listing::Loading;
        self.stats = Listing::Loading;

        let (products, orders, stats) = tokio::join!(
            products::fetch_products(&self.api),
            fetch_order_report(&self.api),
            fetch_dashboard_stats(&self.api),
        );

        self.products = Listing::from_result(products, messages::PRODUCTS_LOAD_FAILED);
        self.orders = Listing::from_result(orders, messages::ORDERS_LOAD_FAILED);
        self.stats = Listing::from_result(stats, messages::STATS_LOAD_FAILED);
    }

    pub async fn refresh_products(&mut self) {
        self.products = Listing::Loading;
        let result = products::fetch_products(&self.api).await;
        self.products = Listing::from_result(result, messages::PRODUCTS_LOAD_FAILED);
    }

    pub async fn refresh_orders(&mut self) {
        self.orders = Listing::Loading;
        let result = fetch_order_report(&self.api).await;
        self.orders = Listing::from_result(result, messages::ORDERS_LOAD_FAILED);
    }

    pub async fn refresh_stats(&mut self) {
        self.stats = Listing::Loading;
        let result = fetch_dashboard_stats(&self.api).await;
        self.stats = Listing::from_result(result, messages::STATS_LOAD_FAILED);
    }

    /// Products and stats both change when the catalog does.
    async fn refresh_catalog(&mut self) {
        self.products = Listing::Loading;
        self.stats = Listing::Loading;
        let (products, stats) = tokio::join!(
            products::fetch_products(&self.api),
            fetch_dashboard_stats(&self.api),
        );
        self.products = Listing::from_result(products, messages::PRODUCTS_LOAD_FAILED);
        self.stats = Listing::from_result(stats, messages::STATS_LOAD_FAILED);
    }

    #[must_use]
    pub const fn products(&self) -> &Listing<Page<Product>> {
        &self.products
    }

    #[must_use]
    pub const fn orders(&self) -> &Listing<Page<Order>> {
        &self.orders
    }

    #[must_use]
    pub const fn stats(&self) -> &Listing<DashboardStats> {
        &self.stats
    }

    #[must_use]
    pub fn storage_base(&self) -> &str {
        &self.storage_base
    }

    // -------------------------------------------------------------------------
    // Editor
    // -------------------------------------------------------------------------

    pub fn open_create(&mut self) {
        self.editor = Some(Editor {
            target: ProductTarget::New,
            form: ProductForm::blank(),
            error: None,
        });
    }

    pub fn open_edit(&mut self, product: &Product) {
        self.editor = Some(Editor {
            target: ProductTarget::Existing(product.id),
            form: ProductForm::from_product(product),
            error: None,
        });
    }

    pub fn close_editor(&mut self) {
        self.editor = None;
    }

    #[must_use]
    pub const fn editor(&self) -> Option<&Editor> {
        self.editor.as_ref()
    }

    /// The open form, for editing its fields.
    pub fn form_mut(&mut self) -> Option<&mut ProductForm> {
        self.editor.as_mut().map(|e| &mut e.form)
    }

    /// Save the open form.
    pub async fn submit_editor(&mut self) -> SubmitOutcome {
        let Some(editor) = self.editor.as_ref() else {
            return SubmitOutcome::Idle;
        };

        match products::save_product(&self.api, editor.target, &editor.form).await {
            Ok(_) => {
                self.editor = None;
                self.feedback.push(Notice::success(messages::PRODUCT_SAVED));
                self.refresh_catalog().await;
                SubmitOutcome::Saved
            }
            Err(e) => {
                if !matches!(e, AdminError::Invalid(_)) {
                    warn!(error = %e, "Product save failed");
                }
                let message = e.user_message_or(messages::PRODUCT_SAVE_FAILED);
                if let Some(editor) = self.editor.as_mut() {
                    editor.error = Some(message.clone());
                }
                SubmitOutcome::Rejected(message)
            }
        }
    }

    // -------------------------------------------------------------------------
    // Delete
    // -------------------------------------------------------------------------

    pub fn request_delete(&mut self, product: Product) {
        self.delete.request(product);
    }

    pub fn cancel_delete(&mut self) {
        self.delete.cancel();
    }

    /// Confirmation question, while a delete is pending.
    #[must_use]
    pub fn delete_prompt(&self) -> Option<String> {
        self.delete.prompt()
    }

    /// Delete the pending product and report the result as feedback.
    pub async fn confirm_delete(&mut self) -> DeleteOutcome {
        match self.delete.confirm(&self.api).await {
            None => DeleteOutcome::Idle,
            Some(Ok(product)) => {
                self.feedback.push(Notice::success(messages::PRODUCT_DELETED));
                self.refresh_catalog().await;
                DeleteOutcome::Deleted(product)
            }
            Some(Err(e)) => {
                warn!(error = %e, "Product delete failed");
                let message = e.user_message_or(messages::PRODUCT_DELETE_FAILED);
                self.feedback.push(Notice::error(message.clone()));
                DeleteOutcome::Failed(message)
            }
        }
    }

    // -------------------------------------------------------------------------
    // Order detail
    // -------------------------------------------------------------------------

    pub fn select_order(&mut self, id: OrderId) {
        self.selected_order = Some(id);
    }

    pub fn close_order_detail(&mut self) {
        self.selected_order = None;
    }

    /// Detail view of the selected order, if it is in the loaded report.
    #[must_use]
    pub fn order_detail(&self) -> Option<OrderDetailView> {
        let id = self.selected_order?;
        self.orders
            .loaded()?
            .data
            .iter()
            .find(|o| o.id == id)
            .map(|o| OrderDetailView::new(o, &self.storage_base))
    }

    /// The live feedback notice, if any.
    pub fn feedback(&mut self) -> Option<&Notice> {
        self.feedback.latest()
    }
}
