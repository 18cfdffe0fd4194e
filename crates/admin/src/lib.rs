//! Kkomi Admin library.
//!
//! The admin console's state and operations, without presentation:
//!
//! - [`products`] - Product edit buffer, multipart save, guarded delete
//! - [`orders`] - Order report and detail view
//! - [`dashboard`] - Sales statistics and summary cards
//! - [`panel`] - [`AdminPanel`], which owns the listings and dialogs
//!
//! Requests go through the storefront's [`ApiClient`](kkomi_storefront::ApiClient),
//! so a 401 here raises the same session-expired signal as anywhere else.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod dashboard;
pub mod error;
pub mod orders;
pub mod panel;
pub mod products;

pub use error::AdminError;
pub use orders::{OrderDetailView, StatusBadge};
pub use panel::{AdminPanel, DeleteOutcome, Listing, SubmitOutcome};
pub use products::{DeleteGuard, FormErrors, ImageUpload, ProductForm, ProductTarget};
