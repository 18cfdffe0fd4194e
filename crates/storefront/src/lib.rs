//! Kkomi Storefront client library.
//!
//! Everything a shopper-facing front end needs, without any presentation:
//!
//! - [`api`] - REST client with bearer auth and typed failures
//! - [`session`] - Signed-in user and token, persisted as a pair
//! - [`cart`] - In-memory cart engine
//! - [`checkout`] - Order submission
//! - [`catalog`] - Product listing and debounced search
//! - [`auth`] - Login, registration, logout
//! - [`app`] - The coordinator that owns session, cart and UI state
//!
//! # Example
//!
//! ```rust,ignore
//! use kkomi_storefront::{App, ClientConfig};
//!
//! let mut app = App::open(ClientConfig::from_env()?)?;
//! app.login("siti@kkomi.id", &password).await?;
//! app.add_to_cart(product, 2);
//! let outcome = app.checkout().await;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod app;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod messages;
pub mod notice;
pub mod session;

pub use api::{ApiClient, ApiError, UploadMethod};
pub use app::{App, ExpiryAction, View};
pub use auth::AuthView;
pub use cart::Cart;
pub use checkout::CheckoutOutcome;
pub use config::ClientConfig;
pub use error::AppError;
pub use notice::{Notice, NoticeKind};
pub use session::SessionStore;
