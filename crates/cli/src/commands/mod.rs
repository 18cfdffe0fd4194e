//! Command implementations.
//!
//! Each command opens the [`App`] over the persisted session, does its work
//! and returns. Output goes to stdout; diagnostics go through `tracing`.

pub mod admin;
pub mod auth;
pub mod catalog;
pub mod shop;

use std::io::{self, BufRead, Write};

use kkomi_admin::AdminError;
use kkomi_core::{Product, ProductId};
use kkomi_storefront::{ApiError, App, AppError, ClientConfig};
use secrecy::SecretString;
use thiserror::Error;

/// Errors surfaced to the terminal.
#[derive(Debug, Error)]
pub enum CliError {
    /// No stored session.
    #[error("Belum login. Jalankan `kkomi login` terlebih dahulu.")]
    NotSignedIn,

    /// The signed-in user is not an admin.
    #[error("Akses admin diperlukan.")]
    NotAdmin,

    /// A product id that is not in the listing.
    #[error("Produk #{0} tidak ditemukan.")]
    UnknownProduct(ProductId),

    /// The backend or the client refused; the message is ready to show.
    #[error("{0}")]
    Rejected(String),

    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    App(#[from] AppError),

    #[error(transparent)]
    Admin(#[from] AdminError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Open the app over the session persisted at `config.state_path`.
pub fn open_app(config: ClientConfig) -> Result<App, CliError> {
    Ok(App::open(config)?)
}

/// Open the app and require a stored session.
pub fn signed_in_app(config: ClientConfig) -> Result<App, CliError> {
    let app = open_app(config)?;
    if app.session().is_authenticated() {
        Ok(app)
    } else {
        Err(CliError::NotSignedIn)
    }
}

/// Print `label` and read one trimmed line from stdin.
pub fn prompt(label: &str) -> Result<String, CliError> {
    let mut stdout = io::stdout().lock();
    write!(stdout, "{label}: ")?;
    stdout.flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Like [`prompt`], for passwords.
pub fn prompt_secret(label: &str) -> Result<SecretString, CliError> {
    prompt(label).map(SecretString::from)
}

/// Find a product by id in a listing.
pub fn find_product(products: &[Product], id: ProductId) -> Result<Product, CliError> {
    products
        .iter()
        .find(|p| p.id == id)
        .cloned()
        .ok_or(CliError::UnknownProduct(id))
}
