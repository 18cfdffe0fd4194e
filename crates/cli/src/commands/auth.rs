//! Sign-in commands.
//!
//! # Usage
//!
//! ```bash
//! kkomi login -e siti@kkomi.id
//! kkomi register -n "Siti" -e siti@kkomi.id
//! kkomi whoami
//! kkomi logout
//! ```

#![allow(clippy::print_stdout)]

use kkomi_storefront::auth::Registration;
use kkomi_storefront::{ClientConfig, messages};

use super::{CliError, open_app, prompt, prompt_secret, signed_in_app};

/// Log in and persist the session.
pub async fn login(config: ClientConfig, email: Option<String>) -> Result<(), CliError> {
    let mut app = open_app(config)?;

    let email = match email {
        Some(email) => email,
        None => prompt("Email")?,
    };
    let password = prompt_secret("Password")?;

    let user = app
        .login(&email, &password)
        .await
        .map_err(|e| CliError::Rejected(e.user_message()))?;

    tracing::info!(user_id = %user.id, role = %user.role, "Signed in");
    println!("Selamat datang, {} ({}).", user.name, user.role);
    Ok(())
}

/// Create an account. Does not sign in.
pub async fn register(
    config: ClientConfig,
    name: Option<String>,
    email: Option<String>,
) -> Result<(), CliError> {
    let mut app = open_app(config)?;

    let name = match name {
        Some(name) => name,
        None => prompt("Nama")?,
    };
    let email = match email {
        Some(email) => email,
        None => prompt("Email")?,
    };
    let registration = Registration {
        name,
        email,
        password: prompt_secret("Password")?,
        password_confirmation: prompt_secret("Konfirmasi password")?,
    };

    app.register(&registration)
        .await
        .map_err(|e| CliError::Rejected(e.user_message()))?;

    println!("{}", messages::REGISTER_SUCCESS);
    Ok(())
}

/// End the stored session.
pub async fn logout(config: ClientConfig) -> Result<(), CliError> {
    let mut app = open_app(config)?;
    if !app.session().is_authenticated() {
        println!("Tidak ada sesi aktif.");
        return Ok(());
    }
    app.logout().await?;
    println!("Anda telah logout.");
    Ok(())
}

/// Show the stored user.
pub fn whoami(config: ClientConfig) -> Result<(), CliError> {
    let app = signed_in_app(config)?;
    let user = app.user().ok_or(CliError::NotSignedIn)?;
    println!("{} <{}> ({})", user.name, user.email, user.role);
    Ok(())
}
