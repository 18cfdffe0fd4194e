//! Top-level coordinator.
//!
//! [`App`] owns the session, the cart and the UI flags. Views read through
//! `&self` accessors and change state only through the methods here, so
//! every mutation goes through one place.
//!
//! # Session expiry
//!
//! The API client raises the expired signal on a 401. The coordinator picks
//! it up in [`App::poll_session_signals`] and reacts by role:
//!
//! - **admin**: signed out at once (no backend call, the token is already
//!   dead) with a blocking notice;
//! - **customer**: shown a dismissible prompt; the session stays until
//!   [`App::dismiss_expiry_prompt`] signs them out.

use std::sync::Arc;
use std::time::Duration;

use kkomi_core::{Product, ProductId, Role, User};
use secrecy::SecretString;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tokio::time::Instant;
use tracing::{info, instrument, warn};

use crate::api::ApiClient;
use crate::auth::{self, AuthView, Registration};
use crate::cart::{AddOutcome, Cart, CartLine, QuantityChange};
use crate::checkout::{self, CheckoutOutcome};
use crate::config::ClientConfig;
use crate::error::AppError;
use crate::messages;
use crate::notice::{Notice, NoticeKind, Notices};
use crate::session::{FileStorage, SessionExpired, SessionStore, Storage};

/// How long the cart badge pulses after an add.
pub const CART_PULSE: Duration = Duration::from_millis(300);

/// The top-level screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Signed out: login or registration form.
    Auth(AuthView),
    /// Catalog, cart and checkout.
    Customer,
    /// Admin panel.
    Admin,
}

/// How an expiry signal was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryAction {
    /// Admin session cleared immediately.
    SignedOut,
    /// Customer prompt raised; the session stays until dismissal.
    Prompted,
}

/// Owner of all client-side state.
pub struct App {
    config: ClientConfig,
    api: ApiClient,
    session: SessionStore,
    expired: broadcast::Receiver<SessionExpired>,
    cart: Cart,
    cart_open: bool,
    cart_pulse: Option<Instant>,
    auth_view: AuthView,
    expiry_prompt: bool,
    notices: Notices,
}

impl App {
    /// Open the app with the session persisted at `config.state_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted session cannot be read or the HTTP
    /// client cannot be built.
    pub fn open(config: ClientConfig) -> Result<Self, AppError> {
        let storage = Arc::new(FileStorage::new(&config.state_path));
        Self::with_storage(config, storage)
    }

    /// Open the app over an arbitrary storage backend.
    ///
    /// # Errors
    ///
    /// Same as [`Self::open`].
    pub fn with_storage(config: ClientConfig, storage: Arc<dyn Storage>) -> Result<Self, AppError> {
        let session = SessionStore::open(storage)?;
        let api = ApiClient::new(&config, session.clone())?;
        let expired = session.subscribe_expired();

        Ok(Self {
            config,
            api,
            session,
            expired,
            cart: Cart::new(),
            cart_open: false,
            cart_pulse: None,
            auth_view: AuthView::Login,
            expiry_prompt: false,
            notices: Notices::new(),
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    #[must_use]
    pub const fn session(&self) -> &SessionStore {
        &self.session
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.session.user()
    }

    /// Which screen to show, from the session role.
    #[must_use]
    pub fn view(&self) -> View {
        match self.session.role() {
            None => View::Auth(self.auth_view),
            Some(Role::Admin) => View::Admin,
            Some(Role::Customer) => View::Customer,
        }
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub const fn is_cart_open(&self) -> bool {
        self.cart_open
    }

    /// Whether the cart badge is still pulsing from the last add.
    #[must_use]
    pub fn is_cart_pulsing(&self) -> bool {
        self.cart_pulse
            .is_some_and(|started| started.elapsed() < CART_PULSE)
    }

    /// Whether the customer session-expired prompt is up.
    #[must_use]
    pub const fn expiry_prompt_visible(&self) -> bool {
        self.expiry_prompt
    }

    /// Live notices; expired ones are dropped.
    pub fn notices(&mut self) -> &[Notice] {
        self.notices.active()
    }

    /// Acknowledge blocking notices (admin expiry).
    pub fn dismiss_notices(&mut self) {
        self.notices.dismiss_blocking();
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Switch between the login and registration forms.
    pub fn show_auth_view(&mut self, view: AuthView) {
        self.auth_view = view;
    }

    /// Log in and start a session.
    ///
    /// # Errors
    ///
    /// Returns the API error (bad credentials, validation, transport) or a
    /// storage error. The session is unchanged on error.
    #[instrument(skip(self, password))]
    pub async fn login(&mut self, email: &str, password: &SecretString) -> Result<User, AppError> {
        let response = auth::login(&self.api, email, password).await?;
        self.session
            .login(response.user.clone(), response.access_token)?;

        self.expiry_prompt = false;
        self.auth_view = AuthView::Login;
        Ok(response.user)
    }

    /// Register, then switch to the login form.
    ///
    /// # Errors
    ///
    /// Returns [`auth::AuthError::PasswordMismatch`] without contacting the
    /// backend, or the API error.
    pub async fn register(&mut self, registration: &Registration) -> Result<(), AppError> {
        auth::register(&self.api, registration).await?;
        self.auth_view = AuthView::Login;
        self.notices.push(Notice::success(messages::REGISTER_SUCCESS));
        Ok(())
    }

    /// Sign out. The backend is told on a best-effort basis; the local
    /// session always ends.
    ///
    /// # Errors
    ///
    /// Returns an error only if the stored session cannot be removed.
    pub async fn logout(&mut self) -> Result<(), AppError> {
        self.session.logout(&self.api, false).await?;
        self.reset_signed_out();
        Ok(())
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Add to the cart, open the cart panel and start the pulse.
    pub fn add_to_cart(&mut self, product: Product, quantity: u32) -> Option<AddOutcome> {
        let outcome = self.cart.add(product, quantity)?;
        self.cart_open = true;
        self.cart_pulse = Some(Instant::now());
        Some(outcome)
    }

    pub fn remove_from_cart(&mut self, product_id: ProductId) -> Option<CartLine> {
        self.cart.remove(product_id)
    }

    pub fn update_quantity(&mut self, product_id: ProductId, delta: i64) -> QuantityChange {
        self.cart.update_quantity(product_id, delta)
    }

    /// Open or close the cart panel. Returns the new state.
    pub const fn toggle_cart(&mut self) -> bool {
        self.cart_open = !self.cart_open;
        self.cart_open
    }

    /// Submit the cart.
    ///
    /// An empty cart is skipped without a request. On success the cart is
    /// cleared and closed; on failure it is left exactly as it was.
    #[instrument(skip(self), fields(lines = self.cart.len()))]
    pub async fn checkout(&mut self) -> CheckoutOutcome {
        match checkout::submit(&self.api, &self.cart).await {
            Ok(None) => CheckoutOutcome::Skipped,
            Ok(Some(receipt)) => {
                self.cart.clear();
                self.cart_open = false;
                self.notices.push(Notice::success(messages::CHECKOUT_SUCCESS));
                CheckoutOutcome::Placed(receipt)
            }
            Err(e) => {
                let message = e.user_message_or(messages::CHECKOUT_FAILED);
                warn!(error = %e, "Checkout failed; cart left unchanged");
                self.notices.push(Notice::error(message.clone()));
                CheckoutOutcome::Failed { message }
            }
        }
    }

    // =========================================================================
    // Session expiry
    // =========================================================================

    /// Apply the expiry policy if the signal fired since the last poll.
    ///
    /// # Errors
    ///
    /// Returns an error if an admin session cannot be removed from storage.
    /// The in-memory session is cleared regardless.
    pub fn poll_session_signals(&mut self) -> Result<Option<ExpiryAction>, AppError> {
        let mut raised = false;
        loop {
            match self.expired.try_recv() {
                Ok(SessionExpired) | Err(TryRecvError::Lagged(_)) => raised = true,
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
        if !raised {
            return Ok(None);
        }

        match self.session.role() {
            None => Ok(None),
            Some(Role::Admin) => {
                info!("Admin session expired; signing out");
                let cleared = self.session.clear();
                self.reset_signed_out();
                self.notices.push(Notice::blocking(
                    NoticeKind::Error,
                    messages::ADMIN_SESSION_EXPIRED,
                ));
                cleared?;
                Ok(Some(ExpiryAction::SignedOut))
            }
            Some(Role::Customer) => {
                info!("Customer session expired; prompting");
                self.expiry_prompt = true;
                Ok(Some(ExpiryAction::Prompted))
            }
        }
    }

    /// Close the customer expiry prompt and sign out silently.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored session cannot be removed.
    pub fn dismiss_expiry_prompt(&mut self) -> Result<(), AppError> {
        if !self.expiry_prompt {
            return Ok(());
        }
        let cleared = self.session.clear();
        self.reset_signed_out();
        cleared?;
        Ok(())
    }

    fn reset_signed_out(&mut self) {
        self.cart.clear();
        self.cart_open = false;
        self.cart_pulse = None;
        self.expiry_prompt = false;
        self.auth_view = AuthView::Login;
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("view", &self.view())
            .field("cart", &self.cart)
            .field("cart_open", &self.cart_open)
            .field("expiry_prompt", &self.expiry_prompt)
            .finish_non_exhaustive()
    }
}
