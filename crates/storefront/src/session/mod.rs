//! Session store: the signed-in user and their bearer token.
//!
//! A session is the pair `{user, token}`. The pair is present or absent as a
//! whole: [`Session`] cannot be built without both, the store holds an
//! `Option<Session>`, and storage writes both keys in one step.
//!
//! The store also carries the process-wide "session expired" signal. The API
//! client raises it when an authenticated request comes back 401; the
//! coordinator ([`crate::app::App`]) listens and applies the role-dependent
//! sign-out policy.

mod storage;

pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};

use std::sync::{Arc, PoisonError, RwLock};

use kkomi_core::{Role, User};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{info, instrument, warn};

use crate::api::ApiClient;

/// Storage keys for session data.
pub mod keys {
    /// Key for the serialized [`kkomi_core::User`].
    pub const USER: &str = "user";

    /// Key for the raw bearer token.
    pub const TOKEN: &str = "token";
}

const EXPIRY_CHANNEL_CAPACITY: usize = 8;

/// Errors that can occur when persisting the session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Storage read or write failed.
    #[error("session storage error: {0}")]
    Storage(#[from] StorageError),

    /// The user could not be serialized.
    #[error("failed to serialize user: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A session cannot start with a blank token.
    #[error("refusing to start a session without a token")]
    MissingToken,
}

/// An authenticated user together with their token.
#[derive(Debug, Clone)]
pub struct Session {
    user: User,
    token: SecretString,
}

impl Session {
    /// Pair a user with their token.
    #[must_use]
    pub const fn new(user: User, token: SecretString) -> Self {
        Self { user, token }
    }

    /// The signed-in user.
    #[must_use]
    pub const fn user(&self) -> &User {
        &self.user
    }

    /// The bearer token.
    #[must_use]
    pub const fn token(&self) -> &SecretString {
        &self.token
    }
}

/// Broadcast payload of the session-expired signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionExpired;

/// Shared handle to the current session.
///
/// Cheap to clone; all clones see the same session.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionStoreInner>,
}

struct SessionStoreInner {
    storage: Arc<dyn Storage>,
    current: RwLock<Option<Session>>,
    expired: broadcast::Sender<SessionExpired>,
}

impl SessionStore {
    /// Open the store, rehydrating a persisted session.
    ///
    /// A session is restored only when both keys are present and the user
    /// parses. A lone key (or an unreadable user) is treated as no session
    /// and removed from storage.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read, or if stray keys cannot
    /// be removed.
    pub fn open(storage: Arc<dyn Storage>) -> Result<Self, SessionError> {
        let current = rehydrate(storage.as_ref())?;
        if let Some(session) = &current {
            info!(
                user_id = %session.user.id,
                role = %session.user.role,
                "Restored persisted session"
            );
        }

        let (expired, _) = broadcast::channel(EXPIRY_CHANNEL_CAPACITY);
        Ok(Self {
            inner: Arc::new(SessionStoreInner {
                storage,
                current: RwLock::new(current),
                expired,
            }),
        })
    }

    /// Start a session. Both keys are written in one storage step before the
    /// in-memory session changes; a failed write leaves the store as it was.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::MissingToken`] for a blank token, or an error
    /// if the user cannot be serialized or storage fails.
    #[instrument(skip(self, user, token), fields(user_id = %user.id, role = %user.role))]
    pub fn login(&self, user: User, token: SecretString) -> Result<(), SessionError> {
        if token.expose_secret().trim().is_empty() {
            return Err(SessionError::MissingToken);
        }
        let user_json = serde_json::to_string(&user)?;
        self.inner.storage.set_all(&[
            (keys::USER, user_json.as_str()),
            (keys::TOKEN, token.expose_secret()),
        ])?;

        *self.write() = Some(Session::new(user, token));
        info!("Session started");
        Ok(())
    }

    /// End the session.
    ///
    /// Unless `silent`, the backend logout endpoint is called first on a
    /// best-effort basis: a failure is logged and otherwise ignored. The
    /// local session and both storage keys are then cleared regardless.
    ///
    /// A silent logout is used when the token is already known to be
    /// invalid (session expiry), so no backend call is made.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage keys cannot be removed. The in-memory
    /// session is cleared even then.
    #[instrument(skip(self, api))]
    pub async fn logout(&self, api: &ApiClient, silent: bool) -> Result<(), SessionError> {
        if !silent && self.is_authenticated() {
            // Always succeed locally, even if the backend never hears about it.
            if let Err(e) = crate::auth::logout(api).await {
                warn!(error = %e, "Backend logout failed; clearing local session anyway");
            }
        }
        self.clear()
    }

    /// Drop the session locally without contacting the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage keys cannot be removed. The in-memory
    /// session is cleared even then.
    pub fn clear(&self) -> Result<(), SessionError> {
        let previous = self.write().take();
        if let Some(session) = previous {
            info!(user_id = %session.user.id, "Session cleared");
        }
        self.inner
            .storage
            .remove_all(&[keys::USER, keys::TOKEN])?;
        Ok(())
    }

    /// A snapshot of the current session.
    #[must_use]
    pub fn current(&self) -> Option<Session> {
        self.read().clone()
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.read().as_ref().map(|s| s.user.clone())
    }

    /// The current bearer token, if any.
    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        self.read().as_ref().map(|s| s.token.clone())
    }

    /// Role of the signed-in user, if any.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.read().as_ref().map(|s| s.user.role)
    }

    /// Whether a session is active.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.read().is_some()
    }

    /// Broadcast the session-expired signal to every subscriber.
    pub fn raise_expired(&self) {
        // No subscribers is fine: nobody is around to react.
        let receivers = self.inner.expired.send(SessionExpired).unwrap_or(0);
        warn!(receivers, "Session expired signal raised");
    }

    /// Subscribe to the session-expired signal.
    #[must_use]
    pub fn subscribe_expired(&self) -> broadcast::Receiver<SessionExpired> {
        self.inner.expired.subscribe()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Option<Session>> {
        self.inner
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Option<Session>> {
        self.inner
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("current", &*self.read())
            .finish_non_exhaustive()
    }
}

fn rehydrate(storage: &dyn Storage) -> Result<Option<Session>, SessionError> {
    let user = storage.get(keys::USER)?;
    let token = storage.get(keys::TOKEN)?.filter(|t| !t.is_empty());

    match (user, token) {
        (None, None) => Ok(None),
        (Some(user_json), Some(token)) => match serde_json::from_str::<User>(&user_json) {
            Ok(user) => Ok(Some(Session::new(user, SecretString::from(token)))),
            Err(e) => {
                warn!(error = %e, "Persisted user is unreadable; discarding session");
                storage.remove_all(&[keys::USER, keys::TOKEN])?;
                Ok(None)
            }
        },
        (user, token) => {
            warn!(
                has_user = user.is_some(),
                has_token = token.is_some(),
                "Discarding half-persisted session"
            );
            storage.remove_all(&[keys::USER, keys::TOKEN])?;
            Ok(None)
        }
    }
}
