//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `KKOMI_API_BASE_URL` - REST API base (default: `http://127.0.0.1:8000/api`)
//! - `KKOMI_STORAGE_BASE_URL` - Host serving product images (default: `http://127.0.0.1:8000`)
//! - `KKOMI_STATE_PATH` - File holding the persisted session (default: `.kkomi/session.json`)
//! - `KKOMI_SEARCH_DEBOUNCE_MS` - Quiet period before a search fires (default: 500)
//! - `KKOMI_HTTP_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000/api";
const DEFAULT_STORAGE_BASE_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_STATE_PATH: &str = ".kkomi/session.json";
const DEFAULT_SEARCH_DEBOUNCE_MS: &str = "500";
const DEFAULT_HTTP_TIMEOUT_SECS: &str = "30";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// REST API base URL; endpoints are appended to its path.
    pub api_base_url: Url,
    /// Host that serves uploaded product images.
    pub storage_base_url: Url,
    /// Where the session (`user` + `token`) is persisted.
    pub state_path: PathBuf,
    /// Quiet period for debounced catalog search.
    pub search_debounce: Duration,
    /// Per-request HTTP timeout.
    pub http_timeout: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base_url = get_url("KKOMI_API_BASE_URL", DEFAULT_API_BASE_URL)?;
        let storage_base_url = get_url("KKOMI_STORAGE_BASE_URL", DEFAULT_STORAGE_BASE_URL)?;
        let state_path = PathBuf::from(get_env_or_default("KKOMI_STATE_PATH", DEFAULT_STATE_PATH));
        let search_debounce = Duration::from_millis(get_number(
            "KKOMI_SEARCH_DEBOUNCE_MS",
            DEFAULT_SEARCH_DEBOUNCE_MS,
        )?);
        let http_timeout = Duration::from_secs(get_number(
            "KKOMI_HTTP_TIMEOUT_SECS",
            DEFAULT_HTTP_TIMEOUT_SECS,
        )?);
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            api_base_url,
            storage_base_url,
            state_path,
            search_debounce,
            http_timeout,
            sentry_dsn,
        })
    }

    /// Configuration pointing at `api_base_url` with every other setting at
    /// its default. Used by tests and embedders that do not read the
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `api_base_url` is not a valid http(s) URL.
    pub fn for_base_url(api_base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_base_url: parse_base_url("api_base_url", api_base_url)?,
            storage_base_url: parse_base_url("storage_base_url", DEFAULT_STORAGE_BASE_URL)?,
            state_path: PathBuf::from(DEFAULT_STATE_PATH),
            search_debounce: Duration::from_millis(500),
            http_timeout: Duration::from_secs(30),
            sentry_dsn: None,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

fn get_number(key: &str, default: &str) -> Result<u64, ConfigError> {
    get_env_or_default(key, default)
        .trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn get_url(key: &str, default: &str) -> Result<Url, ConfigError> {
    parse_base_url(key, &get_env_or_default(key, default))
}

/// Parse a base URL, forcing a trailing slash so `Url::join` appends to the
/// path instead of replacing its last segment.
fn parse_base_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let trimmed = value.trim().trim_end_matches('/');
    let url = Url::parse(&format!("{trimmed}/"))
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}
