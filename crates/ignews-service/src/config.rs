//! Service configuration.

use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

use ignews_core::RedirectUrls;
use ignews_store::StoreError;

/// Which user store backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Hosted Fauna database.
    Fauna,
    /// In-process map (local development only).
    Memory,
    /// Embedded `RocksDB` (requires the `rocksdb-backend` feature).
    RocksDb,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fauna" => Ok(Self::Fauna),
            "memory" => Ok(Self::Memory),
            "rocksdb" | "rocks" => Ok(Self::RocksDb),
            other => Err(ConfigError::Invalid {
                name: "STORE_BACKEND",
                value: other.to_string(),
            }),
        }
    }
}

/// How sessions are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    /// Ask the auth provider's session endpoint, forwarding the request cookies.
    NextAuth,
    /// Verify an HS256-signed (not encrypted) session token locally.
    Jwt,
}

impl FromStr for SessionMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nextauth" => Ok(Self::NextAuth),
            "jwt" => Ok(Self::Jwt),
            other => Err(ConfigError::Invalid {
                name: "SESSION_MODE",
                value: other.to_string(),
            }),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A setting has an unrecognised value.
    #[error("invalid {name}: {value:?}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// Offending value.
        value: String,
    },

    /// A required secret is not set.
    #[error("{0} is not set")]
    Missing(&'static str),

    /// The selected backend was not compiled in.
    #[error("store backend unavailable: {0}")]
    BackendUnavailable(&'static str),

    /// The store could not be opened.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:8080").
    pub listen_addr: String,

    /// User store backend (default: fauna).
    pub store_backend: StoreBackend,

    /// Path to `RocksDB` data directory (default: "/data/ignews").
    pub data_dir: String,

    /// Fauna endpoint URL.
    pub fauna_url: String,

    /// Fauna database secret.
    pub fauna_secret: Option<String>,

    /// Session resolution mode (default: nextauth).
    pub session_mode: SessionMode,

    /// Auth provider base URL (default: `http://localhost:3000`).
    pub nextauth_url: String,

    /// Session token signing secret (jwt mode).
    pub nextauth_secret: Option<String>,

    /// Stripe API key (optional).
    pub stripe_api_key: Option<String>,

    /// Stripe API base URL.
    pub stripe_api_base: String,

    /// Redirect target after a completed checkout.
    pub stripe_success_url: Option<String>,

    /// Redirect target after an abandoned checkout.
    pub stripe_cancel_url: Option<String>,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,
}

/// Stripe secrets file structure.
#[derive(Debug, Deserialize)]
struct StripeSecrets {
    api_key: String,
}

/// Fauna secrets file structure.
#[derive(Debug, Deserialize)]
struct FaunaSecrets {
    secret: String,
    #[serde(default)]
    url: Option<String>,
}

impl ServiceConfig {
    /// Load configuration from environment variables and secrets files.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `STORE_BACKEND` or `SESSION_MODE` has
    /// an unknown value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let stripe_api_key = load_stripe_secret();
        let (fauna_secret, fauna_url) = load_fauna_secret();

        Ok(Self {
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or(defaults.listen_addr),
            store_backend: std::env::var("STORE_BACKEND")
                .ok()
                .map(|s| s.parse::<StoreBackend>())
                .transpose()?
                .unwrap_or(defaults.store_backend),
            data_dir: std::env::var("DATA_DIR").unwrap_or(defaults.data_dir),
            fauna_url: fauna_url.unwrap_or(defaults.fauna_url),
            fauna_secret,
            session_mode: std::env::var("SESSION_MODE")
                .ok()
                .map(|s| s.parse::<SessionMode>())
                .transpose()?
                .unwrap_or(defaults.session_mode),
            nextauth_url: std::env::var("NEXTAUTH_URL").unwrap_or(defaults.nextauth_url),
            nextauth_secret: std::env::var("NEXTAUTH_SECRET").ok(),
            stripe_api_key,
            stripe_api_base: std::env::var("STRIPE_API_BASE").unwrap_or(defaults.stripe_api_base),
            stripe_success_url: std::env::var("STRIPE_SUCCESS_URL").ok(),
            stripe_cancel_url: std::env::var("STRIPE_CANCEL_URL").ok(),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| parse_origins(&s))
                .unwrap_or(defaults.cors_origins),
            max_body_bytes: std::env::var("MAX_BODY_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_body_bytes),
            request_timeout_seconds: std::env::var("REQUEST_TIMEOUT_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.request_timeout_seconds),
        })
    }

    /// Checkout redirect targets, if both are configured.
    #[must_use]
    pub fn redirect_urls(&self) -> Option<RedirectUrls> {
        Some(RedirectUrls {
            success_url: self.stripe_success_url.clone()?,
            cancel_url: self.stripe_cancel_url.clone()?,
        })
    }
}

fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Load the Stripe API key from file or environment.
fn load_stripe_secret() -> Option<String> {
    let secret_paths = [".secrets/stripe.json", "../.secrets/stripe.json"];

    for path in &secret_paths {
        if let Ok(secrets) = load_secrets_file::<StripeSecrets>(path) {
            tracing::info!(path = %path, "Loaded Stripe secrets from file");
            return Some(secrets.api_key);
        }
    }

    tracing::debug!("Stripe secrets file not found, using environment variables");
    std::env::var("STRIPE_API_KEY").ok()
}

/// Load the Fauna secret (and optional endpoint) from file or environment.
fn load_fauna_secret() -> (Option<String>, Option<String>) {
    let secret_paths = [".secrets/fauna.json", "../.secrets/fauna.json"];

    for path in &secret_paths {
        if let Ok(secrets) = load_secrets_file::<FaunaSecrets>(path) {
            tracing::info!(path = %path, "Loaded Fauna secrets from file");
            return (
                Some(secrets.secret),
                secrets.url.or_else(|| std::env::var("FAUNA_URL").ok()),
            );
        }
    }

    tracing::debug!("Fauna secrets file not found, using environment variables");
    (
        std::env::var("FAUNA_SECRET").ok(),
        std::env::var("FAUNA_URL").ok(),
    )
}

/// Load secrets from a JSON file.
fn load_secrets_file<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, std::io::Error> {
    let path = Path::new(path);
    if !path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Secrets file not found",
        ));
    }
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".into(),
            store_backend: StoreBackend::Fauna,
            data_dir: "/data/ignews".into(),
            fauna_url: ignews_store::FaunaConfig::DEFAULT_URL.into(),
            fauna_secret: None,
            session_mode: SessionMode::NextAuth,
            nextauth_url: "http://localhost:3000".into(),
            nextauth_secret: None,
            stripe_api_key: None,
            stripe_api_base: crate::stripe::StripeClient::DEFAULT_BASE_URL.into(),
            stripe_success_url: None,
            stripe_cancel_url: None,
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
        }
    }
}
