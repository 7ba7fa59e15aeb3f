//! Application state.

use std::sync::Arc;

use ignews_store::{FaunaConfig, FaunaStore, MemoryStore, UserStore};

use crate::config::{ConfigError, ServiceConfig, SessionMode, StoreBackend};
use crate::session::{JwtSessionProvider, NextAuthSessionProvider, SessionProvider};
use crate::stripe::{PaymentsProvider, StripeClient};

/// Application state shared across handlers.
///
/// The collaborators are stateless clients; handlers only borrow them.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration.
    pub config: ServiceConfig,

    /// User record store.
    pub store: Arc<dyn UserStore>,

    /// Session resolution.
    pub sessions: Arc<dyn SessionProvider>,

    /// Payments provider (optional).
    pub payments: Option<Arc<dyn PaymentsProvider>>,
}

impl AppState {
    /// Create a new application state, building the session and payments
    /// clients from the configuration.
    #[must_use]
    pub fn new(store: Arc<dyn UserStore>, config: ServiceConfig) -> Self {
        let sessions = build_session_provider(&config);

        let payments = config.stripe_api_key.as_ref().map(|key| {
            tracing::info!("Stripe integration enabled");
            Arc::new(StripeClient::with_base_url(key, &config.stripe_api_base))
                as Arc<dyn PaymentsProvider>
        });

        if payments.is_none() {
            tracing::warn!("Stripe not configured - checkout will not be available");
        }

        if config.redirect_urls().is_none() {
            tracing::warn!("STRIPE_SUCCESS_URL / STRIPE_CANCEL_URL not set - checkout will fail");
        }

        Self::with_providers(config, store, sessions, payments)
    }

    /// Create an application state from explicit collaborators.
    #[must_use]
    pub fn with_providers(
        config: ServiceConfig,
        store: Arc<dyn UserStore>,
        sessions: Arc<dyn SessionProvider>,
        payments: Option<Arc<dyn PaymentsProvider>>,
    ) -> Self {
        Self {
            config,
            store,
            sessions,
            payments,
        }
    }

    /// Check if the payments provider is configured.
    #[must_use]
    pub fn has_payments(&self) -> bool {
        self.payments.is_some()
    }
}

fn build_session_provider(config: &ServiceConfig) -> Arc<dyn SessionProvider> {
    match (config.session_mode, config.nextauth_secret.as_deref()) {
        (SessionMode::Jwt, Some(secret)) => {
            tracing::info!("Verifying session tokens locally");
            Arc::new(JwtSessionProvider::new(secret))
        }
        (SessionMode::Jwt, None) => {
            tracing::warn!("SESSION_MODE=jwt without NEXTAUTH_SECRET - falling back to the session endpoint");
            Arc::new(NextAuthSessionProvider::new(&config.nextauth_url))
        }
        (SessionMode::NextAuth, _) => {
            tracing::info!(nextauth_url = %config.nextauth_url, "Resolving sessions via auth provider");
            Arc::new(NextAuthSessionProvider::new(&config.nextauth_url))
        }
    }
}

/// Open the user store selected by the configuration.
///
/// # Errors
///
/// - `ConfigError::Missing` if the Fauna backend is selected without a secret.
/// - `ConfigError::BackendUnavailable` if `RocksDB` was not compiled in.
/// - `ConfigError::Store` if the embedded database cannot be opened.
pub fn open_store(config: &ServiceConfig) -> Result<Arc<dyn UserStore>, ConfigError> {
    match config.store_backend {
        StoreBackend::Fauna => {
            let secret = config
                .fauna_secret
                .as_ref()
                .ok_or(ConfigError::Missing("FAUNA_SECRET"))?;
            tracing::info!(url = %config.fauna_url, "Using Fauna user store");
            Ok(Arc::new(FaunaStore::new(
                FaunaConfig::new(secret.clone()).with_url(config.fauna_url.clone()),
            )))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory user store - records are lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        #[cfg(feature = "rocksdb-backend")]
        StoreBackend::RocksDb => {
            tracing::info!(path = %config.data_dir, "Opening RocksDB store");
            Ok(Arc::new(ignews_store::RocksStore::open(&config.data_dir)?))
        }
        #[cfg(not(feature = "rocksdb-backend"))]
        StoreBackend::RocksDb => Err(ConfigError::BackendUnavailable(
            "rebuild with the rocksdb-backend feature",
        )),
    }
}
