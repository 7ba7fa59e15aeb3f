//! Common test utilities for ig.news integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::header::COOKIE;
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::Router;
use axum_test::TestServer;

use ignews_core::{CustomerId, Email, SubscriptionCheckout, UserData, UserRecord, UserRef};
use ignews_service::session::SessionError;
use ignews_service::stripe::{CheckoutSession, Customer};
use ignews_service::{
    create_router, AppState, PaymentsProvider, ServiceConfig, Session, SessionProvider,
    SessionUserInfo, StripeError,
};
use ignews_store::{MemoryStore, UserStore};

pub const SUCCESS_URL: &str = "https://ignews.test/posts";
pub const CANCEL_URL: &str = "https://ignews.test/";
pub const SESSION_COOKIE: &str = "next-auth.session-token";

/// Session provider that treats the session cookie value as the user's email.
pub struct CookieSessions;

#[async_trait]
impl SessionProvider for CookieSessions {
    async fn resolve(&self, headers: &HeaderMap) -> Result<Option<Session>, SessionError> {
        let email = headers
            .get(COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix(SESSION_COOKIE))
            .and_then(|v| v.strip_prefix('='))
            .map(String::from);

        Ok(email.map(|email| Session {
            user: SessionUserInfo {
                email: Some(email),
                name: None,
                image: None,
            },
            expires: None,
        }))
    }
}

/// User store that records every customer-id update before applying it.
#[derive(Default)]
pub struct RecordingStore {
    pub inner: MemoryStore,
    pub updates: Mutex<Vec<(String, String)>>,
}

impl RecordingStore {
    /// Recorded `(user ref, customer id)` updates, in call order.
    pub fn update_calls(&self) -> Vec<(String, String)> {
        self.updates.lock().unwrap().clone()
    }
}

#[async_trait]
impl UserStore for RecordingStore {
    async fn find_by_email(&self, email: &Email) -> ignews_store::Result<UserRecord> {
        self.inner.find_by_email(email).await
    }

    async fn set_stripe_customer_id(
        &self,
        user: &UserRef,
        customer_id: &CustomerId,
    ) -> ignews_store::Result<()> {
        self.updates
            .lock()
            .unwrap()
            .push((user.as_str().to_string(), customer_id.as_str().to_string()));
        self.inner.set_stripe_customer_id(user, customer_id).await
    }
}

/// Payments provider that records every call.
#[derive(Default)]
pub struct RecordingPayments {
    pub customers: Mutex<Vec<String>>,
    pub checkouts: Mutex<Vec<SubscriptionCheckout>>,
    pub next_customer_id: Mutex<String>,
    pub fail_checkout: Mutex<bool>,
}

impl RecordingPayments {
    pub fn new(next_customer_id: &str) -> Self {
        Self {
            next_customer_id: Mutex::new(next_customer_id.to_string()),
            ..Self::default()
        }
    }

    pub fn customer_calls(&self) -> Vec<String> {
        self.customers.lock().unwrap().clone()
    }

    pub fn checkout_calls(&self) -> Vec<SubscriptionCheckout> {
        self.checkouts.lock().unwrap().clone()
    }

    pub fn total_calls(&self) -> usize {
        self.customer_calls().len() + self.checkout_calls().len()
    }
}

#[async_trait]
impl PaymentsProvider for RecordingPayments {
    async fn create_customer(&self, email: &Email) -> Result<Customer, StripeError> {
        self.customers.lock().unwrap().push(email.as_str().to_string());
        Ok(Customer {
            id: self.next_customer_id.lock().unwrap().clone(),
            email: Some(email.as_str().to_string()),
        })
    }

    async fn create_checkout_session(
        &self,
        checkout: &SubscriptionCheckout,
    ) -> Result<CheckoutSession, StripeError> {
        self.checkouts.lock().unwrap().push(checkout.clone());

        if *self.fail_checkout.lock().unwrap() {
            return Err(StripeError::Api {
                error_type: "invalid_request_error".into(),
                message: "No such price".into(),
                code: Some("resource_missing".into()),
            });
        }

        Ok(CheckoutSession {
            id: "cs_test".into(),
            url: None,
            customer: Some(checkout.customer.as_str().to_string()),
            mode: Some(checkout.mode.as_str().to_string()),
        })
    }
}

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// The user store behind the server.
    pub store: Arc<RecordingStore>,
    /// The recording payments provider behind the server.
    pub payments: Arc<RecordingPayments>,
}

impl TestHarness {
    /// Create a harness with redirect URLs configured.
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    /// Create a harness with an explicit configuration.
    pub fn with_config(config: ServiceConfig) -> Self {
        let store = Arc::new(RecordingStore::default());
        let payments = Arc::new(RecordingPayments::new("cus_2"));

        let state = AppState::with_providers(
            config,
            store.clone(),
            Arc::new(CookieSessions),
            Some(payments.clone() as Arc<dyn PaymentsProvider>),
        );
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            store,
            payments,
        }
    }

    /// Add a user record and return its reference.
    pub fn add_user(&self, reference: &str, email: &str, customer_id: Option<&str>) -> UserRef {
        let reference = UserRef::new(reference).unwrap();
        let data = UserData {
            email: Some(email.to_string()),
            stripe_customer_id: customer_id.map(String::from),
            ..UserData::default()
        };
        self.store.inner.insert_user(reference.clone(), data).unwrap();
        reference
    }

    /// The stored customer id of a user.
    pub fn stored_customer_id(&self, reference: &UserRef) -> Option<String> {
        self.store
            .inner
            .get_user(reference)
            .unwrap()
            .and_then(|user| user.data.stripe_customer_id)
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Service configuration for tests.
pub fn test_config() -> ServiceConfig {
    ServiceConfig {
        listen_addr: "127.0.0.1:0".into(),
        stripe_success_url: Some(SUCCESS_URL.into()),
        stripe_cancel_url: Some(CANCEL_URL.into()),
        ..ServiceConfig::default()
    }
}

/// Cookie header signing in as `email`.
pub fn session_cookie(email: &str) -> (HeaderName, HeaderValue) {
    (
        COOKIE,
        HeaderValue::from_str(&format!("{SESSION_COOKIE}={email}")).unwrap(),
    )
}
