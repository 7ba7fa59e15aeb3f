//! Stripe API client implementation.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use ignews_core::{Email, SubscriptionCheckout};

use super::types::{CheckoutSession, Customer, StripeErrorResponse};
use super::PaymentsProvider;

/// Error type for Stripe operations.
#[derive(Debug, thiserror::Error)]
pub enum StripeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Stripe API returned an error.
    #[error("Stripe API error: {error_type} - {message}")]
    Api {
        /// Error type.
        error_type: String,
        /// Error message.
        message: String,
        /// Error code.
        code: Option<String>,
    },
}

/// Stripe API client.
#[derive(Debug, Clone)]
pub struct StripeClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl StripeClient {
    /// Stripe API base URL.
    pub const DEFAULT_BASE_URL: &'static str = "https://api.stripe.com/v1";

    /// Create a new Stripe client.
    ///
    /// # Arguments
    ///
    /// * `api_key` - Stripe secret API key (`sk_test_...` or `sk_live_...`)
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, Self::DEFAULT_BASE_URL)
    }

    /// Create a client against a different API base (tests, proxies).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Handle API response and convert errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, StripeError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        // Try to parse error response
        let error_body: Result<StripeErrorResponse, _> = response.json().await;

        match error_body {
            Ok(stripe_error) => Err(StripeError::Api {
                error_type: stripe_error.error.error_type,
                message: stripe_error.error.message,
                code: stripe_error.error.code,
            }),
            Err(_) => Err(StripeError::Api {
                error_type: "unknown".to_string(),
                message: format!("HTTP {status}"),
                code: None,
            }),
        }
    }
}

#[async_trait]
impl PaymentsProvider for StripeClient {
    async fn create_customer(&self, email: &Email) -> Result<Customer, StripeError> {
        let params = [("email", email.as_str())];

        let response = self
            .client
            .post(format!("{}/customers", self.base_url))
            .basic_auth(&self.api_key, Option::<&str>::None)
            .form(&params)
            .send()
            .await?;

        self.handle_response(response).await
    }

    async fn create_checkout_session(
        &self,
        checkout: &SubscriptionCheckout,
    ) -> Result<CheckoutSession, StripeError> {
        let params = checkout_form_params(checkout);

        tracing::debug!(
            customer_id = %checkout.customer,
            mode = checkout.mode.as_str(),
            line_items = checkout.line_items.len(),
            "Creating Stripe checkout session"
        );

        let response = self
            .client
            .post(format!("{}/checkout/sessions", self.base_url))
            .basic_auth(&self.api_key, Option::<&str>::None)
            .form(&params)
            .send()
            .await?;

        self.handle_response(response).await
    }
}

/// Encode a checkout request in Stripe's bracketed form syntax.
#[must_use]
pub fn checkout_form_params(checkout: &SubscriptionCheckout) -> Vec<(String, String)> {
    let mut params = vec![
        ("mode".to_string(), checkout.mode.as_str().to_string()),
        (
            "billing_address_collection".to_string(),
            checkout.billing_address_collection.as_str().to_string(),
        ),
        (
            "allow_promotion_codes".to_string(),
            checkout.allow_promotion_codes.to_string(),
        ),
        ("customer".to_string(), checkout.customer.as_str().to_string()),
        ("success_url".to_string(), checkout.redirect.success_url.clone()),
        ("cancel_url".to_string(), checkout.redirect.cancel_url.clone()),
    ];

    for (i, method) in checkout.payment_method_types.iter().enumerate() {
        params.push((
            format!("payment_method_types[{i}]"),
            method.as_str().to_string(),
        ));
    }

    for (i, item) in checkout.line_items.iter().enumerate() {
        params.push((format!("line_items[{i}][price]"), item.price.clone()));
        params.push((format!("line_items[{i}][quantity]"), item.quantity.to_string()));
    }

    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use ignews_core::{CustomerId, RedirectUrls, SUBSCRIPTION_PRICE_ID};

    fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn client_creation_trims_base_url() {
        let client = StripeClient::with_base_url("sk_test_xxx", "http://localhost:1234/v1/");
        assert_eq!(client.base_url, "http://localhost:1234/v1");
        assert_eq!(StripeClient::new("sk_test_xxx").base_url, StripeClient::DEFAULT_BASE_URL);
    }

    #[test]
    fn checkout_params_encode_every_field() {
        let checkout = SubscriptionCheckout::for_customer(
            CustomerId::new("cus_1").unwrap(),
            RedirectUrls {
                success_url: "https://ignews.test/posts".into(),
                cancel_url: "https://ignews.test/".into(),
            },
        );
        let params = checkout_form_params(&checkout);

        assert_eq!(param(&params, "mode"), Some("subscription"));
        assert_eq!(param(&params, "payment_method_types[0]"), Some("card"));
        assert_eq!(param(&params, "billing_address_collection"), Some("required"));
        assert_eq!(param(&params, "line_items[0][price]"), Some(SUBSCRIPTION_PRICE_ID));
        assert_eq!(param(&params, "line_items[0][quantity]"), Some("1"));
        assert_eq!(param(&params, "allow_promotion_codes"), Some("true"));
        assert_eq!(param(&params, "customer"), Some("cus_1"));
        assert_eq!(param(&params, "success_url"), Some("https://ignews.test/posts"));
        assert_eq!(param(&params, "cancel_url"), Some("https://ignews.test/"));
        assert_eq!(params.len(), 9);
    }
}
