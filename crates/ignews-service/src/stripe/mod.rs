//! Stripe integration for customers and subscription checkout.
//!
//! Stripe handles:
//! - Customer registration
//! - Hosted Checkout for the subscription

pub mod client;
pub mod types;

use async_trait::async_trait;

use ignews_core::{Email, SubscriptionCheckout};

pub use client::StripeClient;
pub use client::StripeError;
pub use types::*;

/// The payments provider operations the subscribe flow needs.
#[async_trait]
pub trait PaymentsProvider: Send + Sync {
    /// Register a new billing customer for `email`.
    async fn create_customer(&self, email: &Email) -> Result<Customer, StripeError>;

    /// Start a hosted checkout session.
    async fn create_checkout_session(
        &self,
        checkout: &SubscriptionCheckout,
    ) -> Result<CheckoutSession, StripeError>;
}
