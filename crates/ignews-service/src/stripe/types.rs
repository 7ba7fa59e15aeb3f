//! Stripe API types.

use serde::{Deserialize, Serialize};

/// Stripe customer object (the fields we read).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    /// Customer ID (`cus_...`).
    pub id: String,
    /// Customer email.
    #[serde(default)]
    pub email: Option<String>,
}

/// Stripe Checkout session object (the fields we read).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Session ID (`cs_...`).
    pub id: String,
    /// Hosted checkout page URL.
    #[serde(default)]
    pub url: Option<String>,
    /// Customer the session is attached to.
    #[serde(default)]
    pub customer: Option<String>,
    /// Checkout mode.
    #[serde(default)]
    pub mode: Option<String>,
}

/// Stripe error envelope.
#[derive(Debug, Deserialize)]
pub struct StripeErrorResponse {
    /// The error.
    pub error: StripeErrorBody,
}

/// Stripe error details.
#[derive(Debug, Deserialize)]
pub struct StripeErrorBody {
    /// Error type (e.g. `invalid_request_error`).
    #[serde(rename = "type")]
    pub error_type: String,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
    /// Error code, when Stripe provides one.
    #[serde(default)]
    pub code: Option<String>,
}
