//! Subscription checkout request.
//!
//! Every checkout started by this service sells the same product: one unit of
//! the monthly subscription price, paid by card, with a billing address and
//! optional promotion codes.

use serde::{Deserialize, Serialize};

use crate::CustomerId;

/// Price id of the ig.news monthly subscription.
pub const SUBSCRIPTION_PRICE_ID: &str = "price_1KF142J3DdVlGVY5KArfIqwy";

/// Checkout mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutMode {
    /// One-off payment.
    Payment,
    /// Recurring subscription.
    Subscription,
}

impl CheckoutMode {
    /// Wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Payment => "payment",
            Self::Subscription => "subscription",
        }
    }
}

/// Payment method offered on the checkout page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethodType {
    /// Credit or debit card.
    Card,
}

impl PaymentMethodType {
    /// Wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Card => "card",
        }
    }
}

/// Whether the checkout page collects a billing address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingAddressCollection {
    /// Only when the payment method needs it.
    Auto,
    /// Always.
    Required,
}

impl BillingAddressCollection {
    /// Wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Required => "required",
        }
    }
}

/// A line item referencing an existing price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutLineItem {
    /// Price id.
    pub price: String,
    /// Quantity.
    pub quantity: u32,
}

/// Where the checkout page sends the user afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectUrls {
    /// Target after a completed checkout.
    pub success_url: String,
    /// Target after the user abandons checkout.
    pub cancel_url: String,
}

/// A fully specified subscription checkout request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionCheckout {
    /// Checkout mode.
    pub mode: CheckoutMode,
    /// Accepted payment methods.
    pub payment_method_types: Vec<PaymentMethodType>,
    /// Billing address collection.
    pub billing_address_collection: BillingAddressCollection,
    /// Items being purchased.
    pub line_items: Vec<CheckoutLineItem>,
    /// Whether the page accepts promotion codes.
    pub allow_promotion_codes: bool,
    /// Billing customer paying for the subscription.
    pub customer: CustomerId,
    /// Redirect targets.
    #[serde(flatten)]
    pub redirect: RedirectUrls,
}

impl SubscriptionCheckout {
    /// Build the ig.news subscription checkout for a customer.
    #[must_use]
    pub fn for_customer(customer: CustomerId, redirect: RedirectUrls) -> Self {
        Self {
            mode: CheckoutMode::Subscription,
            payment_method_types: vec![PaymentMethodType::Card],
            billing_address_collection: BillingAddressCollection::Required,
            line_items: vec![CheckoutLineItem {
                price: SUBSCRIPTION_PRICE_ID.to_string(),
                quantity: 1,
            }],
            allow_promotion_codes: true,
            customer,
            redirect,
        }
    }
}
