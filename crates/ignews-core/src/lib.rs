//! Core types for the ig.news subscription service.
//!
//! This crate provides the domain types shared by the store, the HTTP service
//! and the client SDK:
//!
//! - **Identifiers**: `Email`, `UserRef`, `CustomerId`
//! - **Users**: `UserRecord`, `UserData`
//! - **Checkout**: `SubscriptionCheckout`, `RedirectUrls`, `SUBSCRIPTION_PRICE_ID`

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod checkout;
pub mod error;
pub mod ids;
pub mod user;

pub use checkout::{
    BillingAddressCollection, CheckoutLineItem, CheckoutMode, PaymentMethodType, RedirectUrls,
    SubscriptionCheckout, SUBSCRIPTION_PRICE_ID,
};
pub use error::{CoreError, Result};
pub use ids::{CustomerId, Email, UserRef};
pub use user::{UserData, UserRecord};
