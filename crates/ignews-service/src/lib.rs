//! ig.news HTTP API Service.
//!
//! This crate provides the subscription checkout API for ig.news:
//!
//! - Billing-customer provisioning for signed-in users
//! - Hosted Stripe Checkout for the monthly subscription
//!
//! # Authentication
//!
//! Requests are authenticated with the site's session cookie, resolved either
//! by the auth provider's session endpoint or by verifying the session token
//! locally (see [`session`]).

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Handlers need async for axum

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod session;
pub mod state;
pub mod stripe;

pub use config::{ConfigError, ServiceConfig, SessionMode, StoreBackend};
pub use error::ApiError;
pub use handlers::subscribe::SubscribeResponse;
pub use routes::create_router;
pub use session::{Session, SessionProvider, SessionUserInfo};
pub use state::{open_store, AppState};
pub use stripe::{PaymentsProvider, StripeClient, StripeError};
