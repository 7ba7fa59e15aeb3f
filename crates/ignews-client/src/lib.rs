//! ig.news Client SDK.
//!
//! This crate provides a client library for starting subscription checkouts
//! against the ig.news API.
//!
//! # Example
//!
//! ```no_run
//! use ignews_client::IgnewsClient;
//!
//! # async fn example() -> Result<(), ignews_client::ClientError> {
//! let client = IgnewsClient::new("http://localhost:8080");
//!
//! // Forward the browser's session cookie
//! let response = client
//!     .subscribe("next-auth.session-token=eyJhbGciOi...")
//!     .await?;
//!
//! println!("Redirect to checkout session {}", response.session_id);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod client;
mod error;
mod types;

pub use client::{ClientOptions, IgnewsClient};
pub use error::ClientError;
pub use types::*;
