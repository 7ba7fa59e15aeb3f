//! User record storage for ig.news.
//!
//! User records live in a document store, indexed by case-folded email. The
//! service needs exactly two operations on them, captured by [`UserStore`]:
//! an exact-match lookup by email and a point update that records the
//! billing-customer id.
//!
//! # Backends
//!
//! - [`FaunaStore`]: the hosted document database, over its HTTP query API
//! - [`MemoryStore`]: in-process map for tests and local development
//! - `RocksStore` (feature `rocksdb-backend`): embedded `RocksDB` with an email
//!   index column family
//!
//! # Example
//!
//! ```
//! use ignews_core::{CustomerId, Email, UserData, UserRef};
//! use ignews_store::{MemoryStore, UserStore};
//!
//! # async fn example() -> ignews_store::Result<()> {
//! let store = MemoryStore::new();
//! let email = Email::parse("a@x.com").unwrap();
//! store.insert_user(UserRef::new("u1").unwrap(), UserData::for_email(&email))?;
//!
//! let user = store.find_by_email(&email).await?;
//! store
//!     .set_stripe_customer_id(&user.reference, &CustomerId::new("cus_1").unwrap())
//!     .await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod fauna;
#[cfg(feature = "rocksdb-backend")]
pub mod keys;
pub mod memory;
#[cfg(feature = "rocksdb-backend")]
pub mod rocks;
#[cfg(feature = "rocksdb-backend")]
pub mod schema;

pub use error::{Result, StoreError};
pub use fauna::{FaunaConfig, FaunaStore};
pub use memory::MemoryStore;
#[cfg(feature = "rocksdb-backend")]
pub use rocks::RocksStore;

use async_trait::async_trait;
use ignews_core::{CustomerId, Email, UserRecord, UserRef};

/// The storage trait for user records.
///
/// Implementations must be shareable across requests; they hold no
/// per-request state.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fetch the single user record whose email matches `email` case-insensitively.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if no record matches.
    /// - `StoreError::Ambiguous` if more than one record matches.
    async fn find_by_email(&self, email: &Email) -> Result<UserRecord>;

    /// Record the billing-customer id on a user, leaving other fields untouched.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the reference does not exist.
    async fn set_stripe_customer_id(&self, user: &UserRef, customer_id: &CustomerId)
        -> Result<()>;
}
