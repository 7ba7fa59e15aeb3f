//! Database schema definitions and column families.
//!
//! This module defines the column families used in `RocksDB` storage.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// User data documents, keyed by reference id.
    pub const USERS: &str = "users";

    /// Index: reference id by case-folded email.
    pub const USERS_BY_EMAIL: &str = "users_by_email";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![cf::USERS, cf::USERS_BY_EMAIL]
}
