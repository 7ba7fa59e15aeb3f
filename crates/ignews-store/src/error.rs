//! Error types for ig.news storage.

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// Serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Record not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity type.
        entity: &'static str,
        /// Lookup key.
        id: String,
    },

    /// An exact-match lookup returned more than one record.
    #[error("{count} records match {key}")]
    Ambiguous {
        /// Lookup key.
        key: String,
        /// Number of matches seen.
        count: usize,
    },

    /// Write would break the one-record-per-email index.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The remote document database rejected the query.
    #[error("remote store error ({status}): {code} - {message}")]
    Remote {
        /// HTTP status.
        status: u16,
        /// Error code reported by the database.
        code: String,
        /// Error description.
        message: String,
    },

    /// The remote document database could not be reached.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl StoreError {
    /// Shorthand for a missing user.
    pub(crate) fn user_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: "user",
            id: id.into(),
        }
    }
}
