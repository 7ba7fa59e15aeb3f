//! Error types for ig.news core types.

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised while constructing core types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// The email address is empty or malformed.
    #[error("invalid email address: {0:?}")]
    InvalidEmail(String),

    /// An identifier was empty.
    #[error("empty {kind} identifier")]
    EmptyId {
        /// Which identifier was empty.
        kind: &'static str,
    },
}
