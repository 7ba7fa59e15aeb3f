//! Client error types.

/// Errors that can occur when using the ig.news client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// No signed-in session was found for the forwarded cookie.
    #[error("not signed in")]
    Unauthorized,

    /// The endpoint does not accept the request method.
    #[error("method not allowed (allowed: {allow})")]
    MethodNotAllowed {
        /// Value of the `Allow` header.
        allow: String,
    },

    /// Server returned an error response.
    #[error("API error: {code} - {message}")]
    Api {
        /// Error code.
        code: String,
        /// Error message.
        message: String,
        /// HTTP status code.
        status: u16,
    },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
