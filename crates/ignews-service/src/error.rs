//! API error types and responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use ignews_store::StoreError;

use crate::session::SessionError;
use crate::stripe::StripeError;

/// API error type.
///
/// Only a missing session gets its own status; every collaborator failure is
/// reported as a 500 and its details stay in the logs.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Unauthorized - no session, or the session carries no usable email.
    #[error("unauthorized")]
    Unauthorized,

    /// Internal server error (missing configuration, invariant violations).
    #[error("internal error: {0}")]
    Internal(String),

    /// A collaborator (store, payments provider, session provider) failed.
    #[error("{service} error: {message}")]
    Upstream {
        /// Which collaborator failed.
        service: &'static str,
        /// Error detail (logged, not returned).
        message: String,
    },
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "A signed-in session is required".to_string(),
            ),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            Self::Upstream { service, message } => {
                tracing::error!(service = %service, error = %message, "Upstream call failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "upstream_error",
                    format!("The {service} request failed"),
                )
            }
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self::Upstream {
            service: "store",
            message: err.to_string(),
        }
    }
}

impl From<StripeError> for ApiError {
    fn from(err: StripeError) -> Self {
        Self::Upstream {
            service: "payments",
            message: err.to_string(),
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        Self::Upstream {
            service: "session",
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_is_401() {
        let response = ApiError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn collaborator_failures_are_500() {
        let store = ApiError::from(StoreError::NotFound {
            entity: "user",
            id: "a@x.com".into(),
        });
        assert_eq!(store.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);

        let stripe = ApiError::from(StripeError::Api {
            error_type: "invalid_request_error".into(),
            message: "No such price".into(),
            code: Some("resource_missing".into()),
        });
        assert_eq!(stripe.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);

        let internal = ApiError::Internal("missing redirect".into());
        assert_eq!(internal.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn upstream_error_names_service() {
        let err = ApiError::from(StoreError::Conflict("dup".into()));
        assert_eq!(err.to_string(), "store error: conflict: dup");
    }
}
