//! Subscription checkout handler.
//!
//! `POST /api/subscribe` makes sure the signed-in user has a billing customer
//! and starts a hosted checkout for the subscription price. The response
//! carries only the checkout session id; the browser redirects with it.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use ignews_core::{CustomerId, Email, SubscriptionCheckout, UserRecord};
use ignews_store::UserStore;

use crate::error::ApiError;
use crate::session::SessionUser;
use crate::state::AppState;
use crate::stripe::PaymentsProvider;

/// Subscribe response.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeResponse {
    /// Checkout session id to redirect with.
    pub session_id: String,
}

/// Start a subscription checkout for the signed-in user.
pub async fn subscribe(
    State(state): State<Arc<AppState>>,
    session: SessionUser,
) -> Result<Json<SubscribeResponse>, ApiError> {
    let payments = state
        .payments
        .as_ref()
        .ok_or_else(|| ApiError::Internal("Stripe not configured".into()))?;

    let redirect = state
        .config
        .redirect_urls()
        .ok_or_else(|| ApiError::Internal("checkout redirect URLs not configured".into()))?;

    let user = state.store.find_by_email(&session.email).await?;

    let customer_id = match user.stripe_customer_id() {
        Some(id) => id,
        None => {
            provision_customer(state.store.as_ref(), payments.as_ref(), &user, &session.email)
                .await?
        }
    };

    let checkout = SubscriptionCheckout::for_customer(customer_id, redirect);
    let created = payments.create_checkout_session(&checkout).await?;

    tracing::info!(
        user_ref = %user.reference,
        customer_id = %checkout.customer,
        checkout_session_id = %created.id,
        "Checkout session created"
    );

    Ok(Json(SubscribeResponse {
        session_id: created.id,
    }))
}

/// Create a billing customer for `user` and store its id on the record.
///
/// Check-then-create: two concurrent first-time requests for the same user can
/// both get here, and the later store write wins.
async fn provision_customer(
    store: &dyn UserStore,
    payments: &dyn PaymentsProvider,
    user: &UserRecord,
    email: &Email,
) -> Result<CustomerId, ApiError> {
    let customer = payments.create_customer(email).await?;
    let customer_id = CustomerId::new(customer.id)
        .map_err(|e| ApiError::Internal(format!("payments provider returned {e}")))?;

    store
        .set_stripe_customer_id(&user.reference, &customer_id)
        .await?;

    tracing::info!(
        user_ref = %user.reference,
        customer_id = %customer_id,
        "Billing customer created"
    );

    Ok(customer_id)
}

/// Any method other than `POST`.
pub async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "POST")],
        "Method not allowed",
    )
}
