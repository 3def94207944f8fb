//! Axum router configuration for billing endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    create_transaction, evaluate_entitlement, get_transaction_status, handle_settlement_webhook,
    BillingAppState,
};

/// Create the transaction and entitlement API router.
///
/// # Routes
///
/// ## User Endpoints (require authentication)
/// - `POST /transactions` - Start a purchase attempt
/// - `GET /transactions/:id/status` - Poll a transaction
/// - `GET /entitlement` - Evaluate access to a content item
pub fn billing_routes() -> Router<BillingAppState> {
    Router::new()
        .route("/transactions", post(create_transaction))
        .route("/transactions/:id/status", get(get_transaction_status))
        .route("/entitlement", get(evaluate_entitlement))
}

/// Create the settlement webhook router.
///
/// Separate from the user routes because webhooks carry no user
/// authentication; authenticity is the HMAC signature.
///
/// # Routes
/// - `POST /settlement/:id` - Processor settlement notification
pub fn webhook_routes() -> Router<BillingAppState> {
    Router::new().route("/settlement/:id", post(handle_settlement_webhook))
}

/// Create the complete billing module router, suitable for mounting at
/// `/api`.
pub fn billing_router() -> Router<BillingAppState> {
    Router::new()
        .merge(billing_routes())
        .nest("/webhooks", webhook_routes())
}
