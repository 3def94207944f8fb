//! HTTP handlers for billing endpoints.
//!
//! These handlers connect Axum routes to application layer command/query
//! handlers.

use std::str::FromStr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Json, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use tracing::warn;

use crate::application::handlers::{
    ApplySettlementEventCommand, ApplySettlementEventHandler, CreateTransactionCommand,
    CreateTransactionHandler, EvaluateEntitlementHandler, EvaluateEntitlementQuery,
    GetTransactionStatusHandler, GetTransactionStatusQuery, WebhookIngestOutcome,
};
use crate::domain::foundation::{ContentId, Currency, Money, TransactionId, UserId, ValidationError};
use crate::domain::transaction::{
    PaymentMethod, SettlementWebhookVerifier, TransactionError, WebhookError,
};
use crate::ports::{
    CatalogLookup, PurchaseStore, StrategyRegistry, TransactionStore, UserDirectory,
};

use super::dto::{
    CreateTransactionRequest, CreateTransactionResponse, EntitlementParams, EntitlementResponse,
    ErrorResponse, TransactionStatusResponse, WebhookAckResponse,
};

/// Header carrying the processor's HMAC signature.
pub const SIGNATURE_HEADER: &str = "X-Settlement-Signature";

/// Shared application state containing all dependencies.
///
/// Cloned per request; dependencies are Arc-wrapped for cheap sharing.
#[derive(Clone)]
pub struct BillingAppState {
    pub transaction_store: Arc<dyn TransactionStore>,
    pub purchase_store: Arc<dyn PurchaseStore>,
    pub user_directory: Arc<dyn UserDirectory>,
    pub catalog: Arc<dyn CatalogLookup>,
    pub strategies: Arc<StrategyRegistry>,
    pub webhook_verifier: Arc<SettlementWebhookVerifier>,
}

impl BillingAppState {
    /// Create handlers on demand from the shared state.
    pub fn create_transaction_handler(&self) -> CreateTransactionHandler {
        CreateTransactionHandler::new(
            self.transaction_store.clone(),
            self.purchase_store.clone(),
            self.user_directory.clone(),
            self.catalog.clone(),
            self.strategies.clone(),
        )
    }

    pub fn apply_settlement_event_handler(&self) -> ApplySettlementEventHandler {
        ApplySettlementEventHandler::new(
            self.transaction_store.clone(),
            self.purchase_store.clone(),
            self.user_directory.clone(),
        )
    }

    pub fn get_transaction_status_handler(&self) -> GetTransactionStatusHandler {
        GetTransactionStatusHandler::new(self.transaction_store.clone())
    }

    pub fn evaluate_entitlement_handler(&self) -> EvaluateEntitlementHandler {
        EvaluateEntitlementHandler::new(
            self.user_directory.clone(),
            self.catalog.clone(),
            self.purchase_store.clone(),
        )
    }
}

/// Authenticated user context extracted from the request.
///
/// In production this would be extracted from a session by auth
/// middleware; for development an `X-User-Id` header is accepted.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
}

/// Rejection type for AuthenticatedUser extraction.
pub struct AuthenticationRequired;

impl IntoResponse for AuthenticationRequired {
    fn into_response(self) -> axum::response::Response {
        let error = ErrorResponse::new("AUTHENTICATION_REQUIRED", "Authentication is required");
        (StatusCode::UNAUTHORIZED, Json(error)).into_response()
    }
}

#[async_trait::async_trait]
impl<S> axum::extract::FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthenticationRequired;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get("X-User-Id")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| UserId::new(s).ok())
            .ok_or(AuthenticationRequired)?;

        Ok(AuthenticatedUser { user_id })
    }
}

/// POST /api/transactions - Start a purchase attempt.
pub async fn create_transaction(
    State(state): State<BillingAppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreateTransactionRequest>,
) -> Result<impl IntoResponse, BillingApiError> {
    let method = PaymentMethod::from_str(&request.method).map_err(|_| {
        BillingApiError::Transaction(TransactionError::UnknownMethod {
            method: request.method.clone(),
        })
    })?;
    let currency = match request.currency {
        Some(code) => Currency::new(code)?,
        None => Currency::brl(),
    };
    let target = request.target.into_domain()?;

    let handler = state.create_transaction_handler();
    let result = handler
        .handle(CreateTransactionCommand {
            user_id: user.user_id,
            target,
            method,
            amount: Money::new(request.amount_cents, currency),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateTransactionResponse::from(result)),
    ))
}

/// GET /api/transactions/:id/status - Poll a transaction.
pub async fn get_transaction_status(
    State(state): State<BillingAppState>,
    _user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, BillingApiError> {
    let transaction_id = parse_transaction_id(&id)?;
    let handler = state.get_transaction_status_handler();

    let view = handler
        .handle(GetTransactionStatusQuery { transaction_id })
        .await?;

    Ok(Json(TransactionStatusResponse::from(view)))
}

/// GET /api/entitlement - Evaluate access to a content item.
pub async fn evaluate_entitlement(
    State(state): State<BillingAppState>,
    user: AuthenticatedUser,
    Query(params): Query<EntitlementParams>,
) -> Result<impl IntoResponse, BillingApiError> {
    let content_id = ContentId::new(params.content_id)?;
    let handler = state.evaluate_entitlement_handler();

    let decision = handler
        .handle(EvaluateEntitlementQuery {
            user_id: user.user_id,
            content_id,
        })
        .await?;

    Ok(Json(EntitlementResponse { decision }))
}

/// POST /api/webhooks/settlement/:id - Processor settlement webhook.
///
/// No user auth; authenticity comes from the HMAC signature. A valid
/// notification for an unknown transaction is still acknowledged with
/// 200 so the processor stops retrying.
pub async fn handle_settlement_webhook(
    State(state): State<BillingAppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, BillingApiError> {
    let transaction_id = parse_transaction_id(&id)?;

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(BillingApiError::Webhook(WebhookError::InvalidSignature))?;

    let notification = state.webhook_verifier.verify_and_parse(&body, signature)?;

    let handler = state.apply_settlement_event_handler();
    let outcome = handler
        .handle(ApplySettlementEventCommand {
            transaction_id,
            notification,
        })
        .await?;

    let ack = match outcome {
        WebhookIngestOutcome::Applied(s) | WebhookIngestOutcome::NoOp(s) => WebhookAckResponse {
            received: true,
            state: Some(s.as_str().to_string()),
        },
        WebhookIngestOutcome::UnknownTransaction => WebhookAckResponse {
            received: true,
            state: None,
        },
    };
    Ok(Json(ack))
}

fn parse_transaction_id(raw: &str) -> Result<TransactionId, BillingApiError> {
    TransactionId::from_str(raw).map_err(|_| {
        BillingApiError::Transaction(TransactionError::TransactionNotFound {
            transaction_id: raw.to_string(),
        })
    })
}

/// Wraps domain errors for conversion into HTTP responses.
pub enum BillingApiError {
    Transaction(TransactionError),

    /// Malformed request values rejected before any handler runs.
    Validation(ValidationError),

    /// Webhook verification failures map to 401/400 so the processor
    /// retries only genuinely transient failures.
    Webhook(WebhookError),
}

impl From<TransactionError> for BillingApiError {
    fn from(err: TransactionError) -> Self {
        Self::Transaction(err)
    }
}

impl From<WebhookError> for BillingApiError {
    fn from(err: WebhookError) -> Self {
        Self::Webhook(err)
    }
}

impl From<ValidationError> for BillingApiError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

impl IntoResponse for BillingApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_code, message) = match &self {
            BillingApiError::Transaction(err) => {
                let (status, code) = match err {
                    TransactionError::InvalidAmount { .. } => {
                        (StatusCode::BAD_REQUEST, "INVALID_AMOUNT")
                    }
                    TransactionError::UnknownMethod { .. } => {
                        (StatusCode::BAD_REQUEST, "UNKNOWN_METHOD")
                    }
                    TransactionError::UserNotFound { .. } => {
                        (StatusCode::NOT_FOUND, "USER_NOT_FOUND")
                    }
                    TransactionError::ContentNotFound { .. } => {
                        (StatusCode::NOT_FOUND, "CONTENT_NOT_FOUND")
                    }
                    TransactionError::TransactionNotFound { .. } => {
                        (StatusCode::NOT_FOUND, "TRANSACTION_NOT_FOUND")
                    }
                    TransactionError::Infrastructure(message) => {
                        warn!(%message, "request failed on infrastructure error");
                        (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
                    }
                };
                (status, code, err.to_string())
            }
            BillingApiError::Validation(err) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_FAILED", err.to_string())
            }
            BillingApiError::Webhook(err) => {
                let (status, code) = match err {
                    WebhookError::InvalidSignature => {
                        (StatusCode::UNAUTHORIZED, "INVALID_WEBHOOK_SIGNATURE")
                    }
                    WebhookError::TimestampOutOfRange => {
                        (StatusCode::UNAUTHORIZED, "WEBHOOK_TIMESTAMP_OUT_OF_RANGE")
                    }
                    WebhookError::InvalidTimestamp => {
                        (StatusCode::UNAUTHORIZED, "WEBHOOK_TIMESTAMP_INVALID")
                    }
                    WebhookError::ParseError(_) => {
                        (StatusCode::BAD_REQUEST, "WEBHOOK_PAYLOAD_INVALID")
                    }
                };
                (status, code, err.to_string())
            }
        };

        let body = ErrorResponse::new(error_code, message);
        (status, Json(body)).into_response()
    }
}
