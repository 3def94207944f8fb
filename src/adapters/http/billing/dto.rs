//! Request/response DTOs for the billing API.

use serde::{Deserialize, Serialize};

use crate::application::handlers::{CreateTransactionResult, TransactionStatusView};
use crate::domain::catalog::SubscriptionPlan;
use crate::domain::entitlement::AccessDecision;
use crate::domain::transaction::{PaymentInstructions, PurchaseTarget};
use crate::domain::foundation::{ContentId, ValidationError};

/// What the payer wants to buy.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PurchaseTargetDto {
    Content { content_id: String },
    Plan { plan: SubscriptionPlan },
}

impl PurchaseTargetDto {
    pub fn into_domain(self) -> Result<PurchaseTarget, ValidationError> {
        Ok(match self {
            PurchaseTargetDto::Content { content_id } => PurchaseTarget::Content {
                content_id: ContentId::new(content_id)?,
            },
            PurchaseTargetDto::Plan { plan } => PurchaseTarget::Plan { plan },
        })
    }
}

/// Request body for `POST /api/transactions`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTransactionRequest {
    pub target: PurchaseTargetDto,
    /// Payment rail: `card`, `pix`, `boleto` or `transfer`.
    pub method: String,
    pub amount_cents: i64,
    /// ISO 4217 code; defaults to BRL.
    #[serde(default)]
    pub currency: Option<String>,
}

/// Response for a created purchase attempt.
#[derive(Debug, Clone, Serialize)]
pub struct CreateTransactionResponse {
    pub transaction_id: String,
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<PaymentInstructions>,
}

impl From<CreateTransactionResult> for CreateTransactionResponse {
    fn from(result: CreateTransactionResult) -> Self {
        Self {
            transaction_id: result.transaction_id.to_string(),
            state: result.state.as_str().to_string(),
            instructions: result.instructions,
        }
    }
}

/// Response for `GET /api/transactions/:id/status`.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionStatusResponse {
    pub transaction_id: String,
    pub state: String,
    pub message: String,
    pub can_retry: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_poll_at: Option<String>,
}

impl From<TransactionStatusView> for TransactionStatusResponse {
    fn from(view: TransactionStatusView) -> Self {
        Self {
            transaction_id: view.transaction_id.to_string(),
            state: view.state.as_str().to_string(),
            message: view.message,
            can_retry: view.can_retry,
            next_poll_at: view.next_poll_at.map(|t| t.to_string()),
        }
    }
}

/// Query parameters for `GET /api/entitlement`.
#[derive(Debug, Clone, Deserialize)]
pub struct EntitlementParams {
    pub content_id: String,
}

/// Response for `GET /api/entitlement`.
#[derive(Debug, Clone, Serialize)]
pub struct EntitlementResponse {
    #[serde(flatten)]
    pub decision: AccessDecision,
}

/// Acknowledgement returned to the settlement processor.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookAckResponse {
    pub received: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

/// Standard error response for API errors.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
        }
    }
}
