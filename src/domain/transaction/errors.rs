//! Transaction-specific operation errors.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode};

/// Errors surfaced by ledger operations.
///
/// Validation failures never create a Transaction record; state
/// conflicts are resolved by idempotent no-ops elsewhere and do not
/// appear here.
#[derive(Debug, Clone, Error)]
pub enum TransactionError {
    #[error("Amount must be positive, got {cents} cents")]
    InvalidAmount { cents: i64 },

    #[error("Unsupported payment method '{method}'")]
    UnknownMethod { method: String },

    #[error("User '{user_id}' not found")]
    UserNotFound { user_id: String },

    #[error("Content '{content_id}' not found")]
    ContentNotFound { content_id: String },

    #[error("Transaction '{transaction_id}' not found")]
    TransactionNotFound { transaction_id: String },

    #[error("Infrastructure failure: {0}")]
    Infrastructure(String),
}

impl TransactionError {
    pub fn infrastructure(message: impl Into<String>) -> Self {
        TransactionError::Infrastructure(message.into())
    }
}

impl From<TransactionError> for DomainError {
    fn from(err: TransactionError) -> Self {
        let code = match &err {
            TransactionError::InvalidAmount { .. } => ErrorCode::InvalidAmount,
            TransactionError::UnknownMethod { .. } => ErrorCode::UnknownMethod,
            TransactionError::UserNotFound { .. } => ErrorCode::UserNotFound,
            TransactionError::ContentNotFound { .. } => ErrorCode::ContentNotFound,
            TransactionError::TransactionNotFound { .. } => ErrorCode::TransactionNotFound,
            TransactionError::Infrastructure(_) => ErrorCode::InternalError,
        };
        DomainError::new(code, err.to_string())
    }
}
