//! SettlementClient port - Synchronous card authorization.
//!
//! Stands in for the real payment gateway's charge call. Pluggable so
//! tests inject deterministic fakes instead of a coin flip.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::transaction::Transaction;

/// Result of a synchronous card authorization attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardAuthorization {
    /// Charge approved; `reference` is the gateway's charge id.
    Approved { reference: String },

    /// Charge declined with a payer-facing message.
    Declined { message: String },
}

/// Failure to reach or talk to the gateway at all.
///
/// Distinct from a decline: a decline is a settled answer, this is not.
/// The caller surfaces it as a failed transaction with `can_retry`.
#[derive(Debug, Clone, Error)]
#[error("Payment gateway error: {message}")]
pub struct GatewayError {
    pub message: String,
}

impl GatewayError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Port for the card settlement gateway.
#[async_trait]
pub trait SettlementClient: Send + Sync {
    /// Attempts to charge the card behind `transaction` synchronously.
    async fn authorize_card(
        &self,
        transaction: &Transaction,
    ) -> Result<CardAuthorization, GatewayError>;
}
