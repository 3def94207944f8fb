//! Transaction history events.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::foundation::{IdempotencyKey, Timestamp, ValidationError};

use super::TransactionState;

/// Terminal outcome reported by the external processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettlementOutcome {
    Succeeded,
    Failed,
    Cancelled,
}

impl SettlementOutcome {
    /// The ledger state this outcome lands the transaction in.
    pub fn target_state(&self) -> TransactionState {
        match self {
            SettlementOutcome::Succeeded => TransactionState::Succeeded,
            SettlementOutcome::Failed => TransactionState::Failed,
            SettlementOutcome::Cancelled => TransactionState::Cancelled,
        }
    }
}

impl FromStr for SettlementOutcome {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "succeeded" => Ok(SettlementOutcome::Succeeded),
            "failed" => Ok(SettlementOutcome::Failed),
            "cancelled" => Ok(SettlementOutcome::Cancelled),
            other => Err(ValidationError::invalid_format(
                "outcome",
                format!("unknown outcome '{}'", other),
            )),
        }
    }
}

/// What caused a state-change event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransitionCause {
    /// Transaction created by a purchase attempt.
    Created,

    /// Card gateway approved the charge synchronously.
    GatewayApproved { reference: String },

    /// Card gateway declined the charge synchronously.
    GatewayDeclined { message: String },

    /// Asynchronous settlement notification from the processor.
    ExternalNotification {
        idempotency_key: IdempotencyKey,
        reference: Option<String>,
    },

    /// The method deadline passed; observed at read time.
    DeadlinePassed,
}

/// One entry in a transaction's append-only history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionEvent {
    /// When the transition was applied.
    pub at: Timestamp,

    /// State after the transition.
    pub to: TransactionState,

    /// Why the transition happened.
    pub cause: TransitionCause,
}

impl TransactionEvent {
    pub fn new(at: Timestamp, to: TransactionState, cause: TransitionCause) -> Self {
        Self { at, to, cause }
    }

    /// Idempotency key carried by this event, if it came from an
    /// external notification.
    pub fn idempotency_key(&self) -> Option<&IdempotencyKey> {
        match &self.cause {
            TransitionCause::ExternalNotification { idempotency_key, .. } => {
                Some(idempotency_key)
            }
            _ => None,
        }
    }
}
