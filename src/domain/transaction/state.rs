//! Transaction state machine.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{StateMachine, ValidationError};

/// Current state of a purchase transaction.
///
/// Only `Pending` and `Processing` admit further transitions; everything
/// else is terminal and stays terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionState {
    /// Created, awaiting settlement (async rails) or authorization (card).
    Pending,

    /// External processor reported an intermediate settling state.
    Processing,

    /// Payment settled; the purchase fact exists.
    Succeeded,

    /// Payment declined or failed. A retry is a new transaction.
    Failed,

    /// Cancelled by the payer or the processor before settlement.
    Cancelled,

    /// The method deadline passed without settlement.
    Expired,
}

impl TransactionState {
    /// Returns true for states a caller may retry from (with a fresh
    /// transaction).
    pub fn can_retry(&self) -> bool {
        matches!(
            self,
            TransactionState::Failed | TransactionState::Cancelled | TransactionState::Expired
        )
    }

    /// Snake-case encoding used by storage and the HTTP surface.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionState::Pending => "pending",
            TransactionState::Processing => "processing",
            TransactionState::Succeeded => "succeeded",
            TransactionState::Failed => "failed",
            TransactionState::Cancelled => "cancelled",
            TransactionState::Expired => "expired",
        }
    }
}

impl std::fmt::Display for TransactionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TransactionState {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TransactionState::Pending),
            "processing" => Ok(TransactionState::Processing),
            "succeeded" => Ok(TransactionState::Succeeded),
            "failed" => Ok(TransactionState::Failed),
            "cancelled" => Ok(TransactionState::Cancelled),
            "expired" => Ok(TransactionState::Expired),
            other => Err(ValidationError::invalid_format(
                "transaction_state",
                format!("unknown state '{}'", other),
            )),
        }
    }
}

impl StateMachine for TransactionState {
    fn can_transition_to(&self, target: &Self) -> bool {
        use TransactionState::*;
        matches!(
            (self, target),
            // From PENDING
            (Pending, Processing)
                | (Pending, Succeeded)
                | (Pending, Failed)
                | (Pending, Cancelled)
                | (Pending, Expired)
            // From PROCESSING
                | (Processing, Succeeded)
                | (Processing, Failed)
                | (Processing, Cancelled)
                | (Processing, Expired)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use TransactionState::*;
        match self {
            Pending => vec![Processing, Succeeded, Failed, Cancelled, Expired],
            Processing => vec![Succeeded, Failed, Cancelled, Expired],
            Succeeded | Failed | Cancelled | Expired => vec![],
        }
    }
}
