//! Deterministic settlement gateway for tests and local development.

use async_trait::async_trait;

use crate::domain::transaction::Transaction;
use crate::ports::{CardAuthorization, GatewayError, SettlementClient};

enum Behaviour {
    Approve,
    Decline { message: String },
    Unreachable,
}

/// Settlement client with a scripted outcome.
///
/// The real gateway is nondeterministic; tests instead pin one of the
/// three things a charge call can do and assert the ledger's reaction.
pub struct MockSettlementClient {
    behaviour: Behaviour,
}

impl MockSettlementClient {
    /// Approves every charge, echoing the transaction id as reference.
    pub fn approving() -> Self {
        Self {
            behaviour: Behaviour::Approve,
        }
    }

    /// Declines every charge with the given payer-facing message.
    pub fn declining(message: impl Into<String>) -> Self {
        Self {
            behaviour: Behaviour::Decline {
                message: message.into(),
            },
        }
    }

    /// Fails every call as if the gateway were down.
    pub fn unreachable() -> Self {
        Self {
            behaviour: Behaviour::Unreachable,
        }
    }
}

#[async_trait]
impl SettlementClient for MockSettlementClient {
    async fn authorize_card(
        &self,
        transaction: &Transaction,
    ) -> Result<CardAuthorization, GatewayError> {
        match &self.behaviour {
            Behaviour::Approve => Ok(CardAuthorization::Approved {
                reference: format!("auth-{}", transaction.id),
            }),
            Behaviour::Decline { message } => Ok(CardAuthorization::Declined {
                message: message.clone(),
            }),
            Behaviour::Unreachable => Err(GatewayError::new("gateway unreachable")),
        }
    }
}
