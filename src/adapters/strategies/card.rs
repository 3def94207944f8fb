//! Card payment strategy.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::domain::foundation::DomainError;
use crate::domain::transaction::{PaymentInstructions, PaymentMethod, Transaction};
use crate::ports::{
    CardAuthorization, Initiation, MethodDescriptor, PaymentStrategy, SettlementClient,
};

/// Synchronous card rail.
///
/// The only strategy that talks to an external system at initiation:
/// it charges through the settlement gateway and hands the outcome back
/// as data for the caller to apply. An unreachable gateway is reported
/// as a decline so the payer sees a retryable failure rather than a
/// transaction stuck pending.
pub struct CardStrategy {
    settlement_client: Arc<dyn SettlementClient>,
}

impl CardStrategy {
    pub fn new(settlement_client: Arc<dyn SettlementClient>) -> Self {
        Self { settlement_client }
    }
}

#[async_trait]
impl PaymentStrategy for CardStrategy {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::Card
    }

    async fn initiate(&self, transaction: &Transaction) -> Result<Initiation, DomainError> {
        let authorization = match self.settlement_client.authorize_card(transaction).await {
            Ok(authorization) => authorization,
            Err(err) => {
                warn!(
                    transaction_id = %transaction.id,
                    error = %err,
                    "card gateway unreachable, treating charge as declined"
                );
                CardAuthorization::Declined {
                    message: "Payment could not be processed. Please try again.".to_string(),
                }
            }
        };

        let external_reference = match &authorization {
            CardAuthorization::Approved { reference } => reference.clone(),
            CardAuthorization::Declined { .. } => format!("card-{}", transaction.id),
        };

        Ok(Initiation {
            instructions: PaymentInstructions::CardReceipt {
                receipt_reference: external_reference.clone(),
            },
            external_reference,
            synchronous_outcome: Some(authorization),
        })
    }

    fn describe(&self) -> MethodDescriptor {
        MethodDescriptor {
            method: PaymentMethod::Card,
            processing_estimate: PaymentMethod::Card.processing_estimate().to_string(),
            retryable: true,
        }
    }
}
