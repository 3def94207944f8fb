//! ApplySettlementEventHandler - Webhook ingest for async rails.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::foundation::{Timestamp, TransactionId};
use crate::domain::transaction::{
    SettlementNotification, Transaction, TransactionError, TransactionState, WebhookApplication,
};
use crate::ports::{CasOutcome, PurchaseStore, TransactionStore, UserDirectory};

use super::fulfillment::fulfill;

/// Command carrying one verified settlement notification.
#[derive(Debug, Clone)]
pub struct ApplySettlementEventCommand {
    pub transaction_id: TransactionId,
    pub notification: SettlementNotification,
}

/// How the notification was absorbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookIngestOutcome {
    /// The notification transitioned the transaction into this state.
    Applied(TransactionState),

    /// Terminal transaction or duplicate delivery; state unchanged.
    NoOp(TransactionState),

    /// The transaction id is unknown. Logged and discarded; the
    /// processor cannot act on an error it did not cause.
    UnknownTransaction,
}

/// Handler for asynchronous settlement notifications.
///
/// Idempotency is enforced twice over: the aggregate refuses terminal
/// and duplicate-key events, and the store's compare-and-set refuses to
/// persist over a concurrent transition. Losers of the race reload and
/// report the winner's state.
pub struct ApplySettlementEventHandler {
    transaction_store: Arc<dyn TransactionStore>,
    purchase_store: Arc<dyn PurchaseStore>,
    user_directory: Arc<dyn UserDirectory>,
}

impl ApplySettlementEventHandler {
    pub fn new(
        transaction_store: Arc<dyn TransactionStore>,
        purchase_store: Arc<dyn PurchaseStore>,
        user_directory: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            transaction_store,
            purchase_store,
            user_directory,
        }
    }

    pub async fn handle(
        &self,
        command: ApplySettlementEventCommand,
    ) -> Result<WebhookIngestOutcome, TransactionError> {
        let Some(mut transaction) = self
            .transaction_store
            .find_by_id(&command.transaction_id)
            .await
            .map_err(|e| TransactionError::infrastructure(e.to_string()))?
        else {
            warn!(
                transaction_id = %command.transaction_id,
                idempotency_key = %command.notification.idempotency_key,
                "settlement notification for unknown transaction discarded"
            );
            return Ok(WebhookIngestOutcome::UnknownTransaction);
        };

        loop {
            let now = Timestamp::now();
            let prior_state = transaction.state;

            // A deadline that passed before the notification arrived wins:
            // the webhook then hits a terminal record and no-ops.
            if transaction.expire_if_due(now) {
                match self.persist(&transaction, prior_state).await? {
                    CasOutcome::Applied => {
                        info!(
                            transaction_id = %transaction.id,
                            "transaction expired before settlement notification"
                        );
                    }
                    CasOutcome::StateConflict { .. } => {
                        transaction = self.reload(&command.transaction_id).await?;
                        continue;
                    }
                }
                return Ok(WebhookIngestOutcome::NoOp(transaction.state));
            }

            let application = transaction
                .apply_external_event(
                    command.notification.outcome,
                    command.notification.idempotency_key.clone(),
                    command.notification.external_reference.clone(),
                    now,
                )?;

            match application {
                WebhookApplication::Applied(new_state) => {
                    match self.persist(&transaction, prior_state).await? {
                        CasOutcome::Applied => {
                            if new_state == TransactionState::Succeeded {
                                fulfill(
                                    &transaction,
                                    &self.purchase_store,
                                    &self.user_directory,
                                    now,
                                )
                                .await
                                .map_err(|e| TransactionError::infrastructure(e.to_string()))?;
                            }
                            info!(
                                transaction_id = %transaction.id,
                                state = %new_state,
                                idempotency_key = %command.notification.idempotency_key,
                                "settlement notification applied"
                            );
                            return Ok(WebhookIngestOutcome::Applied(new_state));
                        }
                        CasOutcome::StateConflict { .. } => {
                            transaction = self.reload(&command.transaction_id).await?;
                            continue;
                        }
                    }
                }
                WebhookApplication::AlreadyTerminal(state)
                | WebhookApplication::Duplicate(state) => {
                    info!(
                        transaction_id = %transaction.id,
                        state = %state,
                        idempotency_key = %command.notification.idempotency_key,
                        "settlement notification discarded as no-op"
                    );
                    return Ok(WebhookIngestOutcome::NoOp(state));
                }
            }
        }
    }

    async fn persist(
        &self,
        transaction: &Transaction,
        expected: TransactionState,
    ) -> Result<CasOutcome, TransactionError> {
        self.transaction_store
            .update_if_state(transaction, expected)
            .await
            .map_err(|e| TransactionError::infrastructure(e.to_string()))
    }

    async fn reload(&self, id: &TransactionId) -> Result<Transaction, TransactionError> {
        self.transaction_store
            .find_by_id(id)
            .await
            .map_err(|e| TransactionError::infrastructure(e.to_string()))?
            .ok_or_else(|| TransactionError::TransactionNotFound {
                transaction_id: id.to_string(),
            })
    }
}
