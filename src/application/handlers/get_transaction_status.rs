//! GetTransactionStatusHandler - Polling surface for async rails.
//!
//! Reads double as the expiry sweep: a poll that finds the rail
//! deadline in the past persists the expiry before answering, so no
//! background job is needed to keep the ledger honest.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::domain::foundation::{StateMachine, Timestamp, TransactionId};
use crate::domain::transaction::{Transaction, TransactionError, TransactionState};
use crate::ports::{CasOutcome, TransactionStore};

#[derive(Debug, Clone)]
pub struct GetTransactionStatusQuery {
    pub transaction_id: TransactionId,
}

/// What a polling client sees.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TransactionStatusView {
    pub transaction_id: TransactionId,
    pub state: TransactionState,
    pub message: String,
    pub can_retry: bool,
    /// Suggested next poll time. Absent once the transaction is terminal.
    pub next_poll_at: Option<Timestamp>,
}

pub struct GetTransactionStatusHandler {
    transaction_store: Arc<dyn TransactionStore>,
}

impl GetTransactionStatusHandler {
    pub fn new(transaction_store: Arc<dyn TransactionStore>) -> Self {
        Self { transaction_store }
    }

    pub async fn handle(
        &self,
        query: GetTransactionStatusQuery,
    ) -> Result<TransactionStatusView, TransactionError> {
        let mut transaction = self.load(&query.transaction_id).await?;
        let now = Timestamp::now();

        let prior_state = transaction.state;
        if transaction.expire_if_due(now) {
            match self
                .transaction_store
                .update_if_state(&transaction, prior_state)
                .await
                .map_err(|e| TransactionError::infrastructure(e.to_string()))?
            {
                CasOutcome::Applied => {
                    info!(
                        transaction_id = %transaction.id,
                        "transaction expired on status poll"
                    );
                }
                // A settlement raced us to the record. Its state wins.
                CasOutcome::StateConflict { .. } => {
                    transaction = self.load(&query.transaction_id).await?;
                }
            }
        }

        Ok(Self::view(&transaction, now))
    }

    fn view(transaction: &Transaction, now: Timestamp) -> TransactionStatusView {
        let next_poll_at = if transaction.state.is_terminal() {
            None
        } else {
            transaction
                .method
                .poll_interval()
                .map(|interval| now.plus(interval))
        };
        TransactionStatusView {
            transaction_id: transaction.id,
            state: transaction.state,
            message: Self::message(transaction),
            can_retry: transaction.state.can_retry(),
            next_poll_at,
        }
    }

    fn message(transaction: &Transaction) -> String {
        match transaction.state {
            TransactionState::Pending => format!(
                "Awaiting payment. Processing usually takes {}.",
                transaction.method.processing_estimate()
            ),
            TransactionState::Processing => "Payment received, settlement in progress.".to_string(),
            TransactionState::Succeeded => "Payment confirmed.".to_string(),
            TransactionState::Failed => "Payment failed. You may try again.".to_string(),
            TransactionState::Cancelled => "Payment cancelled. You may try again.".to_string(),
            TransactionState::Expired => {
                "Payment window expired. You may start a new payment.".to_string()
            }
        }
    }

    async fn load(&self, id: &TransactionId) -> Result<Transaction, TransactionError> {
        self.transaction_store
            .find_by_id(id)
            .await
            .map_err(|e| TransactionError::infrastructure(e.to_string()))?
            .ok_or_else(|| TransactionError::TransactionNotFound {
                transaction_id: id.to_string(),
            })
    }
}
