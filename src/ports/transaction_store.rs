//! TransactionStore port - Durable transaction persistence.
//!
//! The ledger's terminal-state guarantee depends on this port providing
//! an atomic conditional update (compare-and-set on state), not merely
//! last-write-wins. Concurrent passive-expiry reads and webhooks race on
//! the same record; whichever transition lands first wins and everyone
//! else must observe the conflict.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, TransactionId, UserId};
use crate::domain::transaction::{Transaction, TransactionState};

/// Outcome of a conditional state update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CasOutcome {
    /// The stored state matched and the update was applied.
    Applied,

    /// Another writer got there first; `actual` is the stored state.
    StateConflict { actual: TransactionState },
}

/// Port for transaction record storage.
///
/// Keyed by transaction id with a secondary index on user id.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Persists a newly created transaction.
    ///
    /// Ids are generated fresh at creation, so collisions indicate a bug
    /// and surface as `DatabaseError`.
    async fn insert(&self, transaction: &Transaction) -> Result<(), DomainError>;

    /// Loads a transaction by id.
    async fn find_by_id(&self, id: &TransactionId) -> Result<Option<Transaction>, DomainError>;

    /// Lists all transactions for a user, newest first.
    async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<Transaction>, DomainError>;

    /// Persists `transaction` only if the stored state still equals
    /// `expected_state`.
    ///
    /// Returns `StateConflict` with the stored state when another writer
    /// already transitioned the record. Callers treat a conflict on an
    /// already-terminal record as convergence, not failure.
    async fn update_if_state(
        &self,
        transaction: &Transaction,
        expected_state: TransactionState,
    ) -> Result<CasOutcome, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn TransactionStore) {}
    }
}
