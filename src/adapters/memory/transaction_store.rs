//! In-memory transaction store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, TransactionId, UserId};
use crate::domain::transaction::{Transaction, TransactionState};
use crate::ports::{CasOutcome, TransactionStore};

/// Transaction store backed by a `HashMap` behind a `RwLock`.
///
/// The conditional update takes the write lock for the whole
/// read-compare-write, so it is atomic with respect to other callers.
///
/// # Panics
///
/// Methods panic if the internal lock is poisoned. Acceptable for test
/// and development use; production runs on the Postgres adapter.
pub struct InMemoryTransactionStore {
    records: RwLock<HashMap<TransactionId, Transaction>>,
}

impl InMemoryTransactionStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored transactions (for test assertions).
    pub fn len(&self) -> usize {
        self.records
            .read()
            .expect("InMemoryTransactionStore: lock poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryTransactionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransactionStore for InMemoryTransactionStore {
    async fn insert(&self, transaction: &Transaction) -> Result<(), DomainError> {
        let mut records = self
            .records
            .write()
            .expect("InMemoryTransactionStore: lock poisoned");
        if records.contains_key(&transaction.id) {
            return Err(DomainError::new(
                ErrorCode::DatabaseError,
                format!("duplicate transaction id {}", transaction.id),
            ));
        }
        records.insert(transaction.id, transaction.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &TransactionId) -> Result<Option<Transaction>, DomainError> {
        Ok(self
            .records
            .read()
            .expect("InMemoryTransactionStore: lock poisoned")
            .get(id)
            .cloned())
    }

    async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<Transaction>, DomainError> {
        let mut transactions: Vec<Transaction> = self
            .records
            .read()
            .expect("InMemoryTransactionStore: lock poisoned")
            .values()
            .filter(|t| &t.user_id == user_id)
            .cloned()
            .collect();
        transactions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(transactions)
    }

    async fn update_if_state(
        &self,
        transaction: &Transaction,
        expected_state: TransactionState,
    ) -> Result<CasOutcome, DomainError> {
        let mut records = self
            .records
            .write()
            .expect("InMemoryTransactionStore: lock poisoned");
        let Some(stored) = records.get_mut(&transaction.id) else {
            return Err(DomainError::new(
                ErrorCode::TransactionNotFound,
                format!("transaction {} not found", transaction.id),
            ));
        };
        if stored.state != expected_state {
            return Ok(CasOutcome::StateConflict {
                actual: stored.state,
            });
        }
        *stored = transaction.clone();
        Ok(CasOutcome::Applied)
    }
}
