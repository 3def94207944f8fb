//! In-memory purchase fact store.

use async_trait::async_trait;
use std::sync::RwLock;

use crate::domain::entitlement::{Purchase, Revocation};
use crate::domain::foundation::{DomainError, TransactionId, UserId};
use crate::ports::PurchaseStore;

/// Append-only purchase and revocation log backed by `Vec`s.
///
/// # Panics
///
/// Methods panic if the internal lock is poisoned.
pub struct InMemoryPurchaseStore {
    purchases: RwLock<Vec<Purchase>>,
    revocations: RwLock<Vec<Revocation>>,
}

impl InMemoryPurchaseStore {
    pub fn new() -> Self {
        Self {
            purchases: RwLock::new(Vec::new()),
            revocations: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryPurchaseStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PurchaseStore for InMemoryPurchaseStore {
    async fn append(&self, purchase: &Purchase) -> Result<(), DomainError> {
        self.purchases
            .write()
            .expect("InMemoryPurchaseStore: lock poisoned")
            .push(purchase.clone());
        Ok(())
    }

    async fn append_revocation(&self, revocation: &Revocation) -> Result<(), DomainError> {
        self.revocations
            .write()
            .expect("InMemoryPurchaseStore: lock poisoned")
            .push(revocation.clone());
        Ok(())
    }

    async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<Purchase>, DomainError> {
        Ok(self
            .purchases
            .read()
            .expect("InMemoryPurchaseStore: lock poisoned")
            .iter()
            .filter(|p| &p.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_revocations(&self, user_id: &UserId) -> Result<Vec<Revocation>, DomainError> {
        Ok(self
            .revocations
            .read()
            .expect("InMemoryPurchaseStore: lock poisoned")
            .iter()
            .filter(|r| &r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_by_transaction(
        &self,
        transaction_id: &TransactionId,
    ) -> Result<Option<Purchase>, DomainError> {
        Ok(self
            .purchases
            .read()
            .expect("InMemoryPurchaseStore: lock poisoned")
            .iter()
            .find(|p| &p.transaction_id == transaction_id)
            .cloned())
    }
}
