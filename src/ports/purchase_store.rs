//! PurchaseStore port - Append-only access facts.

use async_trait::async_trait;

use crate::domain::entitlement::{Purchase, Revocation};
use crate::domain::foundation::{DomainError, TransactionId, UserId};

/// Port for purchase and revocation fact storage.
///
/// Facts are never deleted. Multiplicity is allowed per
/// `(user_id, content_id)`; at-most-one purchase per transaction is the
/// only uniqueness rule.
#[async_trait]
pub trait PurchaseStore: Send + Sync {
    /// Appends a purchase fact.
    async fn append(&self, purchase: &Purchase) -> Result<(), DomainError>;

    /// Appends a revocation fact.
    async fn append_revocation(&self, revocation: &Revocation) -> Result<(), DomainError>;

    /// All purchase facts for a user.
    async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<Purchase>, DomainError>;

    /// All revocation facts for a user.
    async fn list_revocations(&self, user_id: &UserId) -> Result<Vec<Revocation>, DomainError>;

    /// The purchase created by a specific transaction, if any.
    ///
    /// Settlement uses this as the at-most-once guard before appending.
    async fn find_by_transaction(
        &self,
        transaction_id: &TransactionId,
    ) -> Result<Option<Purchase>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn purchase_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn PurchaseStore) {}
    }
}
