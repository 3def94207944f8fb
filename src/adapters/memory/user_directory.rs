//! In-memory user directory.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::catalog::SubscriptionPlan;
use crate::domain::entitlement::{Subscription, SubscriptionStatus, UserAccount};
use crate::domain::foundation::{DomainError, ErrorCode, Money, Timestamp, UserId};
use crate::ports::UserDirectory;

/// User directory over a seeded map, for tests and local development.
///
/// # Panics
///
/// Methods panic if the internal lock is poisoned.
pub struct InMemoryUserDirectory {
    accounts: RwLock<HashMap<UserId, UserAccount>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
        }
    }

    /// Adds or replaces an account.
    pub fn seed(&self, account: UserAccount) {
        self.accounts
            .write()
            .expect("InMemoryUserDirectory: lock poisoned")
            .insert(account.id.clone(), account);
    }
}

impl Default for InMemoryUserDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn get_user(&self, id: &UserId) -> Result<Option<UserAccount>, DomainError> {
        Ok(self
            .accounts
            .read()
            .expect("InMemoryUserDirectory: lock poisoned")
            .get(id)
            .cloned())
    }

    async fn activate_subscription(
        &self,
        user_id: &UserId,
        plan: SubscriptionPlan,
        amount: Money,
        expires_at: Option<Timestamp>,
    ) -> Result<(), DomainError> {
        let mut accounts = self
            .accounts
            .write()
            .expect("InMemoryUserDirectory: lock poisoned");
        let Some(account) = accounts.get_mut(user_id) else {
            return Err(DomainError::new(
                ErrorCode::UserNotFound,
                format!("user {user_id} not found"),
            ));
        };
        account.subscription = Some(Subscription {
            plan,
            status: SubscriptionStatus::Active,
            expires_at,
            amount,
        });
        Ok(())
    }
}
