//! UserDirectory port - User profiles and subscription activation.

use async_trait::async_trait;

use crate::domain::catalog::SubscriptionPlan;
use crate::domain::entitlement::UserAccount;
use crate::domain::foundation::{DomainError, Money, Timestamp, UserId};

/// Port for the external user directory.
///
/// Reads are plain request/response. The single write, subscription
/// activation, happens only when a plan-purchase transaction settles.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Fetches a user account by id.
    async fn get_user(&self, id: &UserId) -> Result<Option<UserAccount>, DomainError>;

    /// Activates a subscription after a settled plan purchase.
    ///
    /// `expires_at` of None means non-expiring (Founder).
    async fn activate_subscription(
        &self,
        user_id: &UserId,
        plan: SubscriptionPlan,
        amount: Money,
        expires_at: Option<Timestamp>,
    ) -> Result<(), DomainError>;
}
