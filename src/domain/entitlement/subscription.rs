//! Subscription record with lazy expiry.

use serde::{Deserialize, Serialize};

use crate::domain::catalog::SubscriptionPlan;
use crate::domain::foundation::{Money, Timestamp};

/// Stored lifecycle status of a subscription.
///
/// The stored status alone does not decide access: an Active record with
/// a past `expires_at` counts as inactive at read time (lazy expiry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Subscription is current (subject to lazy expiry).
    Active,

    /// User cancelled; no blanket access.
    Cancelled,

    /// Subscription ended.
    Expired,
}

/// A user's subscription record.
///
/// Mutated only by successful plan-purchase settlement or by external
/// cancellation events; never by the evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Plan tier.
    pub plan: SubscriptionPlan,

    /// Stored lifecycle status.
    pub status: SubscriptionStatus,

    /// When the subscription lapses. None means non-expiring (Founder).
    pub expires_at: Option<Timestamp>,

    /// Recurring amount charged for this subscription.
    pub amount: Money,
}

impl Subscription {
    /// Returns true if this subscription grants blanket access at `now`.
    ///
    /// Applies lazy expiry: no background job flips stale records to
    /// Expired, so the deadline comparison happens on every read.
    pub fn is_active_at(&self, now: Timestamp) -> bool {
        if self.status != SubscriptionStatus::Active {
            return false;
        }
        match self.expires_at {
            Some(deadline) => !now.is_after(&deadline),
            None => true,
        }
    }
}
