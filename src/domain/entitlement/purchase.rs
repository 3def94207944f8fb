//! Purchase and Revocation facts.
//!
//! Purchases are immutable history: a refund appends a Revocation fact
//! instead of deleting anything.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ContentId, Timestamp, TransactionId, UserId};

/// Immutable fact: a user acquired a piece of content.
///
/// Created exactly once, when the owning Transaction reaches the
/// terminal success state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purchase {
    /// Buyer.
    pub user_id: UserId,

    /// Acquired content.
    pub content_id: ContentId,

    /// Transaction that settled this purchase.
    pub transaction_id: TransactionId,

    /// When settlement completed.
    pub acquired_at: Timestamp,
}

impl Purchase {
    /// Records a settled purchase.
    pub fn record(
        user_id: UserId,
        content_id: ContentId,
        transaction_id: TransactionId,
        acquired_at: Timestamp,
    ) -> Self {
        Self {
            user_id,
            content_id,
            transaction_id,
            acquired_at,
        }
    }
}

/// Immutable fact: a previously settled purchase was revoked (refund,
/// chargeback). The Purchase fact itself stays in history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revocation {
    /// Affected user.
    pub user_id: UserId,

    /// Revoked content.
    pub content_id: ContentId,

    /// Transaction whose purchase is revoked.
    pub transaction_id: TransactionId,

    /// When the revocation was recorded.
    pub revoked_at: Timestamp,

    /// Operator-supplied reason.
    pub reason: String,
}
