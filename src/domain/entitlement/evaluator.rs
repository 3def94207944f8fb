//! Entitlement evaluation.
//!
//! Pure decision logic over already-committed facts. Safe to call on
//! every content-serving request: no side effects, no locks, and the
//! result is fully determined by its inputs (so collaborators may cache).

use serde::{Deserialize, Serialize};

use crate::domain::catalog::Content;
use crate::domain::foundation::Timestamp;

use super::{Purchase, Revocation, UserAccount};

/// Level of access granted to a piece of content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    /// Full access to the whole content.
    Full,

    /// Only the preview units are visible.
    Preview,

    /// No access at all.
    Denied,
}

/// Why the access level was granted or withheld.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum AccessReason {
    /// The content is free for everyone.
    FreeContent,

    /// The user holds an unrevoked purchase of this content.
    Purchased,

    /// An active subscription plan blankets this content.
    Subscription,

    /// Denied, but the preview policy exposes some units.
    PreviewAvailable {
        /// Number of lesson units visible without access.
        visible_units: u32,
    },

    /// No purchase, no covering subscription, no preview.
    NoAccess,
}

/// Outcome of an entitlement evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessDecision {
    pub level: AccessLevel,
    pub reason: AccessReason,
}

impl AccessDecision {
    fn full(reason: AccessReason) -> Self {
        Self {
            level: AccessLevel::Full,
            reason,
        }
    }
}

/// Computes access decisions from purchase facts and subscription state.
///
/// Stateless; the caller assembles the facts (typically from the purchase
/// store and the user directory) and passes them in.
#[derive(Debug, Default, Clone, Copy)]
pub struct EntitlementEvaluator;

impl EntitlementEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// Evaluates access for `user` to `content` at instant `now`.
    ///
    /// Rules in order, first match wins:
    /// 1. Free content is always fully accessible.
    /// 2. An unrevoked purchase grants full access.
    /// 3. An active subscription on a blanket plan grants full access
    ///    (lazy expiry applies; see [`Subscription::is_active_at`]).
    /// 4. A preview policy with visible units downgrades denial to preview.
    /// 5. Otherwise access is denied.
    ///
    /// [`Subscription::is_active_at`]: super::Subscription::is_active_at
    pub fn evaluate(
        &self,
        user: &UserAccount,
        content: &Content,
        purchases: &[Purchase],
        revocations: &[Revocation],
        now: Timestamp,
    ) -> AccessDecision {
        if content.is_free {
            return AccessDecision::full(AccessReason::FreeContent);
        }

        if self.has_standing_purchase(content, purchases, revocations) {
            return AccessDecision::full(AccessReason::Purchased);
        }

        if let Some(subscription) = &user.subscription {
            if content.covered_by(subscription.plan) && subscription.is_active_at(now) {
                return AccessDecision::full(AccessReason::Subscription);
            }
        }

        if let Some(visible_units) = content.preview_policy.visible_units() {
            return AccessDecision {
                level: AccessLevel::Preview,
                reason: AccessReason::PreviewAvailable { visible_units },
            };
        }

        AccessDecision {
            level: AccessLevel::Denied,
            reason: AccessReason::NoAccess,
        }
    }

    /// True if at least one purchase of this content is not revoked.
    ///
    /// Revocations are matched per transaction, so a repeat purchase
    /// survives the revocation of an earlier one.
    fn has_standing_purchase(
        &self,
        content: &Content,
        purchases: &[Purchase],
        revocations: &[Revocation],
    ) -> bool {
        purchases
            .iter()
            .filter(|p| p.content_id == content.id)
            .any(|p| {
                !revocations
                    .iter()
                    .any(|r| r.transaction_id == p.transaction_id)
            })
    }
}
