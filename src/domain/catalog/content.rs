//! Content catalog entry.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::domain::foundation::{ContentId, Money};

use super::{PreviewPolicy, SubscriptionPlan};

/// A purchasable piece of content (course, workshop, track).
///
/// Read-only to this core; the catalog collaborator owns the records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    /// Catalog identifier.
    pub id: ContentId,

    /// Human-readable title.
    pub title: String,

    /// Individual purchase price.
    pub price: Money,

    /// Free content is accessible to everyone, always.
    pub is_free: bool,

    /// Subscription plans that grant blanket access to this content.
    pub blanket_plans: HashSet<SubscriptionPlan>,

    /// How much is visible without access.
    pub preview_policy: PreviewPolicy,
}

impl Content {
    /// Returns true if the given plan grants blanket access.
    pub fn covered_by(&self, plan: SubscriptionPlan) -> bool {
        self.blanket_plans.contains(&plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Currency;

    fn sample_content(plans: &[SubscriptionPlan]) -> Content {
        Content {
            id: ContentId::new("rust-fundamentals").unwrap(),
            title: "Rust Fundamentals".to_string(),
            price: Money::new(19900, Currency::brl()),
            is_free: false,
            blanket_plans: plans.iter().copied().collect(),
            preview_policy: PreviewPolicy::FirstUnits { units: 2 },
        }
    }

    #[test]
    fn covered_by_matches_blanket_plans() {
        let content = sample_content(&[SubscriptionPlan::Pro, SubscriptionPlan::Founder]);
        assert!(content.covered_by(SubscriptionPlan::Pro));
        assert!(content.covered_by(SubscriptionPlan::Founder));
        assert!(!content.covered_by(SubscriptionPlan::Basic));
    }

    #[test]
    fn empty_blanket_set_covers_nothing() {
        let content = sample_content(&[]);
        assert!(!content.covered_by(SubscriptionPlan::Founder));
    }
}
