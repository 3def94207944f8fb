//! Subscription plan definitions.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Subscription plan tier.
///
/// Users without a subscription record are on no plan at all; there is
/// no implicit free tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionPlan {
    /// Entry plan - access to basic-tier courses only.
    Basic,

    /// Pro plan - access to the full course library.
    Pro,

    /// Founder plan - lifetime pro access, granted to early supporters.
    Founder,
}

impl SubscriptionPlan {
    /// Returns the display name for this plan.
    pub fn display_name(&self) -> &'static str {
        match self {
            SubscriptionPlan::Basic => "Basic",
            SubscriptionPlan::Pro => "Pro",
            SubscriptionPlan::Founder => "Founder",
        }
    }

    /// Returns the numeric rank of this plan for comparison.
    ///
    /// Higher rank = broader blanket access.
    pub fn rank(&self) -> u8 {
        match self {
            SubscriptionPlan::Basic => 0,
            SubscriptionPlan::Pro => 1,
            SubscriptionPlan::Founder => 2,
        }
    }
}

impl std::fmt::Display for SubscriptionPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for SubscriptionPlan {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "basic" => Ok(SubscriptionPlan::Basic),
            "pro" => Ok(SubscriptionPlan::Pro),
            "founder" => Ok(SubscriptionPlan::Founder),
            other => Err(ValidationError::invalid_format(
                "plan",
                format!("unknown plan '{}'", other),
            )),
        }
    }
}
