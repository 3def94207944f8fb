//! Entitlement module - Access facts and the access decision.
//!
//! Holds the immutable Purchase/Revocation facts, the user's subscription
//! record, and the evaluator that turns them into an access decision.

mod account;
mod evaluator;
mod purchase;
mod subscription;

pub use account::UserAccount;
pub use evaluator::{AccessDecision, AccessLevel, AccessReason, EntitlementEvaluator};
pub use purchase::{Purchase, Revocation};
pub use subscription::{Subscription, SubscriptionStatus};
