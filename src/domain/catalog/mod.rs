//! Catalog module - Content and subscription plan definitions.
//!
//! The catalog itself lives in an external collaborator; these types are
//! the read-side vocabulary this core needs to price content and decide
//! blanket access.

mod content;
mod plan;
mod preview;

pub use content::Content;
pub use plan::SubscriptionPlan;
pub use preview::PreviewPolicy;
