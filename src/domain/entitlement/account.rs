//! User account record.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::UserId;

use super::Subscription;

/// A user as seen through the external user directory.
///
/// Read-only to this core, except that a successful plan purchase
/// activates the subscription through the directory port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    /// Directory identifier.
    pub id: UserId,

    /// Display name.
    pub display_name: String,

    /// Contact email.
    pub email: String,

    /// Current subscription, if any.
    pub subscription: Option<Subscription>,
}
