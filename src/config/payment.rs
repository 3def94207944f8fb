//! Payment configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Payment configuration (settlement processor)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentConfig {
    /// Shared secret for verifying settlement webhook signatures
    pub webhook_secret: String,
}

impl PaymentConfig {
    /// Validate payment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.webhook_secret.is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__WEBHOOK_SECRET"));
        }
        // HMAC-SHA256 secrets shorter than this are guessable
        if self.webhook_secret.len() < 16 {
            return Err(ValidationError::WebhookSecretTooShort);
        }
        Ok(())
    }
}
