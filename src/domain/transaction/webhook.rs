//! Settlement webhook signature verification.
//!
//! The external processor signs every notification with HMAC-SHA256 over
//! `"<timestamp>.<payload>"` and sends the result in a signature header.
//! Verification happens before the ledger is touched; a bad signature
//! never reaches `apply_external_event`.

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::domain::foundation::{IdempotencyKey, ValidationError};

use super::SettlementOutcome;

/// Maximum allowed age for webhook notifications (5 minutes).
const MAX_NOTIFICATION_AGE_SECS: i64 = 300;

/// Maximum allowed clock skew for future notifications (1 minute).
const MAX_CLOCK_SKEW_SECS: i64 = 60;

/// Errors from webhook verification and parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebhookError {
    #[error("Webhook signature verification failed")]
    InvalidSignature,

    #[error("Webhook notification is too old")]
    TimestampOutOfRange,

    #[error("Webhook timestamp is in the future")]
    InvalidTimestamp,

    #[error("Failed to parse webhook: {0}")]
    ParseError(String),
}

impl From<ValidationError> for WebhookError {
    fn from(err: ValidationError) -> Self {
        WebhookError::ParseError(err.to_string())
    }
}

/// Parsed components of the signature header.
///
/// Format: `t=<unix-timestamp>,v1=<hex signature>`. Unknown fields are
/// ignored for forward compatibility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    /// Unix timestamp when the signature was generated.
    pub timestamp: i64,
    /// HMAC-SHA256 signature bytes.
    pub v1_signature: Vec<u8>,
}

impl SignatureHeader {
    /// Parses a signature header string.
    pub fn parse(header: &str) -> Result<Self, WebhookError> {
        let mut timestamp: Option<i64> = None;
        let mut v1_signature: Option<Vec<u8>> = None;

        for part in header.split(',') {
            let (key, value) = part
                .split_once('=')
                .ok_or_else(|| WebhookError::ParseError("invalid header format".to_string()))?;

            match key {
                "t" => {
                    timestamp = Some(value.parse().map_err(|_| {
                        WebhookError::ParseError("invalid timestamp".to_string())
                    })?);
                }
                "v1" => {
                    v1_signature = Some(hex::decode(value).map_err(|_| {
                        WebhookError::ParseError("invalid v1 signature hex".to_string())
                    })?);
                }
                _ => {
                    // Ignore unknown fields for forward compatibility
                }
            }
        }

        let timestamp =
            timestamp.ok_or_else(|| WebhookError::ParseError("missing timestamp".to_string()))?;
        let v1_signature = v1_signature
            .ok_or_else(|| WebhookError::ParseError("missing v1 signature".to_string()))?;

        Ok(SignatureHeader {
            timestamp,
            v1_signature,
        })
    }
}

/// A verified settlement notification payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementNotification {
    /// Processor-assigned delivery id; the idempotency key.
    pub idempotency_key: IdempotencyKey,

    /// Terminal outcome the processor reports.
    pub outcome: SettlementOutcome,

    /// Processor-side reference for reconciliation.
    #[serde(default)]
    pub external_reference: Option<String>,
}

/// Verifier for settlement webhook signatures.
pub struct SettlementWebhookVerifier {
    /// Shared signing secret agreed with the processor.
    secret: String,
}

impl SettlementWebhookVerifier {
    /// Creates a new verifier with the given signing secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Verifies the signature and parses the notification.
    ///
    /// # Verification Steps
    ///
    /// 1. Parse the signature header
    /// 2. Validate the timestamp is within the replay window
    /// 3. Compute the expected signature with HMAC-SHA256
    /// 4. Compare signatures in constant time
    /// 5. Parse the JSON payload
    pub fn verify_and_parse(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<SettlementNotification, WebhookError> {
        let header = SignatureHeader::parse(signature_header)?;

        self.validate_timestamp(header.timestamp)?;

        let expected_signature = self.compute_signature(header.timestamp, payload);
        if !constant_time_compare(&expected_signature, &header.v1_signature) {
            return Err(WebhookError::InvalidSignature);
        }

        let notification: SettlementNotification = serde_json::from_slice(payload)
            .map_err(|e| WebhookError::ParseError(e.to_string()))?;

        Ok(notification)
    }

    /// Validates that the timestamp is within acceptable bounds.
    fn validate_timestamp(&self, timestamp: i64) -> Result<(), WebhookError> {
        let now = chrono::Utc::now().timestamp();
        let age = now - timestamp;

        if age > MAX_NOTIFICATION_AGE_SECS {
            return Err(WebhookError::TimestampOutOfRange);
        }
        if age < -MAX_CLOCK_SKEW_SECS {
            return Err(WebhookError::InvalidTimestamp);
        }

        Ok(())
    }

    /// Computes the HMAC-SHA256 signature for the timestamp and payload.
    fn compute_signature(&self, timestamp: i64, payload: &[u8]) -> Vec<u8> {
        let signed_payload = format!("{}.{}", timestamp, String::from_utf8_lossy(payload));

        let mut mac =
            Hmac::<Sha256>::new_from_slice(self.secret.as_bytes()).expect("HMAC accepts any key");
        mac.update(signed_payload.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }
}

/// Constant-time comparison of two byte slices.
///
/// Prevents timing attacks that could leak the expected signature.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Computes a valid signature header value for test fixtures.
#[cfg(test)]
pub fn sign_test_payload(secret: &str, timestamp: i64, payload: &str) -> String {
    let signed_payload = format!("{}.{}", timestamp, payload);
    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key");
    mac.update(signed_payload.as_bytes());
    format!("t={},v1={}", timestamp, hex::encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "whsec_settlement_test_secret";

    fn valid_payload() -> String {
        r#"{"idempotency_key":"evt_42","outcome":"succeeded","external_reference":"pix-ref-1"}"#
            .to_string()
    }

    #[test]
    fn parse_header_extracts_timestamp_and_signature() {
        let signature = "a".repeat(64);
        let header = SignatureHeader::parse(&format!("t=1700000000,v1={}", signature)).unwrap();
        assert_eq!(header.timestamp, 1700000000);
        assert_eq!(header.v1_signature.len(), 32);
    }

    #[test]
    fn parse_header_ignores_unknown_fields() {
        let signature = "a".repeat(64);
        let header =
            SignatureHeader::parse(&format!("t=1700000000,v1={},scheme=hmac", signature)).unwrap();
        assert_eq!(header.timestamp, 1700000000);
    }

    #[test]
    fn parse_header_missing_timestamp_fails() {
        let result = SignatureHeader::parse(&format!("v1={}", "a".repeat(64)));
        assert!(matches!(result, Err(WebhookError::ParseError(_))));
    }

    #[test]
    fn parse_header_missing_signature_fails() {
        let result = SignatureHeader::parse("t=1700000000");
        assert!(matches!(result, Err(WebhookError::ParseError(_))));
    }

    #[test]
    fn parse_header_rejects_bad_hex() {
        let result = SignatureHeader::parse("t=1700000000,v1=zzzz");
        assert!(matches!(result, Err(WebhookError::ParseError(_))));
    }

    #[test]
    fn valid_signature_verifies_and_parses() {
        let verifier = SettlementWebhookVerifier::new(TEST_SECRET);
        let payload = valid_payload();
        let now = chrono::Utc::now().timestamp();
        let header = sign_test_payload(TEST_SECRET, now, &payload);

        let notification = verifier.verify_and_parse(payload.as_bytes(), &header).unwrap();

        assert_eq!(notification.idempotency_key.as_str(), "evt_42");
        assert_eq!(notification.outcome, SettlementOutcome::Succeeded);
        assert_eq!(notification.external_reference.as_deref(), Some("pix-ref-1"));
    }

    #[test]
    fn wrong_secret_fails_verification() {
        let verifier = SettlementWebhookVerifier::new(TEST_SECRET);
        let payload = valid_payload();
        let now = chrono::Utc::now().timestamp();
        let header = sign_test_payload("whsec_other_secret", now, &payload);

        let result = verifier.verify_and_parse(payload.as_bytes(), &header);
        assert_eq!(result, Err(WebhookError::InvalidSignature));
    }

    #[test]
    fn tampered_payload_fails_verification() {
        let verifier = SettlementWebhookVerifier::new(TEST_SECRET);
        let payload = valid_payload();
        let now = chrono::Utc::now().timestamp();
        let header = sign_test_payload(TEST_SECRET, now, &payload);

        let tampered = payload.replace("succeeded", "failed");
        let result = verifier.verify_and_parse(tampered.as_bytes(), &header);
        assert_eq!(result, Err(WebhookError::InvalidSignature));
    }

    #[test]
    fn stale_notification_is_rejected() {
        let verifier = SettlementWebhookVerifier::new(TEST_SECRET);
        let payload = valid_payload();
        let stale = chrono::Utc::now().timestamp() - MAX_NOTIFICATION_AGE_SECS - 10;
        let header = sign_test_payload(TEST_SECRET, stale, &payload);

        let result = verifier.verify_and_parse(payload.as_bytes(), &header);
        assert_eq!(result, Err(WebhookError::TimestampOutOfRange));
    }

    #[test]
    fn future_notification_is_rejected() {
        let verifier = SettlementWebhookVerifier::new(TEST_SECRET);
        let payload = valid_payload();
        let future = chrono::Utc::now().timestamp() + MAX_CLOCK_SKEW_SECS + 10;
        let header = sign_test_payload(TEST_SECRET, future, &payload);

        let result = verifier.verify_and_parse(payload.as_bytes(), &header);
        assert_eq!(result, Err(WebhookError::InvalidTimestamp));
    }

    #[test]
    fn malformed_json_with_valid_signature_is_a_parse_error() {
        let verifier = SettlementWebhookVerifier::new(TEST_SECRET);
        let payload = "{not json";
        let now = chrono::Utc::now().timestamp();
        let header = sign_test_payload(TEST_SECRET, now, payload);

        let result = verifier.verify_and_parse(payload.as_bytes(), &header);
        assert!(matches!(result, Err(WebhookError::ParseError(_))));
    }
}
