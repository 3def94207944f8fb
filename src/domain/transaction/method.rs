//! Payment rail definitions.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Payment rail used for a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Credit/debit card, authorized synchronously at creation.
    Card,

    /// PIX instant transfer. Settles within minutes via webhook.
    Pix,

    /// Boleto bank slip. Settles in days via webhook.
    Boleto,

    /// Manual bank transfer reconciled by the processor.
    Transfer,
}

impl PaymentMethod {
    /// Returns true for rails that settle synchronously at creation,
    /// with no externally visible pending window.
    pub fn is_synchronous(&self) -> bool {
        matches!(self, PaymentMethod::Card)
    }

    /// How long the payer has to complete payment on this rail.
    ///
    /// None for synchronous rails. The deadline is a declarative value
    /// compared against wall-clock time at read time, never a scheduled
    /// callback.
    pub fn expiry_window(&self) -> Option<Duration> {
        match self {
            PaymentMethod::Card => None,
            PaymentMethod::Pix => Some(Duration::minutes(30)),
            PaymentMethod::Boleto => Some(Duration::days(3)),
            PaymentMethod::Transfer => Some(Duration::days(1)),
        }
    }

    /// Rough settlement estimate shown to the payer while polling.
    pub fn processing_estimate(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "immediate",
            PaymentMethod::Pix => "a few minutes after payment",
            PaymentMethod::Boleto => "1-2 business days after payment",
            PaymentMethod::Transfer => "up to 1 business day after transfer",
        }
    }

    /// Suggested interval between status polls for this rail.
    pub fn poll_interval(&self) -> Option<Duration> {
        match self {
            PaymentMethod::Card => None,
            PaymentMethod::Pix => Some(Duration::seconds(15)),
            PaymentMethod::Boleto => Some(Duration::hours(1)),
            PaymentMethod::Transfer => Some(Duration::minutes(30)),
        }
    }

    /// Snake-case encoding used by storage and the HTTP surface.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "card",
            PaymentMethod::Pix => "pix",
            PaymentMethod::Boleto => "boleto",
            PaymentMethod::Transfer => "transfer",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "card" => Ok(PaymentMethod::Card),
            "pix" => Ok(PaymentMethod::Pix),
            "boleto" => Ok(PaymentMethod::Boleto),
            "transfer" => Ok(PaymentMethod::Transfer),
            other => Err(ValidationError::invalid_format(
                "method",
                format!("unsupported payment method '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_is_the_only_synchronous_rail() {
        assert!(PaymentMethod::Card.is_synchronous());
        assert!(!PaymentMethod::Pix.is_synchronous());
        assert!(!PaymentMethod::Boleto.is_synchronous());
        assert!(!PaymentMethod::Transfer.is_synchronous());
    }

    #[test]
    fn expiry_windows_match_rail_deadlines() {
        assert_eq!(PaymentMethod::Card.expiry_window(), None);
        assert_eq!(PaymentMethod::Pix.expiry_window(), Some(Duration::minutes(30)));
        assert_eq!(PaymentMethod::Boleto.expiry_window(), Some(Duration::days(3)));
        assert_eq!(PaymentMethod::Transfer.expiry_window(), Some(Duration::days(1)));
    }

    #[test]
    fn method_round_trips_through_string() {
        for method in [
            PaymentMethod::Card,
            PaymentMethod::Pix,
            PaymentMethod::Boleto,
            PaymentMethod::Transfer,
        ] {
            let parsed: PaymentMethod = method.as_str().parse().unwrap();
            assert_eq!(method, parsed);
        }
    }

    #[test]
    fn unsupported_method_is_rejected() {
        assert!("crypto".parse::<PaymentMethod>().is_err());
    }
}
