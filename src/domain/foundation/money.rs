//! Money value object.
//!
//! All monetary values are stored as integer cents. Floats never touch
//! money in this crate.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// ISO 4217 currency code, three uppercase ASCII letters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Currency(String);

impl Currency {
    /// Creates a currency code, normalizing to uppercase.
    pub fn new(code: impl Into<String>) -> Result<Self, ValidationError> {
        let code = code.into().to_ascii_uppercase();
        if code.len() != 3 || !code.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(ValidationError::invalid_format(
                "currency",
                format!("expected 3-letter ISO code, got '{}'", code),
            ));
        }
        Ok(Self(code))
    }

    /// Brazilian real, the platform's default currency.
    pub fn brl() -> Self {
        Self("BRL".to_string())
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monetary amount in integer cents of a specific currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// Amount in minor units (cents).
    pub cents: i64,
    /// Currency of the amount.
    pub currency: Currency,
}

impl Money {
    /// Creates a monetary amount.
    pub fn new(cents: i64, currency: Currency) -> Self {
        Self { cents, currency }
    }

    /// Returns true for amounts of zero or less.
    ///
    /// A chargeable price must be strictly positive; free content is
    /// modeled with an explicit flag, not a zero price.
    pub fn is_non_positive(&self) -> bool {
        self.cents <= 0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}.{:02}",
            self.currency,
            self.cents / 100,
            (self.cents % 100).abs()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_normalizes_to_uppercase() {
        let c = Currency::new("brl").unwrap();
        assert_eq!(c.as_str(), "BRL");
    }

    #[test]
    fn currency_rejects_wrong_length() {
        assert!(Currency::new("RE").is_err());
        assert!(Currency::new("REAL").is_err());
    }

    #[test]
    fn currency_rejects_non_letters() {
        assert!(Currency::new("B2L").is_err());
    }

    #[test]
    fn zero_and_negative_amounts_are_non_positive() {
        assert!(Money::new(0, Currency::brl()).is_non_positive());
        assert!(Money::new(-500, Currency::brl()).is_non_positive());
        assert!(!Money::new(1, Currency::brl()).is_non_positive());
    }

    #[test]
    fn display_formats_cents() {
        let m = Money::new(10050, Currency::brl());
        assert_eq!(m.to_string(), "BRL 100.50");
    }
}
