//! Boleto payment strategy.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::transaction::{PaymentInstructions, PaymentMethod, Transaction};
use crate::ports::{Initiation, MethodDescriptor, PaymentStrategy};

/// Asynchronous boleto rail.
///
/// Emits a digitable line due in three days. Banks clear boletos in
/// batches, so settlement may lag payment by a business day or two.
pub struct BoletoStrategy;

impl BoletoStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl Default for BoletoStrategy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentStrategy for BoletoStrategy {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::Boleto
    }

    async fn initiate(&self, transaction: &Transaction) -> Result<Initiation, DomainError> {
        let due_date = transaction.expires_at.ok_or_else(|| {
            DomainError::new(
                ErrorCode::InternalError,
                "boleto transaction created without a deadline",
            )
        })?;
        let digits = transaction.id.as_uuid().simple().to_string();
        let external_reference = format!("boleto-{digits}");

        Ok(Initiation {
            instructions: PaymentInstructions::BoletoSlip {
                digitable_line: format!("23793.38128 {} 60000.{}", &digits[..11], &digits[..6]),
                due_date,
            },
            external_reference,
            synchronous_outcome: None,
        })
    }

    fn describe(&self) -> MethodDescriptor {
        MethodDescriptor {
            method: PaymentMethod::Boleto,
            processing_estimate: PaymentMethod::Boleto.processing_estimate().to_string(),
            retryable: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{ContentId, Currency, Money, Timestamp, UserId};
    use crate::domain::transaction::PurchaseTarget;

    #[tokio::test]
    async fn boleto_due_date_matches_the_rail_deadline() {
        let transaction = Transaction::create(
            UserId::new("student-1").unwrap(),
            PurchaseTarget::Content {
                content_id: ContentId::new("course-rust").unwrap(),
            },
            PaymentMethod::Boleto,
            Money::new(10_000, Currency::brl()),
            Timestamp::now(),
        )
        .unwrap();

        let initiation = BoletoStrategy::new().initiate(&transaction).await.unwrap();

        match initiation.instructions {
            PaymentInstructions::BoletoSlip { due_date, .. } => {
                assert_eq!(Some(due_date), transaction.expires_at);
            }
            other => panic!("expected boleto slip, got {other:?}"),
        }
    }
}
