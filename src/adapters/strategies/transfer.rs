//! Manual bank transfer strategy.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::transaction::{PaymentInstructions, PaymentMethod, Transaction};
use crate::ports::{Initiation, MethodDescriptor, PaymentStrategy};

const DESTINATION_BANK: &str = "001 Banco do Brasil";
const DESTINATION_BRANCH: &str = "3409-5";
const DESTINATION_ACCOUNT: &str = "112233-4";

/// Manual transfer rail.
///
/// The payer wires to a fixed destination account and must include the
/// reference code; the processor reconciles transfers against open
/// transactions and notifies via webhook.
pub struct TransferStrategy;

impl TransferStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TransferStrategy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentStrategy for TransferStrategy {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::Transfer
    }

    async fn initiate(&self, transaction: &Transaction) -> Result<Initiation, DomainError> {
        let deadline = transaction.expires_at.ok_or_else(|| {
            DomainError::new(
                ErrorCode::InternalError,
                "transfer transaction created without a deadline",
            )
        })?;
        let reference_code = format!("TRF-{}", &transaction.id.as_uuid().simple().to_string()[..12]);

        Ok(Initiation {
            instructions: PaymentInstructions::BankTransfer {
                bank: DESTINATION_BANK.to_string(),
                branch: DESTINATION_BRANCH.to_string(),
                account: DESTINATION_ACCOUNT.to_string(),
                reference_code: reference_code.clone(),
                deadline,
            },
            external_reference: reference_code,
            synchronous_outcome: None,
        })
    }

    fn describe(&self) -> MethodDescriptor {
        MethodDescriptor {
            method: PaymentMethod::Transfer,
            processing_estimate: PaymentMethod::Transfer.processing_estimate().to_string(),
            retryable: true,
        }
    }
}
