//! PIX payment strategy.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::transaction::{PaymentInstructions, PaymentMethod, Transaction};
use crate::ports::{Initiation, MethodDescriptor, PaymentStrategy};

/// Asynchronous PIX rail.
///
/// Emits a copy-paste code valid for the rail's 30-minute window;
/// settlement arrives later via processor webhook.
pub struct PixStrategy;

impl PixStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PixStrategy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentStrategy for PixStrategy {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::Pix
    }

    async fn initiate(&self, transaction: &Transaction) -> Result<Initiation, DomainError> {
        let expires_at = transaction.expires_at.ok_or_else(|| {
            DomainError::new(
                ErrorCode::InternalError,
                "pix transaction created without a deadline",
            )
        })?;
        let external_reference = format!("pix-{}", transaction.id.as_uuid().simple());

        Ok(Initiation {
            instructions: PaymentInstructions::PixCode {
                copy_paste_code: format!(
                    "00020126580014br.gov.bcb.pix0136{}",
                    transaction.id.as_uuid().simple()
                ),
                expires_at,
            },
            external_reference,
            synchronous_outcome: None,
        })
    }

    fn describe(&self) -> MethodDescriptor {
        MethodDescriptor {
            method: PaymentMethod::Pix,
            processing_estimate: PaymentMethod::Pix.processing_estimate().to_string(),
            retryable: true,
        }
    }
}
