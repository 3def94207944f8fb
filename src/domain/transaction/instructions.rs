//! Rail-specific payment instructions returned to the payer.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

/// What the payer must do (or see) to complete payment on a given rail.
///
/// Produced by a payment strategy at initiation; the ledger stores only
/// the external reference, not the instructions themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaymentInstructions {
    /// Card settles synchronously; the payer only sees a receipt reference.
    CardReceipt { receipt_reference: String },

    /// PIX copy-paste code, valid until the deadline.
    PixCode {
        copy_paste_code: String,
        expires_at: Timestamp,
    },

    /// Boleto digitable line with its due date.
    BoletoSlip {
        digitable_line: String,
        due_date: Timestamp,
    },

    /// Destination account details for a manual transfer, with the
    /// reference code the payer must include.
    BankTransfer {
        bank: String,
        branch: String,
        account: String,
        reference_code: String,
        deadline: Timestamp,
    },
}

impl PaymentInstructions {
    /// The reference the payer (or processor) will echo back.
    pub fn reference(&self) -> &str {
        match self {
            PaymentInstructions::CardReceipt { receipt_reference } => receipt_reference,
            PaymentInstructions::PixCode { copy_paste_code, .. } => copy_paste_code,
            PaymentInstructions::BoletoSlip { digitable_line, .. } => digitable_line,
            PaymentInstructions::BankTransfer { reference_code, .. } => reference_code,
        }
    }
}
