//! Transaction module - The payment settlement ledger.
//!
//! The Transaction aggregate is the source of truth for payment state:
//! an append-only history of state-change events plus a current-state
//! projection. Terminal states are final; redelivered or late settlement
//! notifications become no-ops instead of corrupting history.

mod aggregate;
mod errors;
mod events;
mod instructions;
mod method;
mod state;
mod webhook;

pub use aggregate::{PurchaseTarget, Transaction, WebhookApplication};
pub use errors::TransactionError;
pub use events::{SettlementOutcome, TransactionEvent, TransitionCause};
pub use instructions::PaymentInstructions;
pub use method::PaymentMethod;
pub use state::TransactionState;
pub use webhook::{SettlementNotification, SettlementWebhookVerifier, SignatureHeader, WebhookError};
