//! Operation handlers.

mod apply_settlement_event;
mod create_transaction;
mod evaluate_entitlement;
mod fulfillment;
mod get_transaction_status;

pub use apply_settlement_event::{
    ApplySettlementEventCommand, ApplySettlementEventHandler, WebhookIngestOutcome,
};
pub use create_transaction::{
    CreateTransactionCommand, CreateTransactionHandler, CreateTransactionResult,
};
pub use evaluate_entitlement::{EvaluateEntitlementHandler, EvaluateEntitlementQuery};
pub use get_transaction_status::{
    GetTransactionStatusHandler, GetTransactionStatusQuery, TransactionStatusView,
};
