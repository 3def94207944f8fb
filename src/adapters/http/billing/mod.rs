//! HTTP adapter for billing endpoints.
//!
//! Exposes the transaction ledger and entitlement evaluator via REST:
//! - `POST /api/transactions` - Start a purchase attempt
//! - `GET /api/transactions/:id/status` - Poll a transaction
//! - `GET /api/entitlement` - Evaluate access to a content item
//! - `POST /api/webhooks/settlement/:id` - Processor settlement webhook

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::BillingAppState;
pub use routes::billing_router;
