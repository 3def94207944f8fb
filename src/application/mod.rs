//! Application layer - Command and query handlers.
//!
//! One handler per operation in the external interface. Handlers wire
//! ports together and own the orchestration (idempotency, CAS retry
//! loops, fulfillment); domain types own the rules.

pub mod handlers;
