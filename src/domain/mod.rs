//! Domain layer - Business logic and invariants.
//!
//! Pure domain types with no infrastructure dependencies. Organized by
//! bounded area: foundation primitives, the content catalog, entitlement
//! facts and evaluation, and the transaction ledger.

pub mod catalog;
pub mod entitlement;
pub mod foundation;
pub mod transaction;
