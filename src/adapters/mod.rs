//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `gateway` - Card settlement gateway clients
//! - `http` - REST API surface
//! - `memory` - In-memory stores for tests and local development
//! - `postgres` - Persistent stores
//! - `strategies` - Per-rail payment initiation

pub mod gateway;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod strategies;
