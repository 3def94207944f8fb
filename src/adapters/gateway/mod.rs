//! Settlement gateway adapters.
//!
//! Production deployments point `SettlementClient` at the real card
//! gateway; tests and local development use the deterministic mock.

mod mock_settlement_client;

pub use mock_settlement_client::MockSettlementClient;
