//! Payment strategies - one adapter per supported rail.
//!
//! Card settles synchronously against the gateway; PIX, boleto and
//! transfer hand the payer instructions and wait for the processor's
//! webhook. `default_registry` wires all four.

mod boleto;
mod card;
mod pix;
mod transfer;

pub use boleto::BoletoStrategy;
pub use card::CardStrategy;
pub use pix::PixStrategy;
pub use transfer::TransferStrategy;

use std::sync::Arc;

use crate::ports::{SettlementClient, StrategyRegistry};

/// Builds a registry covering every supported payment rail.
pub fn default_registry(settlement_client: Arc<dyn SettlementClient>) -> StrategyRegistry {
    StrategyRegistry::new(vec![
        Arc::new(CardStrategy::new(settlement_client)),
        Arc::new(PixStrategy::new()),
        Arc::new(BoletoStrategy::new()),
        Arc::new(TransferStrategy::new()),
    ])
}
