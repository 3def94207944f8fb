//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Storage Ports
//!
//! - `TransactionStore` - Durable, atomically-updatable transaction records
//! - `PurchaseStore` - Append-only purchase and revocation facts
//!
//! ## Collaborator Ports
//!
//! - `CatalogLookup` - Content pricing and blanket-plan metadata
//! - `UserDirectory` - User profiles and subscription activation
//! - `SettlementClient` - Synchronous card authorization gateway
//! - `PaymentStrategy` - Per-rail initiation and retry metadata

mod catalog_lookup;
mod payment_strategy;
mod purchase_store;
mod settlement_client;
mod transaction_store;
mod user_directory;

pub use catalog_lookup::CatalogLookup;
pub use payment_strategy::{Initiation, MethodDescriptor, PaymentStrategy, StrategyRegistry};
pub use purchase_store::PurchaseStore;
pub use settlement_client::{CardAuthorization, GatewayError, SettlementClient};
pub use transaction_store::{CasOutcome, TransactionStore};
pub use user_directory::UserDirectory;
