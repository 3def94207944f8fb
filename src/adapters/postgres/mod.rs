//! PostgreSQL adapters.
//!
//! Persistent implementations of the transaction and purchase stores.
//! The catalog and user directory live in external services and have no
//! Postgres adapter here.

mod purchase_store;
mod transaction_store;

pub use purchase_store::PostgresPurchaseStore;
pub use transaction_store::PostgresTransactionStore;
