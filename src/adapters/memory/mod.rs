//! In-memory adapters for tests and local development.
//!
//! Deterministic, lock-based implementations of the persistence and
//! collaborator ports. The transaction store honours the same
//! compare-and-set contract as the Postgres adapter, so the handlers'
//! race handling is exercised identically in both.

mod catalog;
mod purchase_store;
mod transaction_store;
mod user_directory;

pub use catalog::InMemoryCatalog;
pub use purchase_store::InMemoryPurchaseStore;
pub use transaction_store::InMemoryTransactionStore;
pub use user_directory::InMemoryUserDirectory;
