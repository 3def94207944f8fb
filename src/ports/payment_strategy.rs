//! PaymentStrategy port - Per-rail initiation.
//!
//! One strategy per payment rail. Strategies are side-effect-declaring
//! adapters: they return data (instructions, references, a synchronous
//! outcome for card) and never mutate the ledger themselves. Adding a
//! rail means adding a strategy, not touching the state machine.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::transaction::{PaymentInstructions, PaymentMethod, Transaction};

use super::CardAuthorization;

/// Data produced when a strategy initiates a transaction.
#[derive(Debug, Clone)]
pub struct Initiation {
    /// What the payer must do to complete payment.
    pub instructions: PaymentInstructions,

    /// Reference the processor will echo back in notifications.
    pub external_reference: String,

    /// Present only for synchronous rails (card): the settled outcome.
    pub synchronous_outcome: Option<CardAuthorization>,
}

/// Static description of a payment rail for status reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    /// The rail being described.
    pub method: PaymentMethod,

    /// Payer-facing settlement estimate.
    pub processing_estimate: String,

    /// Whether a failed attempt on this rail is worth retrying.
    pub retryable: bool,
}

/// Port for per-rail payment initiation.
#[async_trait]
pub trait PaymentStrategy: Send + Sync {
    /// The rail this strategy serves.
    fn method(&self) -> PaymentMethod;

    /// Produces instructions and references for a new transaction.
    ///
    /// Must not mutate the ledger; the caller applies the returned data.
    async fn initiate(&self, transaction: &Transaction) -> Result<Initiation, DomainError>;

    /// Describes this rail's settlement behavior.
    fn describe(&self) -> MethodDescriptor;
}

/// Resolves the strategy for a payment rail.
///
/// Built once at wiring time with every supported rail. Lookup failure
/// means a method passed validation without a registered strategy, which
/// is a wiring bug rather than caller error.
pub struct StrategyRegistry {
    strategies: Vec<std::sync::Arc<dyn PaymentStrategy>>,
}

impl StrategyRegistry {
    pub fn new(strategies: Vec<std::sync::Arc<dyn PaymentStrategy>>) -> Self {
        Self { strategies }
    }

    /// Finds the strategy serving `method`.
    pub fn for_method(&self, method: PaymentMethod) -> Option<&dyn PaymentStrategy> {
        self.strategies
            .iter()
            .find(|s| s.method() == method)
            .map(|s| s.as_ref())
    }
}
