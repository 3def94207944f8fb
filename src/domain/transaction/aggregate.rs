//! Transaction aggregate entity.
//!
//! Source of truth for payment state. Each purchase attempt creates one
//! Transaction; a retry creates a new one instead of mutating a failed
//! one, so every external reference maps to exactly one attempt.
//!
//! # Invariants
//!
//! - `id` is globally unique and never reused
//! - `history` is append-only and starts with the Created event
//! - Transitions go through the validated state machine table
//! - Terminal states admit no further transitions; late or redelivered
//!   notifications are answered with the current state, unchanged

use serde::{Deserialize, Serialize};

use crate::domain::catalog::SubscriptionPlan;
use crate::domain::foundation::{
    ContentId, IdempotencyKey, Money, StateMachine, Timestamp, TransactionId, UserId,
};

use super::{
    PaymentMethod, SettlementOutcome, TransactionError, TransactionEvent, TransactionState,
    TransitionCause,
};

/// What a transaction pays for: individual content or a subscription plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PurchaseTarget {
    Content { content_id: ContentId },
    Plan { plan: SubscriptionPlan },
}

/// Result of applying an external settlement event to a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookApplication {
    /// The event transitioned the transaction into this state.
    Applied(TransactionState),

    /// The transaction was already terminal; nothing changed.
    AlreadyTerminal(TransactionState),

    /// This idempotency key was already recorded; nothing changed.
    Duplicate(TransactionState),
}

impl WebhookApplication {
    /// The state after (non-)application, for reporting back.
    pub fn state(&self) -> TransactionState {
        match self {
            WebhookApplication::Applied(s)
            | WebhookApplication::AlreadyTerminal(s)
            | WebhookApplication::Duplicate(s) => *s,
        }
    }
}

/// A single purchase attempt and its settlement history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Ledger identifier, generated at creation.
    pub id: TransactionId,

    /// Buyer.
    pub user_id: UserId,

    /// What is being bought.
    pub target: PurchaseTarget,

    /// Payment rail.
    pub method: PaymentMethod,

    /// Charged amount.
    pub amount: Money,

    /// Current-state projection of `history`.
    pub state: TransactionState,

    /// When the attempt was created.
    pub created_at: Timestamp,

    /// Method deadline for async rails; None for card.
    pub expires_at: Option<Timestamp>,

    /// Reference assigned by the payment strategy at initiation.
    pub external_reference: Option<String>,

    /// Append-only state-change history.
    pub history: Vec<TransactionEvent>,
}

impl Transaction {
    /// Creates a new transaction in `Pending`.
    ///
    /// Rejects non-positive amounts before any record exists; reference
    /// validation (user, content) is the caller's job since it needs
    /// collaborator lookups.
    pub fn create(
        user_id: UserId,
        target: PurchaseTarget,
        method: PaymentMethod,
        amount: Money,
        now: Timestamp,
    ) -> Result<Self, TransactionError> {
        if amount.is_non_positive() {
            return Err(TransactionError::InvalidAmount {
                cents: amount.cents,
            });
        }

        let expires_at = method.expiry_window().map(|window| now.plus(window));

        Ok(Self {
            id: TransactionId::new(),
            user_id,
            target,
            method,
            amount,
            state: TransactionState::Pending,
            created_at: now,
            expires_at,
            external_reference: None,
            history: vec![TransactionEvent::new(
                now,
                TransactionState::Pending,
                TransitionCause::Created,
            )],
        })
    }

    /// Records the reference assigned by the payment strategy.
    pub fn attach_reference(&mut self, reference: impl Into<String>) {
        self.external_reference = Some(reference.into());
    }

    /// True once the transaction reached a state with no exits.
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// True if this idempotency key already appears in history.
    pub fn has_event(&self, key: &IdempotencyKey) -> bool {
        self.history
            .iter()
            .any(|event| event.idempotency_key() == Some(key))
    }

    /// Applies a synchronous card approval.
    pub fn settle_approved(
        &mut self,
        reference: impl Into<String>,
        now: Timestamp,
    ) -> Result<(), TransactionError> {
        self.transition(
            TransactionState::Succeeded,
            TransitionCause::GatewayApproved {
                reference: reference.into(),
            },
            now,
        )
    }

    /// Applies a synchronous card decline.
    pub fn settle_declined(
        &mut self,
        message: impl Into<String>,
        now: Timestamp,
    ) -> Result<(), TransactionError> {
        self.transition(
            TransactionState::Failed,
            TransitionCause::GatewayDeclined {
                message: message.into(),
            },
            now,
        )
    }

    /// Applies an asynchronous settlement notification.
    ///
    /// Idempotent: a terminal transaction or an already-recorded key
    /// yields a no-op carrying the current state, so redelivered and
    /// out-of-order notifications converge instead of failing.
    pub fn apply_external_event(
        &mut self,
        outcome: SettlementOutcome,
        idempotency_key: IdempotencyKey,
        reference: Option<String>,
        now: Timestamp,
    ) -> Result<WebhookApplication, TransactionError> {
        if self.is_terminal() {
            return Ok(WebhookApplication::AlreadyTerminal(self.state));
        }
        if self.has_event(&idempotency_key) {
            return Ok(WebhookApplication::Duplicate(self.state));
        }

        self.transition(
            outcome.target_state(),
            TransitionCause::ExternalNotification {
                idempotency_key,
                reference,
            },
            now,
        )?;
        Ok(WebhookApplication::Applied(self.state))
    }

    /// Derives `Expired` from the deadline if it has passed.
    ///
    /// Returns true if the transition was applied here (the caller must
    /// then persist it); false if the transaction is already terminal,
    /// has no deadline, or the deadline has not passed.
    pub fn expire_if_due(&mut self, now: Timestamp) -> bool {
        if self.is_terminal() {
            return false;
        }
        let Some(deadline) = self.expires_at else {
            return false;
        };
        if !now.is_after(&deadline) {
            return false;
        }
        // Pending/Processing -> Expired is always in the table.
        self.transition(TransactionState::Expired, TransitionCause::DeadlinePassed, now)
            .is_ok()
    }

    fn transition(
        &mut self,
        target: TransactionState,
        cause: TransitionCause,
        now: Timestamp,
    ) -> Result<(), TransactionError> {
        self.state = self
            .state
            .transition_to(target)
            .map_err(|e| TransactionError::infrastructure(e.to_string()))?;
        self.history.push(TransactionEvent::new(now, target, cause));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Currency;

    fn money(cents: i64) -> Money {
        Money::new(cents, Currency::brl())
    }

    fn content_target() -> PurchaseTarget {
        PurchaseTarget::Content {
            content_id: ContentId::new("course-rust").unwrap(),
        }
    }

    fn pix_transaction() -> Transaction {
        Transaction::create(
            UserId::new("u1").unwrap(),
            content_target(),
            PaymentMethod::Pix,
            money(10_000),
            Timestamp::now(),
        )
        .unwrap()
    }

    fn key(s: &str) -> IdempotencyKey {
        IdempotencyKey::new(s).unwrap()
    }

    #[test]
    fn create_rejects_zero_amount() {
        let result = Transaction::create(
            UserId::new("u1").unwrap(),
            content_target(),
            PaymentMethod::Card,
            money(0),
            Timestamp::now(),
        );
        assert!(matches!(
            result,
            Err(TransactionError::InvalidAmount { cents: 0 })
        ));
    }

    #[test]
    fn create_rejects_negative_amount() {
        let result = Transaction::create(
            UserId::new("u1").unwrap(),
            content_target(),
            PaymentMethod::Pix,
            money(-100),
            Timestamp::now(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn create_starts_pending_with_created_event() {
        let tx = pix_transaction();
        assert_eq!(tx.state, TransactionState::Pending);
        assert_eq!(tx.history.len(), 1);
        assert_eq!(tx.history[0].cause, TransitionCause::Created);
    }

    #[test]
    fn pix_deadline_is_thirty_minutes_out() {
        let now = Timestamp::now();
        let tx = Transaction::create(
            UserId::new("u1").unwrap(),
            content_target(),
            PaymentMethod::Pix,
            money(10_000),
            now,
        )
        .unwrap();
        assert_eq!(tx.expires_at, Some(now.plus_minutes(30)));
    }

    #[test]
    fn card_has_no_deadline() {
        let tx = Transaction::create(
            UserId::new("u1").unwrap(),
            content_target(),
            PaymentMethod::Card,
            money(10_000),
            Timestamp::now(),
        )
        .unwrap();
        assert_eq!(tx.expires_at, None);
    }

    #[test]
    fn external_event_settles_pending_transaction() {
        let mut tx = pix_transaction();
        let result = tx
            .apply_external_event(
                SettlementOutcome::Succeeded,
                key("evt-1"),
                Some("pix-ref".to_string()),
                Timestamp::now(),
            )
            .unwrap();
        assert_eq!(
            result,
            WebhookApplication::Applied(TransactionState::Succeeded)
        );
        assert_eq!(tx.history.len(), 2);
    }

    #[test]
    fn duplicate_idempotency_key_is_a_noop() {
        let mut tx = pix_transaction();
        tx.apply_external_event(
            SettlementOutcome::Succeeded,
            key("evt-1"),
            None,
            Timestamp::now(),
        )
        .unwrap();
        let history_len = tx.history.len();

        let result = tx
            .apply_external_event(
                SettlementOutcome::Failed,
                key("evt-1"),
                None,
                Timestamp::now(),
            )
            .unwrap();

        assert_eq!(
            result,
            WebhookApplication::AlreadyTerminal(TransactionState::Succeeded)
        );
        assert_eq!(tx.history.len(), history_len);
        assert_eq!(tx.state, TransactionState::Succeeded);
    }

    #[test]
    fn late_webhook_after_terminal_state_is_discarded() {
        let mut tx = pix_transaction();
        tx.apply_external_event(
            SettlementOutcome::Cancelled,
            key("evt-1"),
            None,
            Timestamp::now(),
        )
        .unwrap();

        let result = tx
            .apply_external_event(
                SettlementOutcome::Succeeded,
                key("evt-2"),
                None,
                Timestamp::now(),
            )
            .unwrap();

        assert_eq!(
            result,
            WebhookApplication::AlreadyTerminal(TransactionState::Cancelled)
        );
        assert_eq!(tx.state, TransactionState::Cancelled);
    }

    #[test]
    fn expire_if_due_transitions_past_deadline() {
        let created = Timestamp::now().minus_days(1);
        let mut tx = Transaction::create(
            UserId::new("u1").unwrap(),
            content_target(),
            PaymentMethod::Pix,
            money(10_000),
            created,
        )
        .unwrap();

        assert!(tx.expire_if_due(Timestamp::now()));
        assert_eq!(tx.state, TransactionState::Expired);
        assert_eq!(tx.history.last().unwrap().cause, TransitionCause::DeadlinePassed);
    }

    #[test]
    fn expire_if_due_is_false_before_deadline() {
        let mut tx = pix_transaction();
        assert!(!tx.expire_if_due(Timestamp::now()));
        assert_eq!(tx.state, TransactionState::Pending);
    }

    #[test]
    fn expire_if_due_never_touches_terminal_states() {
        let created = Timestamp::now().minus_days(1);
        let mut tx = Transaction::create(
            UserId::new("u1").unwrap(),
            content_target(),
            PaymentMethod::Pix,
            money(10_000),
            created,
        )
        .unwrap();
        tx.apply_external_event(
            SettlementOutcome::Succeeded,
            key("evt-1"),
            None,
            created.plus_minutes(5),
        )
        .unwrap();

        assert!(!tx.expire_if_due(Timestamp::now()));
        assert_eq!(tx.state, TransactionState::Succeeded);
    }

    #[test]
    fn card_settlement_succeeds_synchronously() {
        let mut tx = Transaction::create(
            UserId::new("u1").unwrap(),
            content_target(),
            PaymentMethod::Card,
            money(10_000),
            Timestamp::now(),
        )
        .unwrap();
        tx.settle_approved("auth-123", Timestamp::now()).unwrap();
        assert_eq!(tx.state, TransactionState::Succeeded);
    }

    #[test]
    fn card_decline_lands_in_failed() {
        let mut tx = Transaction::create(
            UserId::new("u1").unwrap(),
            content_target(),
            PaymentMethod::Card,
            money(10_000),
            Timestamp::now(),
        )
        .unwrap();
        tx.settle_declined("insufficient funds", Timestamp::now())
            .unwrap();
        assert_eq!(tx.state, TransactionState::Failed);
        assert!(tx.state.can_retry());
    }
}
