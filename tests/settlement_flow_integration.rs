//! Integration tests for the purchase settlement flow.
//!
//! These tests verify the end-to-end paths across the application
//! handlers:
//! 1. Create a transaction on an async rail, settle it via webhook,
//!    and see the entitlement appear
//! 2. Redelivered notifications stay no-ops
//! 3. Rail deadlines win over late notifications
//! 4. Card settles synchronously, both ways
//! 5. Plan purchases activate subscriptions that blanket content
//!
//! Uses in-memory adapters to exercise the flows without external
//! dependencies.

use std::collections::HashSet;
use std::sync::Arc;

use aluna_billing::adapters::gateway::MockSettlementClient;
use aluna_billing::adapters::memory::{
    InMemoryCatalog, InMemoryPurchaseStore, InMemoryTransactionStore, InMemoryUserDirectory,
};
use aluna_billing::adapters::strategies::default_registry;
use aluna_billing::application::handlers::{
    ApplySettlementEventCommand, ApplySettlementEventHandler, CreateTransactionCommand,
    CreateTransactionHandler, EvaluateEntitlementHandler, EvaluateEntitlementQuery,
    GetTransactionStatusHandler, GetTransactionStatusQuery, WebhookIngestOutcome,
};
use aluna_billing::domain::catalog::{Content, PreviewPolicy, SubscriptionPlan};
use aluna_billing::domain::entitlement::{AccessLevel, AccessReason, UserAccount};
use aluna_billing::domain::foundation::{
    ContentId, Currency, IdempotencyKey, Money, TransactionId, UserId,
};
use aluna_billing::domain::transaction::{
    PaymentMethod, PurchaseTarget, SettlementNotification, SettlementOutcome, TransactionState,
};
use aluna_billing::ports::{PurchaseStore, SettlementClient, TransactionStore};

// =============================================================================
// Test Infrastructure
// =============================================================================

struct TestApp {
    transaction_store: Arc<InMemoryTransactionStore>,
    purchase_store: Arc<InMemoryPurchaseStore>,
    create: CreateTransactionHandler,
    settle: ApplySettlementEventHandler,
    status: GetTransactionStatusHandler,
    entitlement: EvaluateEntitlementHandler,
}

fn build_app(gateway: Arc<dyn SettlementClient>) -> TestApp {
    let transaction_store = Arc::new(InMemoryTransactionStore::new());
    let purchase_store = Arc::new(InMemoryPurchaseStore::new());
    let user_directory = Arc::new(InMemoryUserDirectory::new());
    let catalog = Arc::new(InMemoryCatalog::new());

    user_directory.seed(UserAccount {
        id: UserId::new("student-1").unwrap(),
        display_name: "Student".to_string(),
        email: "student@example.com".to_string(),
        subscription: None,
    });
    catalog.seed(Content {
        id: ContentId::new("course-rust").unwrap(),
        title: "Ownership Deep Dive".to_string(),
        price: Money::new(10_000, Currency::brl()),
        is_free: false,
        blanket_plans: HashSet::from([SubscriptionPlan::Pro, SubscriptionPlan::Founder]),
        preview_policy: PreviewPolicy::FirstUnits { units: 2 },
    });

    let strategies = Arc::new(default_registry(gateway));

    TestApp {
        create: CreateTransactionHandler::new(
            transaction_store.clone(),
            purchase_store.clone(),
            user_directory.clone(),
            catalog.clone(),
            strategies,
        ),
        settle: ApplySettlementEventHandler::new(
            transaction_store.clone(),
            purchase_store.clone(),
            user_directory.clone(),
        ),
        status: GetTransactionStatusHandler::new(transaction_store.clone()),
        entitlement: EvaluateEntitlementHandler::new(
            user_directory.clone(),
            catalog.clone(),
            purchase_store.clone(),
        ),
        transaction_store,
        purchase_store,
    }
}

fn user() -> UserId {
    UserId::new("student-1").unwrap()
}

fn content() -> ContentId {
    ContentId::new("course-rust").unwrap()
}

fn content_command(method: PaymentMethod) -> CreateTransactionCommand {
    CreateTransactionCommand {
        user_id: user(),
        target: PurchaseTarget::Content {
            content_id: content(),
        },
        method,
        amount: Money::new(10_000, Currency::brl()),
    }
}

fn success_notification(key: &str) -> SettlementNotification {
    SettlementNotification {
        idempotency_key: IdempotencyKey::new(key).unwrap(),
        outcome: SettlementOutcome::Succeeded,
        external_reference: Some("proc-ref".to_string()),
    }
}

async fn access_level(app: &TestApp) -> (AccessLevel, AccessReason) {
    let decision = app
        .entitlement
        .handle(EvaluateEntitlementQuery {
            user_id: user(),
            content_id: content(),
        })
        .await
        .unwrap();
    (decision.level, decision.reason)
}

// =============================================================================
// Async rail: create, settle, entitle
// =============================================================================

#[tokio::test]
async fn pix_purchase_settles_into_full_access() {
    let app = build_app(Arc::new(MockSettlementClient::approving()));

    let created = app
        .create
        .handle(content_command(PaymentMethod::Pix))
        .await
        .unwrap();
    assert_eq!(created.state, TransactionState::Pending);
    assert!(created.instructions.is_some());

    // No access until the money actually moves.
    let (level, _) = access_level(&app).await;
    assert_eq!(level, AccessLevel::Preview);

    let outcome = app
        .settle
        .handle(ApplySettlementEventCommand {
            transaction_id: created.transaction_id,
            notification: success_notification("evt-1"),
        })
        .await
        .unwrap();
    assert_eq!(
        outcome,
        WebhookIngestOutcome::Applied(TransactionState::Succeeded)
    );

    let (level, reason) = access_level(&app).await;
    assert_eq!(level, AccessLevel::Full);
    assert_eq!(reason, AccessReason::Purchased);
}

#[tokio::test]
async fn redelivered_notification_changes_nothing() {
    let app = build_app(Arc::new(MockSettlementClient::approving()));
    let created = app
        .create
        .handle(content_command(PaymentMethod::Boleto))
        .await
        .unwrap();

    for _ in 0..3 {
        app.settle
            .handle(ApplySettlementEventCommand {
                transaction_id: created.transaction_id,
                notification: success_notification("evt-dup"),
            })
            .await
            .unwrap();
    }

    let purchases = app.purchase_store.list_by_user(&user()).await.unwrap();
    assert_eq!(purchases.len(), 1);

    let stored = app
        .transaction_store
        .find_by_id(&created.transaction_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.state, TransactionState::Succeeded);
}

#[tokio::test]
async fn conflicting_outcome_after_settlement_is_rejected_quietly() {
    let app = build_app(Arc::new(MockSettlementClient::approving()));
    let created = app
        .create
        .handle(content_command(PaymentMethod::Pix))
        .await
        .unwrap();

    app.settle
        .handle(ApplySettlementEventCommand {
            transaction_id: created.transaction_id,
            notification: success_notification("evt-1"),
        })
        .await
        .unwrap();

    // A failure notification arriving after success must not move the
    // transaction out of its terminal state.
    let late = app
        .settle
        .handle(ApplySettlementEventCommand {
            transaction_id: created.transaction_id,
            notification: SettlementNotification {
                idempotency_key: IdempotencyKey::new("evt-2").unwrap(),
                outcome: SettlementOutcome::Failed,
                external_reference: None,
            },
        })
        .await
        .unwrap();

    assert_eq!(late, WebhookIngestOutcome::NoOp(TransactionState::Succeeded));
    let (level, _) = access_level(&app).await;
    assert_eq!(level, AccessLevel::Full);
}

// =============================================================================
// Deadlines
// =============================================================================

#[tokio::test]
async fn status_poll_never_resurrects_an_expired_transaction() {
    let app = build_app(Arc::new(MockSettlementClient::approving()));
    let created = app
        .create
        .handle(content_command(PaymentMethod::Pix))
        .await
        .unwrap();

    // Back-date the deadline so the next read observes it as passed.
    let mut transaction = app
        .transaction_store
        .find_by_id(&created.transaction_id)
        .await
        .unwrap()
        .unwrap();
    transaction.expires_at = transaction.expires_at.map(|t| t.minus_days(1));
    app.transaction_store
        .update_if_state(&transaction, TransactionState::Pending)
        .await
        .unwrap();

    let view = app
        .status
        .handle(GetTransactionStatusQuery {
            transaction_id: created.transaction_id,
        })
        .await
        .unwrap();
    assert_eq!(view.state, TransactionState::Expired);
    assert!(view.can_retry);

    // A payment notification landing after expiry is a no-op and grants
    // nothing.
    let outcome = app
        .settle
        .handle(ApplySettlementEventCommand {
            transaction_id: created.transaction_id,
            notification: success_notification("evt-late"),
        })
        .await
        .unwrap();
    assert_eq!(outcome, WebhookIngestOutcome::NoOp(TransactionState::Expired));

    let (level, _) = access_level(&app).await;
    assert_eq!(level, AccessLevel::Preview);
}

// =============================================================================
// Card: synchronous settlement
// =============================================================================

#[tokio::test]
async fn approved_card_grants_access_immediately() {
    let app = build_app(Arc::new(MockSettlementClient::approving()));

    let created = app
        .create
        .handle(content_command(PaymentMethod::Card))
        .await
        .unwrap();

    assert_eq!(created.state, TransactionState::Succeeded);
    let (level, reason) = access_level(&app).await;
    assert_eq!(level, AccessLevel::Full);
    assert_eq!(reason, AccessReason::Purchased);
}

#[tokio::test]
async fn declined_card_fails_fast_and_allows_retry() {
    let app = build_app(Arc::new(MockSettlementClient::declining(
        "insufficient funds",
    )));

    let created = app
        .create
        .handle(content_command(PaymentMethod::Card))
        .await
        .unwrap();
    assert_eq!(created.state, TransactionState::Failed);
    assert!(created.instructions.is_none());

    let view = app
        .status
        .handle(GetTransactionStatusQuery {
            transaction_id: created.transaction_id,
        })
        .await
        .unwrap();
    assert!(view.can_retry);

    let (level, _) = access_level(&app).await;
    assert_eq!(level, AccessLevel::Preview);
}

#[tokio::test]
async fn failed_attempt_does_not_block_a_second_one() {
    let declining = build_app(Arc::new(MockSettlementClient::declining("card expired")));
    let first = declining
        .create
        .handle(content_command(PaymentMethod::Card))
        .await
        .unwrap();
    assert_eq!(first.state, TransactionState::Failed);

    // The retry is a brand new transaction on the same target.
    let second = declining
        .create
        .handle(content_command(PaymentMethod::Pix))
        .await
        .unwrap();
    assert_eq!(second.state, TransactionState::Pending);
    assert_ne!(first.transaction_id, second.transaction_id);
}

// =============================================================================
// Plan purchases and subscription access
// =============================================================================

#[tokio::test]
async fn settled_plan_purchase_blankets_covered_content() {
    let app = build_app(Arc::new(MockSettlementClient::approving()));

    let created = app
        .create
        .handle(CreateTransactionCommand {
            user_id: user(),
            target: PurchaseTarget::Plan {
                plan: SubscriptionPlan::Pro,
            },
            method: PaymentMethod::Pix,
            amount: Money::new(4_900, Currency::brl()),
        })
        .await
        .unwrap();

    app.settle
        .handle(ApplySettlementEventCommand {
            transaction_id: created.transaction_id,
            notification: success_notification("evt-plan"),
        })
        .await
        .unwrap();

    let (level, reason) = access_level(&app).await;
    assert_eq!(level, AccessLevel::Full);
    assert_eq!(reason, AccessReason::Subscription);

    // No per-content purchase fact was minted for a plan purchase.
    assert!(app
        .purchase_store
        .find_by_transaction(&created.transaction_id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn basic_plan_does_not_blanket_pro_content() {
    let app = build_app(Arc::new(MockSettlementClient::approving()));

    let created = app
        .create
        .handle(CreateTransactionCommand {
            user_id: user(),
            target: PurchaseTarget::Plan {
                plan: SubscriptionPlan::Basic,
            },
            method: PaymentMethod::Pix,
            amount: Money::new(1_900, Currency::brl()),
        })
        .await
        .unwrap();
    app.settle
        .handle(ApplySettlementEventCommand {
            transaction_id: created.transaction_id,
            notification: success_notification("evt-plan"),
        })
        .await
        .unwrap();

    let (level, reason) = access_level(&app).await;
    assert_eq!(level, AccessLevel::Preview);
    assert_eq!(reason, AccessReason::PreviewAvailable { visible_units: 2 });
}

// =============================================================================
// Validation rejections
// =============================================================================

#[tokio::test]
async fn unknown_user_and_content_are_rejected_without_a_record() {
    let app = build_app(Arc::new(MockSettlementClient::approving()));

    let bad_user = app
        .create
        .handle(CreateTransactionCommand {
            user_id: UserId::new("ghost").unwrap(),
            target: PurchaseTarget::Content {
                content_id: content(),
            },
            method: PaymentMethod::Pix,
            amount: Money::new(10_000, Currency::brl()),
        })
        .await;
    assert!(bad_user.is_err());

    let bad_content = app
        .create
        .handle(CreateTransactionCommand {
            user_id: user(),
            target: PurchaseTarget::Content {
                content_id: ContentId::new("missing").unwrap(),
            },
            method: PaymentMethod::Pix,
            amount: Money::new(10_000, Currency::brl()),
        })
        .await;
    assert!(bad_content.is_err());

    assert_eq!(app.transaction_store.len(), 0);
}

#[tokio::test]
async fn unknown_transaction_notification_is_acknowledged_not_errored() {
    let app = build_app(Arc::new(MockSettlementClient::approving()));

    let outcome = app
        .settle
        .handle(ApplySettlementEventCommand {
            transaction_id: TransactionId::new(),
            notification: success_notification("evt-ghost"),
        })
        .await
        .unwrap();

    assert_eq!(outcome, WebhookIngestOutcome::UnknownTransaction);
}
