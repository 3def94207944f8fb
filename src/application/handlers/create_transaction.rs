//! CreateTransactionHandler - Command handler for purchase attempts.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::foundation::{Money, Timestamp, TransactionId, UserId};
use crate::domain::transaction::{
    PaymentInstructions, PaymentMethod, PurchaseTarget, Transaction, TransactionError,
    TransactionState,
};
use crate::ports::{
    CardAuthorization, CatalogLookup, PurchaseStore, StrategyRegistry, TransactionStore,
    UserDirectory,
};

use super::fulfillment::fulfill;

/// Command to start a purchase attempt.
#[derive(Debug, Clone)]
pub struct CreateTransactionCommand {
    pub user_id: UserId,
    pub target: PurchaseTarget,
    pub method: PaymentMethod,
    pub amount: Money,
}

/// Result of a created purchase attempt.
#[derive(Debug, Clone)]
pub struct CreateTransactionResult {
    pub transaction_id: TransactionId,
    pub state: TransactionState,

    /// Payment instructions for async rails; present for card only when
    /// the charge was approved (a receipt).
    pub instructions: Option<PaymentInstructions>,
}

/// Handler for creating purchase transactions.
///
/// Validation failures (bad amount, unknown references) are rejected
/// before any record exists. Card settles synchronously: the stored
/// record is already terminal and no pending window is observable.
pub struct CreateTransactionHandler {
    transaction_store: Arc<dyn TransactionStore>,
    purchase_store: Arc<dyn PurchaseStore>,
    user_directory: Arc<dyn UserDirectory>,
    catalog: Arc<dyn CatalogLookup>,
    strategies: Arc<StrategyRegistry>,
}

impl CreateTransactionHandler {
    pub fn new(
        transaction_store: Arc<dyn TransactionStore>,
        purchase_store: Arc<dyn PurchaseStore>,
        user_directory: Arc<dyn UserDirectory>,
        catalog: Arc<dyn CatalogLookup>,
        strategies: Arc<StrategyRegistry>,
    ) -> Self {
        Self {
            transaction_store,
            purchase_store,
            user_directory,
            catalog,
            strategies,
        }
    }

    pub async fn handle(
        &self,
        command: CreateTransactionCommand,
    ) -> Result<CreateTransactionResult, TransactionError> {
        self.validate_references(&command).await?;

        let now = Timestamp::now();
        let mut transaction = Transaction::create(
            command.user_id,
            command.target,
            command.method,
            command.amount,
            now,
        )?;

        let strategy = self
            .strategies
            .for_method(command.method)
            .ok_or_else(|| {
                TransactionError::infrastructure(format!(
                    "no strategy registered for method '{}'",
                    command.method
                ))
            })?;

        let initiation = strategy
            .initiate(&transaction)
            .await
            .map_err(|e| TransactionError::infrastructure(e.to_string()))?;
        transaction.attach_reference(initiation.external_reference.clone());

        let instructions = match initiation.synchronous_outcome {
            Some(CardAuthorization::Approved { reference }) => {
                transaction.settle_approved(reference, now)?;
                Some(initiation.instructions)
            }
            Some(CardAuthorization::Declined { message }) => {
                warn!(
                    transaction_id = %transaction.id,
                    %message,
                    "card charge declined"
                );
                transaction.settle_declined(message, now)?;
                None
            }
            None => Some(initiation.instructions),
        };

        self.transaction_store
            .insert(&transaction)
            .await
            .map_err(|e| TransactionError::infrastructure(e.to_string()))?;

        if transaction.state == TransactionState::Succeeded {
            fulfill(
                &transaction,
                &self.purchase_store,
                &self.user_directory,
                now,
            )
            .await
            .map_err(|e| TransactionError::infrastructure(e.to_string()))?;
        }

        info!(
            transaction_id = %transaction.id,
            method = %transaction.method,
            state = %transaction.state,
            "transaction created"
        );

        Ok(CreateTransactionResult {
            transaction_id: transaction.id,
            state: transaction.state,
            instructions,
        })
    }

    /// Rejects unknown users and content before creating anything.
    async fn validate_references(
        &self,
        command: &CreateTransactionCommand,
    ) -> Result<(), TransactionError> {
        self.user_directory
            .get_user(&command.user_id)
            .await
            .map_err(|e| TransactionError::infrastructure(e.to_string()))?
            .ok_or_else(|| TransactionError::UserNotFound {
                user_id: command.user_id.to_string(),
            })?;

        if let PurchaseTarget::Content { content_id } = &command.target {
            self.catalog
                .get_content(content_id)
                .await
                .map_err(|e| TransactionError::infrastructure(e.to_string()))?
                .ok_or_else(|| TransactionError::ContentNotFound {
                    content_id: content_id.to_string(),
                })?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::gateway::MockSettlementClient;
    use crate::adapters::memory::{
        InMemoryCatalog, InMemoryPurchaseStore, InMemoryTransactionStore, InMemoryUserDirectory,
    };
    use crate::adapters::strategies::default_registry;
    use crate::domain::catalog::{Content, PreviewPolicy, SubscriptionPlan};
    use crate::domain::entitlement::UserAccount;
    use crate::domain::foundation::{ContentId, Currency};

    fn user_id() -> UserId {
        UserId::new("student-1").unwrap()
    }

    fn content_id() -> ContentId {
        ContentId::new("course-rust").unwrap()
    }

    fn brl(cents: i64) -> Money {
        Money::new(cents, Currency::brl())
    }

    struct Fixture {
        transaction_store: Arc<InMemoryTransactionStore>,
        purchase_store: Arc<InMemoryPurchaseStore>,
        handler: CreateTransactionHandler,
    }

    fn fixture(gateway: MockSettlementClient) -> Fixture {
        let transaction_store = Arc::new(InMemoryTransactionStore::new());
        let purchase_store = Arc::new(InMemoryPurchaseStore::new());
        let directory = Arc::new(InMemoryUserDirectory::new());
        directory.seed(UserAccount {
            id: user_id(),
            display_name: "Student".to_string(),
            email: "student@example.com".to_string(),
            subscription: None,
        });
        let catalog = Arc::new(InMemoryCatalog::new());
        catalog.seed(Content {
            id: content_id(),
            title: "Rust".to_string(),
            price: brl(19900),
            is_free: false,
            blanket_plans: [SubscriptionPlan::Pro].into_iter().collect(),
            preview_policy: PreviewPolicy::None,
        });

        let handler = CreateTransactionHandler::new(
            transaction_store.clone(),
            purchase_store.clone(),
            directory,
            catalog,
            Arc::new(default_registry(Arc::new(gateway))),
        );
        Fixture {
            transaction_store,
            purchase_store,
            handler,
        }
    }

    fn content_command(method: PaymentMethod, cents: i64) -> CreateTransactionCommand {
        CreateTransactionCommand {
            user_id: user_id(),
            target: PurchaseTarget::Content {
                content_id: content_id(),
            },
            method,
            amount: brl(cents),
        }
    }

    #[tokio::test]
    async fn pix_transaction_lands_pending_with_instructions() {
        let fx = fixture(MockSettlementClient::approving());

        let result = fx
            .handler
            .handle(content_command(PaymentMethod::Pix, 10_000))
            .await
            .unwrap();

        assert_eq!(result.state, TransactionState::Pending);
        assert!(matches!(
            result.instructions,
            Some(PaymentInstructions::PixCode { .. })
        ));

        let stored = fx
            .transaction_store
            .find_by_id(&result.transaction_id)
            .await
            .unwrap()
            .unwrap();
        assert!(stored.expires_at.is_some());
        assert!(stored.external_reference.is_some());
    }

    #[tokio::test]
    async fn card_approval_settles_synchronously_and_fulfills() {
        let fx = fixture(MockSettlementClient::approving());

        let result = fx
            .handler
            .handle(content_command(PaymentMethod::Card, 19_900))
            .await
            .unwrap();

        assert_eq!(result.state, TransactionState::Succeeded);
        assert!(matches!(
            result.instructions,
            Some(PaymentInstructions::CardReceipt { .. })
        ));
        let purchase = fx
            .purchase_store
            .find_by_transaction(&result.transaction_id)
            .await
            .unwrap();
        assert!(purchase.is_some());
    }

    #[tokio::test]
    async fn card_decline_lands_failed_without_purchase() {
        let fx = fixture(MockSettlementClient::declining("insufficient funds"));

        let result = fx
            .handler
            .handle(content_command(PaymentMethod::Card, 19_900))
            .await
            .unwrap();

        assert_eq!(result.state, TransactionState::Failed);
        assert!(result.instructions.is_none());
        let purchase = fx
            .purchase_store
            .find_by_transaction(&result.transaction_id)
            .await
            .unwrap();
        assert!(purchase.is_none());
    }

    #[tokio::test]
    async fn unreachable_gateway_surfaces_as_failed_transaction() {
        let fx = fixture(MockSettlementClient::unreachable());

        let result = fx
            .handler
            .handle(content_command(PaymentMethod::Card, 19_900))
            .await
            .unwrap();

        assert_eq!(result.state, TransactionState::Failed);
        assert!(result.state.can_retry());
    }

    #[tokio::test]
    async fn zero_amount_is_rejected_without_a_record() {
        let fx = fixture(MockSettlementClient::approving());

        let result = fx.handler.handle(content_command(PaymentMethod::Card, 0)).await;

        assert!(matches!(
            result,
            Err(TransactionError::InvalidAmount { cents: 0 })
        ));
        assert_eq!(fx.transaction_store.len(), 0);
    }

    #[tokio::test]
    async fn unknown_user_is_rejected() {
        let fx = fixture(MockSettlementClient::approving());
        let mut command = content_command(PaymentMethod::Pix, 10_000);
        command.user_id = UserId::new("ghost").unwrap();

        let result = fx.handler.handle(command).await;
        assert!(matches!(result, Err(TransactionError::UserNotFound { .. })));
    }

    #[tokio::test]
    async fn unknown_content_is_rejected() {
        let fx = fixture(MockSettlementClient::approving());
        let mut command = content_command(PaymentMethod::Pix, 10_000);
        command.target = PurchaseTarget::Content {
            content_id: ContentId::new("missing").unwrap(),
        };

        let result = fx.handler.handle(command).await;
        assert!(matches!(
            result,
            Err(TransactionError::ContentNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn plan_purchase_does_not_need_catalog_entry() {
        let fx = fixture(MockSettlementClient::approving());
        let command = CreateTransactionCommand {
            user_id: user_id(),
            target: PurchaseTarget::Plan {
                plan: SubscriptionPlan::Pro,
            },
            method: PaymentMethod::Boleto,
            amount: brl(4_900),
        };

        let result = fx.handler.handle(command).await.unwrap();
        assert_eq!(result.state, TransactionState::Pending);
        assert!(matches!(
            result.instructions,
            Some(PaymentInstructions::BoletoSlip { .. })
        ));
    }
}
