//! EvaluateEntitlementHandler - Assembles facts and runs the evaluator.

use std::sync::Arc;

use tracing::debug;

use crate::domain::entitlement::{AccessDecision, EntitlementEvaluator};
use crate::domain::foundation::{ContentId, Timestamp, UserId};
use crate::domain::transaction::TransactionError;
use crate::ports::{CatalogLookup, PurchaseStore, UserDirectory};

#[derive(Debug, Clone)]
pub struct EvaluateEntitlementQuery {
    pub user_id: UserId,
    pub content_id: ContentId,
}

/// Loads the user, the content, and the user's purchase facts, then
/// delegates the decision to the pure evaluator.
pub struct EvaluateEntitlementHandler {
    user_directory: Arc<dyn UserDirectory>,
    catalog: Arc<dyn CatalogLookup>,
    purchase_store: Arc<dyn PurchaseStore>,
    evaluator: EntitlementEvaluator,
}

impl EvaluateEntitlementHandler {
    pub fn new(
        user_directory: Arc<dyn UserDirectory>,
        catalog: Arc<dyn CatalogLookup>,
        purchase_store: Arc<dyn PurchaseStore>,
    ) -> Self {
        Self {
            user_directory,
            catalog,
            purchase_store,
            evaluator: EntitlementEvaluator::new(),
        }
    }

    pub async fn handle(
        &self,
        query: EvaluateEntitlementQuery,
    ) -> Result<AccessDecision, TransactionError> {
        let user = self
            .user_directory
            .get_user(&query.user_id)
            .await
            .map_err(|e| TransactionError::infrastructure(e.to_string()))?
            .ok_or_else(|| TransactionError::UserNotFound {
                user_id: query.user_id.to_string(),
            })?;

        let content = self
            .catalog
            .get_content(&query.content_id)
            .await
            .map_err(|e| TransactionError::infrastructure(e.to_string()))?
            .ok_or_else(|| TransactionError::ContentNotFound {
                content_id: query.content_id.to_string(),
            })?;

        let purchases = self
            .purchase_store
            .list_by_user(&query.user_id)
            .await
            .map_err(|e| TransactionError::infrastructure(e.to_string()))?;
        let revocations = self
            .purchase_store
            .list_revocations(&query.user_id)
            .await
            .map_err(|e| TransactionError::infrastructure(e.to_string()))?;

        let decision = self.evaluator.evaluate(
            &user,
            &content,
            &purchases,
            &revocations,
            Timestamp::now(),
        );
        debug!(
            user_id = %query.user_id,
            content_id = %query.content_id,
            level = ?decision.level,
            "entitlement evaluated"
        );
        Ok(decision)
    }
}
