//! Settlement fulfillment - The one write that success triggers.
//!
//! Shared by the synchronous card path and the webhook path: when a
//! transaction reaches `succeeded`, exactly one Purchase fact (content
//! target) or subscription activation (plan target) must exist for it.

use std::sync::Arc;

use tracing::info;

use crate::domain::entitlement::Purchase;
use crate::domain::foundation::{DomainError, Timestamp};
use crate::domain::transaction::{PurchaseTarget, Transaction};
use crate::ports::{PurchaseStore, UserDirectory};

/// Plan subscriptions bought through the ledger run for 30 days unless
/// the plan is non-expiring (Founder).
const PLAN_PERIOD_DAYS: i64 = 30;

/// Records the effects of a settled transaction.
///
/// At-most-once per transaction: an existing Purchase fact for this
/// transaction id short-circuits, so racing observers of the same
/// success converge on a single fact.
pub(super) async fn fulfill(
    transaction: &Transaction,
    purchase_store: &Arc<dyn PurchaseStore>,
    user_directory: &Arc<dyn UserDirectory>,
    now: Timestamp,
) -> Result<(), DomainError> {
    match &transaction.target {
        PurchaseTarget::Content { content_id } => {
            if purchase_store
                .find_by_transaction(&transaction.id)
                .await?
                .is_some()
            {
                return Ok(());
            }

            let purchase = Purchase::record(
                transaction.user_id.clone(),
                content_id.clone(),
                transaction.id,
                now,
            );
            purchase_store.append(&purchase).await?;
            info!(
                transaction_id = %transaction.id,
                user_id = %transaction.user_id,
                content_id = %content_id,
                "purchase fact recorded"
            );
        }
        PurchaseTarget::Plan { plan } => {
            let expires_at = if *plan == crate::domain::catalog::SubscriptionPlan::Founder {
                None
            } else {
                Some(now.plus_days(PLAN_PERIOD_DAYS))
            };
            user_directory
                .activate_subscription(
                    &transaction.user_id,
                    *plan,
                    transaction.amount.clone(),
                    expires_at,
                )
                .await?;
            info!(
                transaction_id = %transaction.id,
                user_id = %transaction.user_id,
                plan = %plan,
                "subscription activated"
            );
        }
    }
    Ok(())
}
