//! PostgreSQL implementation of PurchaseStore.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entitlement::{Purchase, Revocation};
use crate::domain::foundation::{
    ContentId, DomainError, ErrorCode, Timestamp, TransactionId, UserId,
};
use crate::ports::PurchaseStore;

/// Purchase fact storage over two append-only tables.
///
/// `purchases.transaction_id` carries a unique constraint, backing the
/// at-most-one-purchase-per-transaction rule at the storage layer as
/// well as in the settlement guard.
pub struct PostgresPurchaseStore {
    pool: PgPool,
}

impl PostgresPurchaseStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PurchaseRow {
    user_id: String,
    content_id: String,
    transaction_id: Uuid,
    acquired_at: DateTime<Utc>,
}

impl TryFrom<PurchaseRow> for Purchase {
    type Error = DomainError;

    fn try_from(row: PurchaseRow) -> Result<Self, Self::Error> {
        Ok(Purchase {
            user_id: UserId::new(row.user_id)
                .map_err(|e| db_error(format!("invalid user_id: {e}")))?,
            content_id: ContentId::new(row.content_id)
                .map_err(|e| db_error(format!("invalid content_id: {e}")))?,
            transaction_id: TransactionId::from_uuid(row.transaction_id),
            acquired_at: Timestamp::from_datetime(row.acquired_at),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct RevocationRow {
    user_id: String,
    content_id: String,
    transaction_id: Uuid,
    revoked_at: DateTime<Utc>,
    reason: String,
}

impl TryFrom<RevocationRow> for Revocation {
    type Error = DomainError;

    fn try_from(row: RevocationRow) -> Result<Self, Self::Error> {
        Ok(Revocation {
            user_id: UserId::new(row.user_id)
                .map_err(|e| db_error(format!("invalid user_id: {e}")))?,
            content_id: ContentId::new(row.content_id)
                .map_err(|e| db_error(format!("invalid content_id: {e}")))?,
            transaction_id: TransactionId::from_uuid(row.transaction_id),
            revoked_at: Timestamp::from_datetime(row.revoked_at),
            reason: row.reason,
        })
    }
}

fn db_error(message: String) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, message)
}

#[async_trait]
impl PurchaseStore for PostgresPurchaseStore {
    async fn append(&self, purchase: &Purchase) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO purchases (user_id, content_id, transaction_id, acquired_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(purchase.user_id.as_str())
        .bind(purchase.content_id.as_str())
        .bind(purchase.transaction_id.as_uuid())
        .bind(purchase.acquired_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error(format!("failed to append purchase: {e}")))?;

        Ok(())
    }

    async fn append_revocation(&self, revocation: &Revocation) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO revocations (user_id, content_id, transaction_id, revoked_at, reason)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(revocation.user_id.as_str())
        .bind(revocation.content_id.as_str())
        .bind(revocation.transaction_id.as_uuid())
        .bind(revocation.revoked_at.as_datetime())
        .bind(&revocation.reason)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error(format!("failed to append revocation: {e}")))?;

        Ok(())
    }

    async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<Purchase>, DomainError> {
        let rows: Vec<PurchaseRow> = sqlx::query_as(
            r#"
            SELECT user_id, content_id, transaction_id, acquired_at
            FROM purchases
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error(format!("failed to list purchases: {e}")))?;

        rows.into_iter().map(Purchase::try_from).collect()
    }

    async fn list_revocations(&self, user_id: &UserId) -> Result<Vec<Revocation>, DomainError> {
        let rows: Vec<RevocationRow> = sqlx::query_as(
            r#"
            SELECT user_id, content_id, transaction_id, revoked_at, reason
            FROM revocations
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error(format!("failed to list revocations: {e}")))?;

        rows.into_iter().map(Revocation::try_from).collect()
    }

    async fn find_by_transaction(
        &self,
        transaction_id: &TransactionId,
    ) -> Result<Option<Purchase>, DomainError> {
        let row: Option<PurchaseRow> = sqlx::query_as(
            r#"
            SELECT user_id, content_id, transaction_id, acquired_at
            FROM purchases
            WHERE transaction_id = $1
            "#,
        )
        .bind(transaction_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error(format!("failed to find purchase: {e}")))?;

        row.map(Purchase::try_from).transpose()
    }
}
