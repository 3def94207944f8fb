//! PostgreSQL implementation of TransactionStore.
//!
//! The conditional update is a single `UPDATE ... WHERE id = $1 AND
//! state = $2`; `rows_affected` distinguishes an applied transition from
//! a lost race, which keeps terminal states final without row locks.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{
    Currency, DomainError, ErrorCode, Money, Timestamp, TransactionId, UserId,
};
use crate::domain::transaction::{
    PaymentMethod, PurchaseTarget, Transaction, TransactionEvent, TransactionState,
};
use crate::ports::{CasOutcome, TransactionStore};

pub struct PostgresTransactionStore {
    pool: PgPool,
}

impl PostgresTransactionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a transaction.
#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: Uuid,
    user_id: String,
    target: serde_json::Value,
    method: String,
    amount_cents: i64,
    currency: String,
    state: String,
    created_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
    external_reference: Option<String>,
    history: serde_json::Value,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = DomainError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let target: PurchaseTarget = serde_json::from_value(row.target)
            .map_err(|e| db_error(format!("invalid target json: {e}")))?;
        let history: Vec<TransactionEvent> = serde_json::from_value(row.history)
            .map_err(|e| db_error(format!("invalid history json: {e}")))?;
        let method: PaymentMethod = row
            .method
            .parse()
            .map_err(|_| db_error(format!("invalid method value: {}", row.method)))?;
        let state: TransactionState = row
            .state
            .parse()
            .map_err(|_| db_error(format!("invalid state value: {}", row.state)))?;

        Ok(Transaction {
            id: TransactionId::from_uuid(row.id),
            user_id: UserId::new(row.user_id)
                .map_err(|e| db_error(format!("invalid user_id: {e}")))?,
            target,
            method,
            amount: Money::new(
                row.amount_cents,
                Currency::new(row.currency)
                    .map_err(|e| db_error(format!("invalid currency: {e}")))?,
            ),
            state,
            created_at: Timestamp::from_datetime(row.created_at),
            expires_at: row.expires_at.map(Timestamp::from_datetime),
            external_reference: row.external_reference,
            history,
        })
    }
}

fn db_error(message: String) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, message)
}

fn encode_json<T: serde::Serialize>(value: &T, what: &str) -> Result<serde_json::Value, DomainError> {
    serde_json::to_value(value).map_err(|e| db_error(format!("failed to encode {what}: {e}")))
}

#[async_trait]
impl TransactionStore for PostgresTransactionStore {
    async fn insert(&self, transaction: &Transaction) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO transactions (
                id, user_id, target, method, amount_cents, currency,
                state, created_at, expires_at, external_reference, history
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(transaction.id.as_uuid())
        .bind(transaction.user_id.as_str())
        .bind(encode_json(&transaction.target, "target")?)
        .bind(transaction.method.as_str())
        .bind(transaction.amount.cents)
        .bind(transaction.amount.currency.as_str())
        .bind(transaction.state.as_str())
        .bind(transaction.created_at.as_datetime())
        .bind(transaction.expires_at.as_ref().map(Timestamp::as_datetime))
        .bind(&transaction.external_reference)
        .bind(encode_json(&transaction.history, "history")?)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error(format!("failed to insert transaction: {e}")))?;

        Ok(())
    }

    async fn find_by_id(&self, id: &TransactionId) -> Result<Option<Transaction>, DomainError> {
        let row: Option<TransactionRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, target, method, amount_cents, currency,
                   state, created_at, expires_at, external_reference, history
            FROM transactions
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error(format!("failed to load transaction: {e}")))?;

        row.map(Transaction::try_from).transpose()
    }

    async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<Transaction>, DomainError> {
        let rows: Vec<TransactionRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, target, method, amount_cents, currency,
                   state, created_at, expires_at, external_reference, history
            FROM transactions
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error(format!("failed to list transactions: {e}")))?;

        rows.into_iter().map(Transaction::try_from).collect()
    }

    async fn update_if_state(
        &self,
        transaction: &Transaction,
        expected_state: TransactionState,
    ) -> Result<CasOutcome, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE transactions SET
                state = $3,
                expires_at = $4,
                external_reference = $5,
                history = $6
            WHERE id = $1 AND state = $2
            "#,
        )
        .bind(transaction.id.as_uuid())
        .bind(expected_state.as_str())
        .bind(transaction.state.as_str())
        .bind(transaction.expires_at.as_ref().map(Timestamp::as_datetime))
        .bind(&transaction.external_reference)
        .bind(encode_json(&transaction.history, "history")?)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error(format!("failed to update transaction: {e}")))?;

        if result.rows_affected() > 0 {
            return Ok(CasOutcome::Applied);
        }

        // Zero rows means either a lost race or a missing record; one
        // more read tells them apart.
        let row: Option<(String,)> =
            sqlx::query_as("SELECT state FROM transactions WHERE id = $1")
                .bind(transaction.id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error(format!("failed to re-read transaction state: {e}")))?;

        match row {
            Some((state,)) => {
                let actual: TransactionState = state
                    .parse()
                    .map_err(|_| db_error(format!("invalid state value: {state}")))?;
                Ok(CasOutcome::StateConflict { actual })
            }
            None => Err(DomainError::new(
                ErrorCode::TransactionNotFound,
                format!("transaction {} not found", transaction.id),
            )),
        }
    }
}
