//! # Till Session Repository
//!
//! Storage for cash-register sessions. State transitions are guarded in
//! SQL (`WHERE status = 'open'`) so a close always acts on current state,
//! never on a stale in-memory copy.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use cafepos_core::TillSession;

/// Repository for till session database operations.
#[derive(Debug, Clone)]
pub struct TillRepository {
    pool: SqlitePool,
}

impl TillRepository {
    pub fn new(pool: SqlitePool) -> Self {
        TillRepository { pool }
    }

    /// Gets a session by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<TillSession>> {
        let session = sqlx::query_as::<_, TillSession>(
            r#"
            SELECT id, operator_id, status, opening_balance_cents,
                   closing_balance_cents, opened_at, closed_at
            FROM till_sessions
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    /// The operator's currently open session, most recent first.
    pub async fn find_open(&self, operator_id: &str) -> DbResult<Option<TillSession>> {
        let session = sqlx::query_as::<_, TillSession>(
            r#"
            SELECT id, operator_id, status, opening_balance_cents,
                   closing_balance_cents, opened_at, closed_at
            FROM till_sessions
            WHERE operator_id = ?1 AND status = 'open'
            ORDER BY opened_at DESC
            LIMIT 1
            "#,
        )
        .bind(operator_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    /// Inserts a new session row.
    pub async fn insert(&self, session: &TillSession) -> DbResult<()> {
        debug!(id = %session.id, operator_id = %session.operator_id, "inserting till session");

        sqlx::query(
            r#"
            INSERT INTO till_sessions (
                id, operator_id, status, opening_balance_cents,
                closing_balance_cents, opened_at, closed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&session.id)
        .bind(&session.operator_id)
        .bind(session.status)
        .bind(session.opening_balance_cents)
        .bind(session.closing_balance_cents)
        .bind(session.opened_at)
        .bind(session.closed_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Marks a session closed with the declared balance.
    ///
    /// Guarded on `status = 'open'`; returns whether a row transitioned.
    pub async fn close(
        &self,
        session_id: &str,
        closing_balance_cents: Option<i64>,
        closed_at: DateTime<Utc>,
    ) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE till_sessions
            SET status = 'closed', closing_balance_cents = ?2, closed_at = ?3
            WHERE id = ?1 AND status = 'open'
            "#,
        )
        .bind(session_id)
        .bind(closing_balance_cents)
        .bind(closed_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Sum of net totals of all sales bound to a session.
    pub async fn sum_net_for_session(&self, session_id: &str) -> DbResult<i64> {
        let total: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT SUM(net_cents) FROM sales WHERE till_session_id = ?1
            "#,
        )
        .bind(session_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total.unwrap_or(0))
    }
}

/// Checks that a session is still open, through the caller's transaction.
///
/// The sale commit re-verifies the till under the same transaction that
/// writes the sale, so a till closed between pricing and confirmation is
/// caught before anything persists.
pub async fn is_open_in(conn: &mut SqliteConnection, session_id: &str) -> DbResult<bool> {
    let open: Option<i64> = sqlx::query_scalar(
        "SELECT 1 FROM till_sessions WHERE id = ?1 AND status = 'open'",
    )
    .bind(session_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(open.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::generate_id;
    use cafepos_core::{Operator, TillStatus};

    async fn seed_operator(db: &Database) -> String {
        let operator = Operator {
            id: generate_id(),
            display_name: "Marta".to_string(),
            role: "cashier".to_string(),
            created_at: Utc::now(),
        };
        db.operators().insert(&operator).await.unwrap();
        operator.id
    }

    fn open_session(operator_id: &str, opening_balance_cents: i64) -> TillSession {
        TillSession {
            id: generate_id(),
            operator_id: operator_id.to_string(),
            status: TillStatus::Open,
            opening_balance_cents,
            closing_balance_cents: None,
            opened_at: Utc::now(),
            closed_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_open_returns_most_recent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.tills();
        let operator_id = seed_operator(&db).await;

        let mut first = open_session(&operator_id, 5000);
        first.opened_at = Utc::now() - chrono::Duration::hours(8);
        repo.insert(&first).await.unwrap();
        repo.close(&first.id, Some(5000), Utc::now()).await.unwrap();

        let second = open_session(&operator_id, 3000);
        repo.insert(&second).await.unwrap();

        let open = repo.find_open(&operator_id).await.unwrap().unwrap();
        assert_eq!(open.id, second.id);
        assert_eq!(open.opening_balance_cents, 3000);
    }

    #[tokio::test]
    async fn test_close_only_transitions_open_sessions() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.tills();
        let operator_id = seed_operator(&db).await;

        let session = open_session(&operator_id, 5000);
        repo.insert(&session).await.unwrap();

        assert!(repo.close(&session.id, Some(6000), Utc::now()).await.unwrap());
        // Second close matches no open row.
        assert!(!repo.close(&session.id, Some(6000), Utc::now()).await.unwrap());

        let closed = repo.get_by_id(&session.id).await.unwrap().unwrap();
        assert_eq!(closed.status, TillStatus::Closed);
        assert_eq!(closed.closing_balance_cents, Some(6000));
        assert!(closed.closed_at.is_some());
    }

    #[tokio::test]
    async fn test_sum_net_empty_session_is_zero() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.tills();
        let operator_id = seed_operator(&db).await;

        let session = open_session(&operator_id, 0);
        repo.insert(&session).await.unwrap();

        assert_eq!(repo.sum_net_for_session(&session.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_is_open_in() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.tills();
        let operator_id = seed_operator(&db).await;

        let session = open_session(&operator_id, 0);
        repo.insert(&session).await.unwrap();

        let mut tx = db.pool().begin().await.unwrap();
        assert!(is_open_in(&mut tx, &session.id).await.unwrap());
        assert!(!is_open_in(&mut tx, "missing").await.unwrap());
        tx.commit().await.unwrap();

        repo.close(&session.id, None, Utc::now()).await.unwrap();

        let mut tx = db.pool().begin().await.unwrap();
        assert!(!is_open_in(&mut tx, &session.id).await.unwrap());
    }
}
