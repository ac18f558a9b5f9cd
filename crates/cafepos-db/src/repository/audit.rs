//! # Audit Log Repository
//!
//! Append-only event trail: till opened/closed, sale completed. Callers
//! treat writes as fire-and-forget - a failed audit write is logged and
//! swallowed, never escalated to the triggering operation.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::DbResult;
use crate::repository::generate_id;

/// Repository for audit log writes.
#[derive(Debug, Clone)]
pub struct AuditRepository {
    pool: SqlitePool,
}

impl AuditRepository {
    pub fn new(pool: SqlitePool) -> Self {
        AuditRepository { pool }
    }

    /// Appends one event row.
    pub async fn record(
        &self,
        operator_id: Option<&str>,
        event: &str,
        detail: Option<&str>,
    ) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_log (id, operator_id, event, detail, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(generate_id())
        .bind(operator_id)
        .bind(event)
        .bind(detail)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Number of recorded events (test helper).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM audit_log")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
