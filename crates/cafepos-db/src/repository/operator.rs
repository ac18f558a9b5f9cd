//! # Operator Repository
//!
//! Staff rows referenced by till sessions and sales. Authentication and
//! credential storage are an external collaborator; this repository only
//! persists the identities the rest of the schema points at.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use cafepos_core::Operator;

#[derive(Debug, Clone)]
pub struct OperatorRepository {
    pool: SqlitePool,
}

impl OperatorRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OperatorRepository { pool }
    }

    /// Gets an operator by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Operator>> {
        let operator = sqlx::query_as::<_, Operator>(
            r#"
            SELECT id, display_name, role, created_at
            FROM operators
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(operator)
    }

    /// Inserts a new operator.
    pub async fn insert(&self, operator: &Operator) -> DbResult<()> {
        debug!(id = %operator.id, "inserting operator");

        sqlx::query(
            r#"
            INSERT INTO operators (id, display_name, role, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&operator.id)
        .bind(&operator.display_name)
        .bind(&operator.role)
        .bind(operator.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::generate_id;
    use chrono::Utc;

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.operators();

        let operator = Operator {
            id: generate_id(),
            display_name: "Marta Lima".to_string(),
            role: "manager".to_string(),
            created_at: Utc::now(),
        };
        repo.insert(&operator).await.unwrap();

        let loaded = repo.get_by_id(&operator.id).await.unwrap().unwrap();
        assert_eq!(loaded.display_name, "Marta Lima");
        assert_eq!(loaded.role, "manager");
        assert!(repo.get_by_id("missing").await.unwrap().is_none());
    }
}
