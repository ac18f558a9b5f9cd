//! # Sale Repository
//!
//! Storage for sale headers and line items. Sales are immutable once
//! written: there is no update or void path.
//!
//! The inserts take a `&mut SqliteConnection` because a sale never
//! persists alone - the engine writes header, line items, stock decrements
//! and movement rows as one transaction, and a failure anywhere rolls all
//! of it back.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use cafepos_core::{Sale, SaleLineItem};

/// Repository for sale reads.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, till_session_id, customer_id, operator_id,
                   gross_cents, discount_cents, net_cents, created_at
            FROM sales
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// All sales rung on a till session, oldest first.
    pub async fn list_for_session(&self, session_id: &str) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, till_session_id, customer_id, operator_id,
                   gross_cents, discount_cents, net_cents, created_at
            FROM sales
            WHERE till_session_id = ?1
            ORDER BY created_at
            "#,
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Line items of a sale, in insertion order.
    pub async fn get_line_items(&self, sale_id: &str) -> DbResult<Vec<SaleLineItem>> {
        let items = sqlx::query_as::<_, SaleLineItem>(
            r#"
            SELECT id, sale_id, product_id, quantity,
                   unit_price_cents, line_total_cents, created_at
            FROM sale_line_items
            WHERE sale_id = ?1
            ORDER BY created_at
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Count of line item rows across all sales (test/reporting helper).
    pub async fn count_line_items(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sale_line_items")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Count of sale headers (test/reporting helper).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Transaction-Scoped Writes
// =============================================================================

/// Inserts a sale header inside the caller's transaction.
pub async fn insert_sale(conn: &mut SqliteConnection, sale: &Sale) -> DbResult<()> {
    debug!(id = %sale.id, net_cents = sale.net_cents, "inserting sale");

    sqlx::query(
        r#"
        INSERT INTO sales (
            id, till_session_id, customer_id, operator_id,
            gross_cents, discount_cents, net_cents, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&sale.id)
    .bind(&sale.till_session_id)
    .bind(&sale.customer_id)
    .bind(&sale.operator_id)
    .bind(sale.gross_cents)
    .bind(sale.discount_cents)
    .bind(sale.net_cents)
    .bind(sale.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Inserts one line item inside the caller's transaction.
pub async fn insert_line_item(conn: &mut SqliteConnection, item: &SaleLineItem) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO sale_line_items (
            id, sale_id, product_id, quantity,
            unit_price_cents, line_total_cents, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(&item.id)
    .bind(&item.sale_id)
    .bind(&item.product_id)
    .bind(item.quantity)
    .bind(item.unit_price_cents)
    .bind(item.line_total_cents)
    .bind(item.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::generate_id;
    use cafepos_core::{Operator, Product, TillSession, TillStatus};
    use chrono::Utc;

    /// Seeds the rows a sale's foreign keys point at and returns
    /// (operator_id, session_id, product_id).
    async fn seed_refs(db: &Database) -> (String, String, String) {
        let now = Utc::now();

        let operator = Operator {
            id: generate_id(),
            display_name: "Marta".to_string(),
            role: "cashier".to_string(),
            created_at: now,
        };
        db.operators().insert(&operator).await.unwrap();

        let session = TillSession {
            id: generate_id(),
            operator_id: operator.id.clone(),
            status: TillStatus::Open,
            opening_balance_cents: 0,
            closing_balance_cents: None,
            opened_at: now,
            closed_at: None,
        };
        db.tills().insert(&session).await.unwrap();

        let product = Product {
            id: generate_id(),
            name: "Espresso".to_string(),
            price_cents: 350,
            quantity_on_hand: 10,
            category_id: None,
            created_at: now,
            updated_at: now,
        };
        db.products().insert(&product).await.unwrap();

        (operator.id, session.id, product.id)
    }

    #[tokio::test]
    async fn test_insert_and_read_back() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (operator_id, session_id, product_id) = seed_refs(&db).await;
        let now = Utc::now();

        let sale = Sale {
            id: generate_id(),
            till_session_id: session_id.clone(),
            customer_id: None,
            operator_id,
            gross_cents: 700,
            discount_cents: 0,
            net_cents: 700,
            created_at: now,
        };
        let item = SaleLineItem {
            id: generate_id(),
            sale_id: sale.id.clone(),
            product_id,
            quantity: 2,
            unit_price_cents: 350,
            line_total_cents: 700,
            created_at: now,
        };

        let mut tx = db.pool().begin().await.unwrap();
        insert_sale(&mut tx, &sale).await.unwrap();
        insert_line_item(&mut tx, &item).await.unwrap();
        tx.commit().await.unwrap();

        let repo = db.sales();
        let loaded = repo.get_by_id(&sale.id).await.unwrap().unwrap();
        assert_eq!(loaded.net_cents, 700);

        let for_session = repo.list_for_session(&session_id).await.unwrap();
        assert_eq!(for_session.len(), 1);
        assert_eq!(for_session[0].id, sale.id);

        let items = repo.get_line_items(&sale.id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 2);
        assert_eq!(repo.count().await.unwrap(), 1);
        assert_eq!(repo.count_line_items().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_dropped_transaction_leaves_no_rows() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (operator_id, session_id, _product_id) = seed_refs(&db).await;

        let sale = Sale {
            id: generate_id(),
            till_session_id: session_id,
            customer_id: None,
            operator_id,
            gross_cents: 350,
            discount_cents: 0,
            net_cents: 350,
            created_at: Utc::now(),
        };

        let mut tx = db.pool().begin().await.unwrap();
        insert_sale(&mut tx, &sale).await.unwrap();
        drop(tx); // rollback

        assert_eq!(db.sales().count().await.unwrap(), 0);
    }
}
