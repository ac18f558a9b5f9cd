//! # Stock Repository
//!
//! Storage primitives for the stock ledger: the conditional on-hand
//! update, movement appends, and the read projections.
//!
//! ## Lost-Update Safety
//! ```text
//! WRONG (read-then-write):
//!   SELECT quantity_on_hand ...        ← terminal A reads 5
//!                                      ← terminal B reads 5
//!   UPDATE products SET quantity_on_hand = 2   (A sells 3)
//!   UPDATE products SET quantity_on_hand = 1   (B sells 4) → oversold
//!
//! CORRECT (single conditional statement):
//!   UPDATE products
//!   SET quantity_on_hand = quantity_on_hand - ?
//!   WHERE id = ? AND quantity_on_hand >= ?
//!   → rows_affected = 0 means insufficient stock, nothing written
//! ```
//!
//! The decrement/increment + movement append pair must be atomic, so those
//! functions take a `&mut SqliteConnection` and run inside a transaction
//! owned by the caller (the engine's ledger or sale commit).

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};

use crate::error::DbResult;
use cafepos_core::{MovementHistoryEntry, StockListEntry, StockMovement};

/// Repository for stock reads.
#[derive(Debug, Clone)]
pub struct StockRepository {
    pool: SqlitePool,
}

impl StockRepository {
    pub fn new(pool: SqlitePool) -> Self {
        StockRepository { pool }
    }

    /// Current on-hand quantity for a product, or None if the product
    /// doesn't exist. Always a fresh read.
    pub async fn on_hand(&self, product_id: &str) -> DbResult<Option<i64>> {
        let qty: Option<i64> =
            sqlx::query_scalar("SELECT quantity_on_hand FROM products WHERE id = ?1")
                .bind(product_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(qty)
    }

    /// Stock overview: every product with its on-hand quantity and
    /// category name, ordered by product name.
    pub async fn list_with_categories(&self) -> DbResult<Vec<StockListEntry>> {
        let entries = sqlx::query_as::<_, StockListEntry>(
            r#"
            SELECT p.id, p.name, p.price_cents, p.quantity_on_hand,
                   c.name AS category_name
            FROM products p
            LEFT JOIN categories c ON p.category_id = c.id
            ORDER BY p.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Movement history newer than `since`, joined with product names,
    /// most recent first, capped at `limit` rows.
    pub async fn history(
        &self,
        since: DateTime<Utc>,
        limit: i64,
    ) -> DbResult<Vec<MovementHistoryEntry>> {
        let entries = sqlx::query_as::<_, MovementHistoryEntry>(
            r#"
            SELECT m.id, m.product_id, p.name AS product_name,
                   m.direction, m.quantity, m.reason, m.created_at
            FROM stock_movements m
            JOIN products p ON m.product_id = p.id
            WHERE m.created_at >= ?1
            ORDER BY m.created_at DESC
            LIMIT ?2
            "#,
        )
        .bind(since)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Products at or below the given on-hand threshold, lowest first.
    pub async fn low_stock(&self, threshold: i64) -> DbResult<Vec<StockListEntry>> {
        let entries = sqlx::query_as::<_, StockListEntry>(
            r#"
            SELECT p.id, p.name, p.price_cents, p.quantity_on_hand,
                   c.name AS category_name
            FROM products p
            LEFT JOIN categories c ON p.category_id = c.id
            WHERE p.quantity_on_hand <= ?1
            ORDER BY p.quantity_on_hand ASC, p.name
            "#,
        )
        .bind(threshold)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}

// =============================================================================
// Transaction-Scoped Primitives
// =============================================================================

/// Decrements on-hand stock if and only if enough is available.
///
/// Returns `Some(new_quantity)` on success, `None` when the conditional
/// update matched no row - either the product doesn't exist or the
/// decrement would go negative; the caller disambiguates with
/// [`on_hand_in`].
pub async fn try_decrement(
    conn: &mut SqliteConnection,
    product_id: &str,
    quantity: i64,
) -> DbResult<Option<i64>> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        UPDATE products
        SET quantity_on_hand = quantity_on_hand - ?2, updated_at = ?3
        WHERE id = ?1 AND quantity_on_hand >= ?2
        "#,
    )
    .bind(product_id)
    .bind(quantity)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    let new_qty = sqlx::query_scalar("SELECT quantity_on_hand FROM products WHERE id = ?1")
        .bind(product_id)
        .fetch_one(&mut *conn)
        .await?;

    Ok(Some(new_qty))
}

/// Increments on-hand stock.
///
/// Returns `Some(new_quantity)`, or `None` if the product doesn't exist.
pub async fn increment(
    conn: &mut SqliteConnection,
    product_id: &str,
    quantity: i64,
) -> DbResult<Option<i64>> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        UPDATE products
        SET quantity_on_hand = quantity_on_hand + ?2, updated_at = ?3
        WHERE id = ?1
        "#,
    )
    .bind(product_id)
    .bind(quantity)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    let new_qty = sqlx::query_scalar("SELECT quantity_on_hand FROM products WHERE id = ?1")
        .bind(product_id)
        .fetch_one(&mut *conn)
        .await?;

    Ok(Some(new_qty))
}

/// Appends one movement row. Movements are never updated or deleted.
pub async fn insert_movement(
    conn: &mut SqliteConnection,
    movement: &StockMovement,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO stock_movements (id, product_id, direction, quantity, reason, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&movement.id)
    .bind(&movement.product_id)
    .bind(movement.direction)
    .bind(movement.quantity)
    .bind(&movement.reason)
    .bind(movement.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Fresh on-hand read through the caller's transaction connection.
pub async fn on_hand_in(conn: &mut SqliteConnection, product_id: &str) -> DbResult<Option<i64>> {
    let qty: Option<i64> =
        sqlx::query_scalar("SELECT quantity_on_hand FROM products WHERE id = ?1")
            .bind(product_id)
            .fetch_optional(&mut *conn)
            .await?;

    Ok(qty)
}
