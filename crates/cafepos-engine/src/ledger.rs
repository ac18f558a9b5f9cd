//! # Stock Ledger
//!
//! Owns product on-hand quantity and the append-only movement history.
//!
//! ## The Atomic Unit
//! Every successful [`StockLedger::adjust`] does exactly two writes in one
//! transaction:
//! ```text
//! 1. conditional UPDATE of products.quantity_on_hand
//!    (for `out`: only if enough is available - rows_affected checked)
//! 2. INSERT of one stock_movements row
//! ```
//! Both land or neither does; subsequent reads never observe one without
//! the other, and the history always reconciles against on-hand quantity.

use chrono::{Duration, Utc};
use tracing::info;

use cafepos_core::{
    validation, CoreError, MovementDirection, MovementHistoryEntry, StockListEntry, StockMovement,
};
use cafepos_db::repository::{generate_id, stock};
use cafepos_db::{Database, DbError};

use crate::error::EngineResult;

/// Default row cap for [`StockLedger::history`].
pub const DEFAULT_HISTORY_LIMIT: i64 = 50;

/// The stock ledger component.
#[derive(Debug, Clone)]
pub struct StockLedger {
    db: Database,
}

impl StockLedger {
    /// Creates a ledger over the given database handle.
    pub fn new(db: Database) -> Self {
        StockLedger { db }
    }

    /// Adjusts a product's on-hand quantity and records the movement.
    ///
    /// Returns the new on-hand quantity.
    ///
    /// ## Failure Modes
    /// - quantity not a positive integer → `InvalidInput`, nothing written
    /// - unknown product → `NotFound`, nothing written
    /// - `out` that would go negative → `InsufficientStock` carrying the
    ///   actually-available quantity, nothing written
    ///
    /// The decrement is a single conditional UPDATE, so two terminals
    /// adjusting the same product cannot both spend the same stock.
    pub async fn adjust(
        &self,
        product_id: &str,
        direction: MovementDirection,
        quantity: i64,
        reason: Option<&str>,
    ) -> EngineResult<i64> {
        validation::validate_quantity(quantity).map_err(CoreError::from)?;

        let mut tx = self.db.pool().begin().await.map_err(DbError::from)?;

        let new_quantity = match direction {
            MovementDirection::Out => {
                match stock::try_decrement(&mut tx, product_id, quantity).await? {
                    Some(qty) => qty,
                    // No row matched: missing product or not enough stock.
                    None => match stock::on_hand_in(&mut tx, product_id).await? {
                        None => {
                            return Err(CoreError::not_found("product", product_id).into());
                        }
                        Some(available) => {
                            return Err(CoreError::InsufficientStock {
                                product_id: product_id.to_string(),
                                available,
                                requested: quantity,
                            }
                            .into());
                        }
                    },
                }
            }
            MovementDirection::In => stock::increment(&mut tx, product_id, quantity)
                .await?
                .ok_or_else(|| CoreError::not_found("product", product_id))?,
        };

        let movement = StockMovement {
            id: generate_id(),
            product_id: product_id.to_string(),
            direction,
            quantity,
            reason: reason.map(str::to_string),
            created_at: Utc::now(),
        };
        stock::insert_movement(&mut tx, &movement).await?;

        tx.commit().await.map_err(DbError::from)?;

        info!(
            product_id,
            %direction,
            quantity,
            new_quantity,
            "stock adjusted"
        );

        Ok(new_quantity)
    }

    /// Stock overview: all products with on-hand quantity and category
    /// name, ordered by product name.
    pub async fn list(&self) -> EngineResult<Vec<StockListEntry>> {
        Ok(self.db.stock().list_with_categories().await?)
    }

    /// Movement history of the last `days` days, most recent first, capped
    /// at `limit` rows (default [`DEFAULT_HISTORY_LIMIT`]).
    ///
    /// Every movement carries its own timestamp; there is no undated
    /// fallback row.
    pub async fn history(
        &self,
        days: i64,
        limit: Option<i64>,
    ) -> EngineResult<Vec<MovementHistoryEntry>> {
        let since = Utc::now() - Duration::days(days);
        let limit = limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
        Ok(self.db.stock().history(since, limit).await?)
    }

    /// Products at or below `threshold` on hand, lowest first.
    pub async fn low_stock(&self, threshold: i64) -> EngineResult<Vec<StockListEntry>> {
        Ok(self.db.stock().low_stock(threshold).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::testutil;

    #[tokio::test]
    async fn test_adjust_in_and_out() {
        let db = testutil::db().await;
        let ledger = StockLedger::new(db.clone());
        let id = testutil::seed_product(&db, "Espresso", 350, 10).await;

        assert_eq!(
            ledger.adjust(&id, MovementDirection::In, 5, Some("restock")).await.unwrap(),
            15
        );
        assert_eq!(
            ledger.adjust(&id, MovementDirection::Out, 4, None).await.unwrap(),
            11
        );
        assert_eq!(db.stock().on_hand(&id).await.unwrap(), Some(11));
    }

    #[tokio::test]
    async fn test_adjust_writes_one_movement_per_call() {
        let db = testutil::db().await;
        let ledger = StockLedger::new(db.clone());
        let id = testutil::seed_product(&db, "Espresso", 350, 10).await;

        ledger.adjust(&id, MovementDirection::In, 5, Some("restock")).await.unwrap();
        ledger.adjust(&id, MovementDirection::Out, 2, None).await.unwrap();

        let entries = ledger.history(7, None).await.unwrap();
        assert_eq!(entries.len(), 2);
        // Most recent first.
        assert_eq!(entries[0].direction, MovementDirection::Out);
        assert_eq!(entries[0].quantity, 2);
        assert_eq!(entries[1].direction, MovementDirection::In);
        assert_eq!(entries[1].quantity, 5);
        assert_eq!(entries[1].reason.as_deref(), Some("restock"));
    }

    #[tokio::test]
    async fn test_out_never_goes_negative() {
        let db = testutil::db().await;
        let ledger = StockLedger::new(db.clone());
        let id = testutil::seed_product(&db, "Brownie", 450, 3).await;

        let err = ledger
            .adjust(&id, MovementDirection::Out, 4, None)
            .await
            .unwrap_err();
        match err {
            EngineError::Domain(CoreError::InsufficientStock {
                available,
                requested,
                ..
            }) => {
                assert_eq!(available, 3);
                assert_eq!(requested, 4);
            }
            other => panic!("unexpected error: {other}"),
        }

        // Quantity unchanged, no movement recorded for the rejected call.
        assert_eq!(db.stock().on_hand(&id).await.unwrap(), Some(3));
        assert!(ledger.history(7, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_adjust_rejects_non_positive_quantity() {
        let db = testutil::db().await;
        let ledger = StockLedger::new(db.clone());
        let id = testutil::seed_product(&db, "Latte", 600, 5).await;

        for qty in [0, -2] {
            let err = ledger
                .adjust(&id, MovementDirection::In, qty, None)
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                EngineError::Domain(CoreError::InvalidInput(_))
            ));
        }
        assert_eq!(db.stock().on_hand(&id).await.unwrap(), Some(5));
    }

    #[tokio::test]
    async fn test_adjust_unknown_product() {
        let db = testutil::db().await;
        let ledger = StockLedger::new(db.clone());

        for direction in [MovementDirection::In, MovementDirection::Out] {
            let err = ledger.adjust("missing", direction, 1, None).await.unwrap_err();
            assert!(matches!(
                err,
                EngineError::Domain(CoreError::NotFound { .. })
            ));
        }
    }

    #[tokio::test]
    async fn test_history_honors_limit() {
        let db = testutil::db().await;
        let ledger = StockLedger::new(db.clone());
        let id = testutil::seed_product(&db, "Espresso", 350, 100).await;

        for _ in 0..5 {
            ledger.adjust(&id, MovementDirection::Out, 1, None).await.unwrap();
        }

        assert_eq!(ledger.history(7, Some(3)).await.unwrap().len(), 3);
        assert_eq!(ledger.history(7, None).await.unwrap().len(), 5);
    }
}
