//! # Till Manager
//!
//! Lifecycle of a cash-register session per operator: open → closed.
//!
//! At most one session is open per operator. Opening while one exists
//! fails with `TillAlreadyOpen`; the decision to force-close belongs to
//! the boundary (interactive confirmation), which then calls
//! [`TillManager::close_existing`] before retrying.
//!
//! Closing never blocks on a declared-vs-expected mismatch - the variance
//! is reported in the summary for manual reconciliation.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use cafepos_core::{validation, CoreError, Money, TillSession, TillStatus};
use cafepos_db::repository::generate_id;
use cafepos_db::Database;

use crate::audit;
use crate::error::EngineResult;

/// The till manager component.
#[derive(Debug, Clone)]
pub struct TillManager {
    db: Database,
}

/// Result of closing a till session.
///
/// `expected_total` is the sum of net totals of all sales bound to the
/// session; `declared_total` is what the operator counted. A mismatch is
/// reported here, never rejected.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TillCloseSummary {
    pub expected_total: Money,
    pub declared_total: Money,
}

impl TillCloseSummary {
    /// Declared minus expected: positive means cash over, negative short.
    #[inline]
    pub fn variance(&self) -> Money {
        self.declared_total - self.expected_total
    }
}

impl TillManager {
    /// Creates a till manager over the given database handle.
    pub fn new(db: Database) -> Self {
        TillManager { db }
    }

    /// Opens a new session for the operator.
    ///
    /// Fails with `InvalidInput` on a negative opening balance and with
    /// `TillAlreadyOpen` when the operator still has an open session
    /// (lookup-before-insert keeps the one-open-session invariant).
    pub async fn open(
        &self,
        operator_id: &str,
        opening_balance: Money,
    ) -> EngineResult<TillSession> {
        validation::validate_opening_balance(opening_balance).map_err(CoreError::from)?;

        if let Some(existing) = self.db.tills().find_open(operator_id).await? {
            return Err(CoreError::TillAlreadyOpen {
                session_id: existing.id,
            }
            .into());
        }

        let session = TillSession {
            id: generate_id(),
            operator_id: operator_id.to_string(),
            status: TillStatus::Open,
            opening_balance_cents: opening_balance.cents(),
            closing_balance_cents: None,
            opened_at: Utc::now(),
            closed_at: None,
        };
        self.db.tills().insert(&session).await?;

        info!(session_id = %session.id, operator_id, opening = %opening_balance, "till opened");

        audit::record_event(
            &self.db,
            operator_id,
            "till_opened",
            json!({ "session_id": session.id, "opening_cents": opening_balance.cents() }),
        )
        .await;

        Ok(session)
    }

    /// The operator's currently open session, if any. Pure lookup.
    pub async fn get_open(&self, operator_id: &str) -> EngineResult<Option<TillSession>> {
        Ok(self.db.tills().find_open(operator_id).await?)
    }

    /// Force-closes the operator's open session, if any, without a
    /// declared balance. Returns the closed session id.
    ///
    /// Called by the boundary after the operator confirms overriding an
    /// existing session.
    pub async fn close_existing(&self, operator_id: &str) -> EngineResult<Option<String>> {
        let Some(existing) = self.db.tills().find_open(operator_id).await? else {
            return Ok(None);
        };

        self.db.tills().close(&existing.id, None, Utc::now()).await?;

        info!(session_id = %existing.id, operator_id, "till force-closed");

        audit::record_event(
            &self.db,
            operator_id,
            "till_closed",
            json!({ "session_id": existing.id, "forced": true }),
        )
        .await;

        Ok(Some(existing.id))
    }

    /// Closes a session with the operator's declared balance and reports
    /// the expected total for reconciliation.
    ///
    /// Fails with `NotFound` if the id doesn't reference an open session.
    /// The guarded update re-checks session state in the store, never a
    /// stale in-memory copy. Expected total is computed after the close so
    /// no sale can slip in between.
    pub async fn close(
        &self,
        session_id: &str,
        declared_total: Money,
    ) -> EngineResult<TillCloseSummary> {
        let transitioned = self
            .db
            .tills()
            .close(session_id, Some(declared_total.cents()), Utc::now())
            .await?;
        if !transitioned {
            return Err(CoreError::not_found("open till session", session_id).into());
        }

        let expected_total = Money::from_cents(self.db.tills().sum_net_for_session(session_id).await?);

        let summary = TillCloseSummary {
            expected_total,
            declared_total,
        };

        info!(
            session_id,
            expected = %summary.expected_total,
            declared = %summary.declared_total,
            variance = %summary.variance(),
            "till closed"
        );

        // The session row knows its operator; for the event we look it up.
        if let Some(session) = self.db.tills().get_by_id(session_id).await? {
            audit::record_event(
                &self.db,
                &session.operator_id,
                "till_closed",
                json!({
                    "session_id": session_id,
                    "expected_cents": summary.expected_total.cents(),
                    "declared_cents": summary.declared_total.cents(),
                }),
            )
            .await;
        }

        Ok(summary)
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
    async fn test_open_and_get_open() {
        let db = testutil::db().await;
        let tills = TillManager::new(db.clone());
        let operator_id = testutil::seed_operator(&db, "Marta").await;

        assert!(tills.get_open(&operator_id).await.unwrap().is_none());

        let session = tills.open(&operator_id, Money::from_cents(5000)).await.unwrap();
        assert_eq!(session.status, TillStatus::Open);
        assert_eq!(session.opening_balance_cents, 5000);

        let found = tills.get_open(&operator_id).await.unwrap().unwrap();
        assert_eq!(found.id, session.id);
    }

    #[tokio::test]
    async fn test_open_rejects_negative_balance() {
        let db = testutil::db().await;
        let tills = TillManager::new(db.clone());
        let operator_id = testutil::seed_operator(&db, "Marta").await;

        let err = tills
            .open(&operator_id, Money::from_cents(-100))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Domain(CoreError::InvalidInput(_))
        ));
        assert!(tills.get_open(&operator_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_open_requires_closing_existing_first() {
        let db = testutil::db().await;
        let tills = TillManager::new(db.clone());
        let operator_id = testutil::seed_operator(&db, "Marta").await;

        let first = tills.open(&operator_id, Money::zero()).await.unwrap();

        let err = tills.open(&operator_id, Money::zero()).await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::Domain(CoreError::TillAlreadyOpen { ref session_id }) if *session_id == first.id
        ));

        // The boundary confirms, force-closes, then reopens.
        let closed = tills.close_existing(&operator_id).await.unwrap();
        assert_eq!(closed.as_deref(), Some(first.id.as_str()));
        tills.open(&operator_id, Money::zero()).await.unwrap();
    }

    #[tokio::test]
    async fn test_close_existing_without_open_session() {
        let db = testutil::db().await;
        let tills = TillManager::new(db.clone());
        let operator_id = testutil::seed_operator(&db, "Marta").await;

        assert!(tills.close_existing(&operator_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_operators_open_tills_independently() {
        let db = testutil::db().await;
        let tills = TillManager::new(db.clone());
        let marta = testutil::seed_operator(&db, "Marta").await;
        let jonas = testutil::seed_operator(&db, "Jonas").await;

        tills.open(&marta, Money::from_cents(5000)).await.unwrap();
        tills.open(&jonas, Money::from_cents(2000)).await.unwrap();

        assert_eq!(
            tills.get_open(&marta).await.unwrap().unwrap().opening_balance_cents,
            5000
        );
        assert_eq!(
            tills.get_open(&jonas).await.unwrap().unwrap().opening_balance_cents,
            2000
        );
    }

    #[tokio::test]
    async fn test_close_reports_mismatch_without_blocking() {
        let db = testutil::db().await;
        let tills = TillManager::new(db.clone());
        let operator_id = testutil::seed_operator(&db, "Marta").await;

        let session = tills.open(&operator_id, Money::from_cents(5000)).await.unwrap();

        // No sales: expected 0, declared 48.75 - closing still succeeds.
        let summary = tills.close(&session.id, Money::from_cents(4875)).await.unwrap();
        assert_eq!(summary.expected_total.cents(), 0);
        assert_eq!(summary.declared_total.cents(), 4875);
        assert_eq!(summary.variance().cents(), 4875);

        let closed = db.tills().get_by_id(&session.id).await.unwrap().unwrap();
        assert_eq!(closed.status, TillStatus::Closed);
        assert_eq!(closed.closing_balance_cents, Some(4875));
    }

    #[tokio::test]
    async fn test_close_twice_fails_with_not_found() {
        let db = testutil::db().await;
        let tills = TillManager::new(db.clone());
        let operator_id = testutil::seed_operator(&db, "Marta").await;

        let session = tills.open(&operator_id, Money::zero()).await.unwrap();
        tills.close(&session.id, Money::zero()).await.unwrap();

        let err = tills.close(&session.id, Money::zero()).await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::Domain(CoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_till_events_are_audited() {
        let db = testutil::db().await;
        let tills = TillManager::new(db.clone());
        let operator_id = testutil::seed_operator(&db, "Marta").await;

        let session = tills.open(&operator_id, Money::zero()).await.unwrap();
        tills.close(&session.id, Money::zero()).await.unwrap();

        assert_eq!(db.audit().count().await.unwrap(), 2);
    }
}
