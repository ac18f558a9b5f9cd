//! Fire-and-forget audit event notifications.
//!
//! A failed audit write is logged to the diagnostic channel and swallowed;
//! it never aborts or rolls back the operation that triggered it.

use tracing::warn;

use cafepos_db::Database;

pub(crate) async fn record_event(
    db: &Database,
    operator_id: &str,
    event: &str,
    detail: serde_json::Value,
) {
    if let Err(err) = db
        .audit()
        .record(Some(operator_id), event, Some(&detail.to_string()))
        .await
    {
        warn!(error = %err, event, "audit log write failed");
    }
}
