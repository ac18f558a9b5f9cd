//! # Engine Error Type
//!
//! What the interactive boundary sees: every domain error from
//! `cafepos-core` plus storage failures from `cafepos-db`.
//!
//! ## Propagation Rules
//! ```text
//! InvalidInput, EmptyCart        → re-prompt at the boundary
//! NoOpenTill                     → abort the sale workflow, open a till
//! InsufficientStock (at commit)  → whole persist rolled back, retry smaller
//! Storage                        → boundary informs operator and aborts
//! ```

use thiserror::Error;

use cafepos_core::CoreError;
use cafepos_db::DbError;

/// Unified error for engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A business rule or input problem.
    #[error(transparent)]
    Domain(#[from] CoreError),

    /// The backing store failed. Never silently retried by the engine.
    #[error("storage failure: {0}")]
    Storage(#[from] DbError),
}

impl EngineError {
    /// Whether the boundary should re-prompt instead of aborting the
    /// current workflow.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EngineError::Domain(
                CoreError::InvalidInput(_)
                    | CoreError::EmptyCart
                    | CoreError::QuantityTooLarge { .. }
                    | CoreError::CartTooLarge { .. }
            )
        )
    }
}

impl From<sqlx::Error> for EngineError {
    fn from(err: sqlx::Error) -> Self {
        EngineError::Storage(DbError::from(err))
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use cafepos_core::ValidationError;

    #[test]
    fn test_recoverability() {
        let err: EngineError =
            CoreError::from(ValidationError::MustBePositive { field: "quantity" }).into();
        assert!(err.is_recoverable());

        let err: EngineError = CoreError::EmptyCart.into();
        assert!(err.is_recoverable());

        let err: EngineError = CoreError::NoOpenTill {
            operator_id: "op".into(),
        }
        .into();
        assert!(!err.is_recoverable());

        let err: EngineError = DbError::PoolExhausted.into();
        assert!(!err.is_recoverable());
    }
}
