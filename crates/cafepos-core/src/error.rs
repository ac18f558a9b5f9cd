//! # Error Types
//!
//! Domain error types for the café POS core.
//!
//! ## Error Hierarchy
//! ```text
//! cafepos-core (this file)
//! ├── CoreError        - business rule violations
//! └── ValidationError  - malformed/out-of-range inputs
//!
//! cafepos-db
//! └── DbError          - storage operation failures
//!
//! cafepos-engine
//! └── EngineError      - CoreError ∪ DbError, what the boundary sees
//! ```
//!
//! Recoverability rules live with the engine error: invalid input and an
//! empty cart are re-promptable at the boundary; a missing till aborts the
//! sale workflow; storage failures propagate.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations and domain failures.
#[derive(Debug, Error)]
pub enum CoreError {
    /// User-supplied value is malformed or out of range.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A sale was attempted with no open till session for the operator.
    ///
    /// Aborts the whole sale workflow; the operator must open a till first.
    #[error("no open till session for operator {operator_id}")]
    NoOpenTill { operator_id: String },

    /// The operator already has an open till session.
    ///
    /// The caller decides whether to force-close it (`close_existing`)
    /// before opening a new one; the component never decides that itself.
    #[error("operator already has open till session {session_id}")]
    TillAlreadyOpen { session_id: String },

    /// A sale confirmation was attempted with zero line items.
    #[error("cannot confirm a sale with no line items")]
    EmptyCart,

    /// Requested quantity exceeds what is on hand.
    ///
    /// Carries the actually-available quantity so the caller can retry
    /// with a smaller amount.
    #[error("insufficient stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: String,
        available: i64,
        requested: i64,
    },

    /// Cart has reached the maximum number of distinct products.
    #[error("cart cannot hold more than {max} distinct products")]
    CartTooLarge { max: usize },

    /// A line quantity exceeds the per-line maximum.
    #[error("quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },
}

impl CoreError {
    /// Convenience constructor for [`CoreError::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation failures, raised before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },

    #[error("{field} must be positive")]
    MustBePositive { field: &'static str },

    #[error("{field} must not be negative")]
    MustNotBeNegative { field: &'static str },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
    },
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            product_id: "p-espresso".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "insufficient stock for product p-espresso: available 3, requested 5"
        );

        let err = CoreError::NoOpenTill {
            operator_id: "op-1".to_string(),
        };
        assert_eq!(err.to_string(), "no open till session for operator op-1");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let err: CoreError = ValidationError::MustBePositive { field: "quantity" }.into();
        assert!(matches!(err, CoreError::InvalidInput(_)));
        assert_eq!(err.to_string(), "invalid input: quantity must be positive");
    }
}
