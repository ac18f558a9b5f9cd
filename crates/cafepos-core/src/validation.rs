//! # Validation Module
//!
//! Early input checks, run before business logic. The interactive boundary
//! re-prompts on these; they never abort the process.

use crate::error::ValidationError;
use crate::money::Money;
use crate::MAX_LINE_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates a stock or sale line quantity.
///
/// Must be a positive integer no larger than [`MAX_LINE_QUANTITY`].
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive { field: "quantity" });
    }
    if quantity > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity",
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }
    Ok(())
}

/// Validates a till opening balance. Zero is allowed; negative is not.
pub fn validate_opening_balance(balance: Money) -> ValidationResult<()> {
    if balance.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "opening balance",
        });
    }
    Ok(())
}

/// Validates a product name for catalogue writes.
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    if name.trim().is_empty() {
        return Err(ValidationError::Required { field: "name" });
    }
    Ok(())
}
