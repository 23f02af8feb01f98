//! Custom field validators used by the payload derives

use rust_decimal::Decimal;
use validator::ValidationError;

/// Text must contain at least one non-whitespace character
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("not_blank"))
    } else {
        Ok(())
    }
}

/// Amount must be zero or positive
pub fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        Err(ValidationError::new("non_negative"))
    } else {
        Ok(())
    }
}
