//! Reusable field validators
//!
//! Plugged into `#[validate(custom(function = ...))]` attributes on request
//! structs.

use validator::ValidationError;

/// Validator: string must contain something other than whitespace
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("blank"))
    } else {
        Ok(())
    }
}
