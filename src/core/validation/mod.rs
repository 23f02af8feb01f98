//! Payload validation
//!
//! Payload structs declare their rules with `#[derive(validator::Validate)]`.
//! [`validate`] runs them and turns any failure into a
//! [`TicketError::FieldValidation`] keyed by the camelCase JSON field name.

pub mod extractor;
pub mod validators;

pub use extractor::Validated;
pub use validators::{non_negative, not_blank};

use crate::core::error::{FieldErrors, TicketError, TicketResult};
use validator::{Validate, ValidationErrors};

/// Run the declared rules of `payload`
pub fn validate<T: Validate>(payload: &T) -> TicketResult<()> {
    payload.validate().map_err(TicketError::from)
}

/// Flatten validator output into one message per field
///
/// The first failing rule of a field wins.
pub fn field_messages(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .filter_map(|(field, failures)| {
            failures.first().map(|failure| {
                let message = failure
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("invalid value ({})", failure.code));
                (to_camel_case(&field), message)
            })
        })
        .collect()
}

impl From<ValidationErrors> for TicketError {
    fn from(errors: ValidationErrors) -> Self {
        TicketError::FieldValidation(field_messages(&errors))
    }
}

fn to_camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
