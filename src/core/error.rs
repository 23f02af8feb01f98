//! Typed error handling for the ticket service
//!
//! Every failure a request can hit is a [`TicketError`] variant. Each variant knows
//! its HTTP status, its human label and a stable machine code, and renders itself
//! as an [`ErrorResponse`] body:
//!
//! ```json
//! {
//!   "timestamp": "2025-01-10T12:00:00.000000",
//!   "status": 404,
//!   "error": "Not Found",
//!   "code": "TICKET_NOT_FOUND",
//!   "message": "support ticket with id 99999 not found"
//! }
//! ```
//!
//! Field and parameter validation failures carry a `details` map instead of a
//! `message`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Result alias used across the crate
pub type TicketResult<T> = Result<T, TicketError>;

/// Field or parameter name mapped to its validation message
pub type FieldErrors = BTreeMap<String, String>;

/// The main error type of the ticket service
#[derive(Debug)]
pub enum TicketError {
    /// One or more body fields failed validation
    FieldValidation(FieldErrors),

    /// One or more query parameters failed validation
    ParamValidation(FieldErrors),

    /// A path or query value could not be converted to the expected type
    TypeMismatch {
        parameter: String,
        value: String,
        expected: String,
    },

    /// A domain rule was violated
    BusinessRule { message: String },

    /// No ticket with the given id
    NotFound { id: i64 },

    /// The ticket number is already taken
    Conflict { ticket_number: String },

    /// The request body is not valid JSON or does not fit the payload shape
    MalformedBody { message: String },

    /// The storage backend failed
    Storage(StorageError),
}

impl TicketError {
    /// Single-field validation failure
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut fields = FieldErrors::new();
        fields.insert(field.into(), message.into());
        TicketError::FieldValidation(fields)
    }

    /// Single-parameter validation failure
    pub fn param(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        let mut params = FieldErrors::new();
        params.insert(parameter.into(), message.into());
        TicketError::ParamValidation(params)
    }

    pub fn type_mismatch(
        parameter: impl Into<String>,
        value: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        TicketError::TypeMismatch {
            parameter: parameter.into(),
            value: value.into(),
            expected: expected.into(),
        }
    }

    pub fn business(message: impl Into<String>) -> Self {
        TicketError::BusinessRule {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            TicketError::FieldValidation(_)
            | TicketError::ParamValidation(_)
            | TicketError::TypeMismatch { .. }
            | TicketError::BusinessRule { .. }
            | TicketError::MalformedBody { .. } => StatusCode::BAD_REQUEST,
            TicketError::NotFound { .. } => StatusCode::NOT_FOUND,
            TicketError::Conflict { .. } => StatusCode::CONFLICT,
            TicketError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short human label for the `error` field
    pub fn label(&self) -> &'static str {
        match self {
            TicketError::FieldValidation(_) => "Validation Error",
            TicketError::ParamValidation(_) => "Validation Error on Query Parameters",
            TicketError::TypeMismatch { .. } => "Invalid Type",
            TicketError::BusinessRule { .. } => "Business Logic Error",
            TicketError::NotFound { .. } => "Not Found",
            TicketError::Conflict { .. } => "Conflict",
            TicketError::MalformedBody { .. } => "Malformed Request",
            TicketError::Storage(_) => "Storage Error",
        }
    }

    /// Get the error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            TicketError::FieldValidation(_) => "FIELD_VALIDATION_FAILED",
            TicketError::ParamValidation(_) => "PARAM_VALIDATION_FAILED",
            TicketError::TypeMismatch { .. } => "TYPE_MISMATCH",
            TicketError::BusinessRule { .. } => "BUSINESS_RULE_VIOLATION",
            TicketError::NotFound { .. } => "TICKET_NOT_FOUND",
            TicketError::Conflict { .. } => "TICKET_NUMBER_CONFLICT",
            TicketError::MalformedBody { .. } => "MALFORMED_BODY",
            TicketError::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        let (message, details) = match self {
            TicketError::FieldValidation(fields) | TicketError::ParamValidation(fields) => {
                (None, Some(fields.clone()))
            }
            // Backend detail stays in the logs
            TicketError::Storage(_) => (
                Some("an unexpected storage error occurred".to_string()),
                None,
            ),
            other => (Some(other.to_string()), None),
        };

        ErrorResponse {
            timestamp: Utc::now()
                .naive_utc()
                .format("%Y-%m-%dT%H:%M:%S%.6f")
                .to_string(),
            status: self.status_code().as_u16(),
            error: self.label().to_string(),
            code: self.error_code().to_string(),
            message,
            details,
        }
    }
}

impl fmt::Display for TicketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TicketError::FieldValidation(fields) => {
                write!(f, "validation failed for fields: {}", join_keys(fields))
            }
            TicketError::ParamValidation(params) => {
                write!(f, "validation failed for parameters: {}", join_keys(params))
            }
            TicketError::TypeMismatch {
                parameter,
                value,
                expected,
            } => write!(
                f,
                "The value '{}' is not valid for parameter '{}'. Expected type: {}",
                value, parameter, expected
            ),
            TicketError::BusinessRule { message } => write!(f, "{}", message),
            TicketError::NotFound { id } => {
                write!(f, "support ticket with id {} not found", id)
            }
            TicketError::Conflict { ticket_number } => {
                write!(f, "ticket number '{}' is already in use", ticket_number)
            }
            TicketError::MalformedBody { message } => {
                write!(f, "malformed request body: {}", message)
            }
            TicketError::Storage(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for TicketError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TicketError::Storage(e) => Some(e),
            _ => None,
        }
    }
}

fn join_keys(map: &FieldErrors) -> String {
    map.keys().map(String::as_str).collect::<Vec<_>>().join(", ")
}

/// Error response structure for HTTP responses
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub timestamp: String,
    pub status: u16,
    /// Human-readable label, e.g. "Not Found"
    pub error: String,
    /// Error code for programmatic handling
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<FieldErrors>,
}

impl IntoResponse for TicketError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, code = self.error_code(), "request failed");
        } else if let TicketError::Conflict { ticket_number } = &self {
            tracing::warn!(%ticket_number, "duplicate ticket number rejected");
        } else {
            tracing::debug!(error = %self, code = self.error_code(), "request rejected");
        }
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors raised by storage backends
#[derive(Debug)]
pub enum StorageError {
    /// Failed to connect to the backend
    ConnectionError { backend: String, message: String },

    /// A statement failed
    QueryError { backend: String, message: String },

    /// Stored data could not be mapped back to a ticket
    IntegrityError { message: String },

    /// Backend not available
    Unavailable { backend: String },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::ConnectionError { backend, message } => {
                write!(f, "Failed to connect to {}: {}", backend, message)
            }
            StorageError::QueryError { backend, message } => {
                write!(f, "{} query error: {}", backend, message)
            }
            StorageError::IntegrityError { message } => {
                write!(f, "Data integrity error: {}", message)
            }
            StorageError::Unavailable { backend } => {
                write!(f, "Storage backend '{}' is unavailable", backend)
            }
        }
    }
}

impl std::error::Error for StorageError {}

impl From<StorageError> for TicketError {
    fn from(err: StorageError) -> Self {
        TicketError::Storage(err)
    }
}

impl From<serde_json::Error> for TicketError {
    fn from(err: serde_json::Error) -> Self {
        TicketError::MalformedBody {
            message: err.to_string(),
        }
    }
}
