//! Axum extractor for validated JSON payloads
//!
//! `Validated<T>` deserializes the body into `T` and runs its declared rules
//! before the handler sees it. A body that is not valid JSON, or that does not fit
//! the payload shape, is rejected as [`TicketError::MalformedBody`]; rule failures
//! are rejected as [`TicketError::FieldValidation`].

use crate::core::error::TicketError;
use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;
use validator::Validate;

/// Axum extractor that deserializes and validates a payload
///
/// # Usage
///
/// ```rust,ignore
/// pub async fn create_ticket(
///     Validated(payload): Validated<NewTicket>,
/// ) -> TicketResult<Json<SupportTicket>> {
///     // payload already passed its field rules
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Validated<T>(pub T);

impl<T> Validated<T> {
    /// Get the inner payload
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> std::ops::Deref for Validated<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<JsonRejection> for TicketError {
    fn from(rejection: JsonRejection) -> Self {
        TicketError::MalformedBody {
            message: rejection.body_text(),
        }
    }
}

impl<S, T> FromRequest<S> for Validated<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate + Send,
{
    type Rejection = TicketError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<T>::from_request(req, state).await?;
        super::validate(&payload)?;
        Ok(Validated(payload))
    }
}
