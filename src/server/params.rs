//! Request parameter extraction
//!
//! Raw query values are taken as strings and converted here so that a bad value
//! produces a `TYPE_MISMATCH` or `PARAM_VALIDATION_FAILED` body instead of axum's
//! plain-text rejection.

use crate::config::PaginationConfig;
use crate::core::entity::{Currency, TicketStatus};
use crate::core::error::{FieldErrors, TicketError, TicketResult};
use crate::core::filter::TicketFilter;
use crate::core::query::{PageRequest, Sort};
use axum::extract::{FromRequestParts, Path, Query};
use axum::http::request::Parts;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;

/// Ticket id taken from the `{id}` path segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TicketId(pub i64);

impl<S> FromRequestParts<S> for TicketId
where
    S: Send + Sync,
{
    type Rejection = TicketError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| TicketError::param("id", e.body_text()))?;

        raw.parse::<i64>()
            .map(TicketId)
            .map_err(|_| TicketError::type_mismatch("id", raw, "integer"))
    }
}

/// Query string of the list endpoint, before conversion
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub q: Option<String>,
    pub status: Option<String>,
    pub currency: Option<String>,
    pub min_cost: Option<String>,
    pub max_cost: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub page: Option<String>,
    pub size: Option<String>,
    pub sort: Option<String>,
}

impl<S> FromRequestParts<S> for ListParams
where
    S: Send + Sync,
{
    type Rejection = TicketError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<ListParams>::from_request_parts(parts, state)
            .await
            .map_err(|e| TicketError::param("query", e.body_text()))?;
        Ok(params)
    }
}

/// Empty values count as absent
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn convert<T: FromStr>(
    parameter: &str,
    value: Option<String>,
    expected: impl FnOnce() -> String,
) -> TicketResult<Option<T>> {
    match present(value) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| TicketError::type_mismatch(parameter, raw, expected())),
    }
}

/// Accepts `yyyy-MM-ddTHH:mm:ss[.fraction]` or a bare `yyyy-MM-dd` (start of day)
fn convert_timestamp(parameter: &str, value: Option<String>) -> TicketResult<Option<NaiveDateTime>> {
    let Some(raw) = present(value) else {
        return Ok(None);
    };
    let trimmed = raw.trim();

    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(Some)
        .ok_or_else(|| {
            TicketError::type_mismatch(
                parameter,
                raw.clone(),
                "date-time (yyyy-MM-ddTHH:mm:ss)",
            )
        })
}

impl ListParams {
    /// Convert and validate the raw values
    ///
    /// The first value that cannot be converted fails with `TypeMismatch`. Range
    /// violations are then collected for every parameter and reported together.
    pub fn into_query(self, limits: &PaginationConfig) -> TicketResult<(TicketFilter, PageRequest)> {
        let status = convert::<TicketStatus>("status", self.status, || {
            format!("TicketStatus (one of {})", TicketStatus::expected())
        })?;
        let currency = convert::<Currency>("currency", self.currency, || {
            format!("Currency (one of {})", Currency::expected())
        })?;
        let min_cost = convert::<Decimal>("minCost", self.min_cost, || "decimal".to_string())?;
        let max_cost = convert::<Decimal>("maxCost", self.max_cost, || "decimal".to_string())?;
        let from = convert_timestamp("from", self.from)?;
        let to = convert_timestamp("to", self.to)?;
        let page = convert::<i64>("page", self.page, || "integer".to_string())?;
        let size = convert::<i64>("size", self.size, || "integer".to_string())?;

        let mut violations = FieldErrors::new();

        if min_cost.is_some_and(|c| c.is_sign_negative() && !c.is_zero()) {
            violations.insert("minCost".into(), "must be zero or greater".into());
        }
        if max_cost.is_some_and(|c| c.is_sign_negative() && !c.is_zero()) {
            violations.insert("maxCost".into(), "must be zero or greater".into());
        }
        if page.is_some_and(|p| p < 0) {
            violations.insert("page".into(), "must be zero or greater".into());
        }
        if size.is_some_and(|s| s < 1 || s > limits.max_size as i64) {
            violations.insert(
                "size".into(),
                format!("must be between 1 and {}", limits.max_size),
            );
        }

        let sort = match present(self.sort) {
            None => Sort::default(),
            Some(raw) => match raw.parse::<Sort>() {
                Ok(sort) => sort,
                Err(message) => {
                    violations.insert("sort".into(), message);
                    Sort::default()
                }
            },
        };

        if !violations.is_empty() {
            return Err(TicketError::ParamValidation(violations));
        }

        let filter = TicketFilter {
            q: self.q.filter(|q| !q.is_empty()),
            status,
            currency,
            min_cost,
            max_cost,
            from,
            to,
        };
        let request = PageRequest::new(
            page.unwrap_or(0) as usize,
            size.map_or(limits.default_size, |s| s as usize),
            sort,
        );

        Ok((filter, request))
    }
}
