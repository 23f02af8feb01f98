//! The support ticket entity and the payloads that create and replace it
//!
//! A ticket moves through three shapes:
//!
//! - [`NewTicket`]: what a caller submits on create (status and ticket number optional)
//! - [`TicketDraft`]: the fully defaulted record, built once by [`NewTicket::into_draft`]
//!   before the first persist call
//! - [`SupportTicket`]: the persisted record, with the `id` assigned by the store
//!
//! Updates go through [`TicketUpdate`], a full replacement of the editable fields.

use crate::core::error::{TicketError, TicketResult};
use crate::core::validation::{self, non_negative, not_blank};
use chrono::{NaiveDate, NaiveDateTime, SubsecRound, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Prefix of every generated ticket number
pub const TICKET_NUMBER_PREFIX: &str = "ST-";

/// Number of hex characters taken from the random identifier
const TICKET_NUMBER_HEX_LEN: usize = 8;

/// Declares a closed enumeration stored and transported by its upper-case name.
///
/// Generates `as_str`, `ALL`, `Display`, `FromStr` and the serde derives, so the
/// same spelling is used in JSON bodies, query parameters and database columns.
macro_rules! ticket_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            /// Every member, in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The wire and column spelling of this member
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }

            /// Comma-separated list of accepted spellings, for error messages
            pub fn expected() -> String {
                Self::ALL
                    .iter()
                    .map(|v| v.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!(
                        "'{}' is not one of {}",
                        other,
                        $name::expected()
                    )),
                }
            }
        }
    };
}

ticket_enum! {
    /// Lifecycle state of a ticket
    #[derive(Default)]
    TicketStatus {
        #[default]
        Open => "OPEN",
        InProgress => "IN_PROGRESS",
        Resolved => "RESOLVED",
        Closed => "CLOSED",
    }
}

ticket_enum! {
    /// How urgently a ticket must be handled
    Priority {
        Low => "LOW",
        Medium => "MEDIUM",
        High => "HIGH",
        Critical => "CRITICAL",
    }
}

ticket_enum! {
    /// Supported currencies for the estimated cost
    Currency {
        Usd => "USD",
        Eur => "EUR",
        Pen => "PEN",
    }
}

/// A persisted support ticket
///
/// `id`, `ticket_number` and `created_at` are write-once: nothing after the initial
/// insert changes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportTicket {
    pub id: i64,
    pub ticket_number: String,
    pub requester_name: String,
    pub status: TicketStatus,
    pub priority: Priority,
    pub category: String,
    pub estimated_cost: Decimal,
    pub currency: Currency,
    pub created_at: NaiveDateTime,
    pub due_date: NaiveDate,
}

impl SupportTicket {
    /// Overwrite every editable field with the values of `update`
    ///
    /// `id`, `ticket_number` and `created_at` are left as they are.
    pub fn apply(&mut self, update: EditableFields) {
        self.requester_name = update.requester_name;
        self.status = update.status;
        self.priority = update.priority;
        self.category = update.category;
        self.estimated_cost = update.estimated_cost;
        self.currency = update.currency;
        self.due_date = update.due_date;
    }

    /// The editable part of this ticket
    pub fn editable_fields(&self) -> EditableFields {
        EditableFields {
            requester_name: self.requester_name.clone(),
            status: self.status,
            priority: self.priority,
            category: self.category.clone(),
            estimated_cost: self.estimated_cost,
            currency: self.currency,
            due_date: self.due_date,
        }
    }
}

/// The fields an update replaces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditableFields {
    pub requester_name: String,
    pub status: TicketStatus,
    pub priority: Priority,
    pub category: String,
    pub estimated_cost: Decimal,
    pub currency: Currency,
    pub due_date: NaiveDate,
}

/// A fully defaulted ticket that has not been stored yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketDraft {
    pub ticket_number: String,
    pub requester_name: String,
    pub status: TicketStatus,
    pub priority: Priority,
    pub category: String,
    pub estimated_cost: Decimal,
    pub currency: Currency,
    pub created_at: NaiveDateTime,
    pub due_date: NaiveDate,
}

impl TicketDraft {
    /// Attach the identity assigned by the store
    pub fn into_ticket(self, id: i64) -> SupportTicket {
        SupportTicket {
            id,
            ticket_number: self.ticket_number,
            requester_name: self.requester_name,
            status: self.status,
            priority: self.priority,
            category: self.category,
            estimated_cost: self.estimated_cost,
            currency: self.currency,
            created_at: self.created_at,
            due_date: self.due_date,
        }
    }
}

/// Create payload
///
/// Every field is optional at the serde level so that missing values are reported
/// per field by validation instead of failing the whole body.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewTicket {
    /// Generated when absent or blank
    #[validate(length(max = 64, message = "ticket number must be at most 64 characters"))]
    pub ticket_number: Option<String>,

    #[validate(
        required(message = "requester name is required"),
        custom(function = "not_blank", message = "requester name is required"),
        length(max = 255, message = "requester name must be at most 255 characters")
    )]
    pub requester_name: Option<String>,

    /// Defaults to `OPEN`
    pub status: Option<TicketStatus>,

    #[validate(required(message = "priority is required"))]
    pub priority: Option<Priority>,

    #[validate(
        required(message = "category is required"),
        custom(function = "not_blank", message = "category is required"),
        length(max = 255, message = "category must be at most 255 characters")
    )]
    pub category: Option<String>,

    #[validate(
        required(message = "estimated cost is required"),
        custom(function = "non_negative", message = "estimated cost cannot be negative")
    )]
    pub estimated_cost: Option<Decimal>,

    #[validate(required(message = "currency is required"))]
    pub currency: Option<Currency>,

    #[validate(required(message = "due date is required"))]
    pub due_date: Option<NaiveDate>,
}

impl NewTicket {
    /// Validate the payload and apply the creation defaults
    ///
    /// This is the single place where `created_at`, the default status and the
    /// generated ticket number are assigned.
    pub fn into_draft(self, now: NaiveDateTime) -> TicketResult<TicketDraft> {
        validation::validate(&self)?;

        let (
            Some(requester_name),
            Some(priority),
            Some(category),
            Some(estimated_cost),
            Some(currency),
            Some(due_date),
        ) = (
            self.requester_name,
            self.priority,
            self.category,
            self.estimated_cost,
            self.currency,
            self.due_date,
        )
        else {
            return Err(TicketError::field("ticket", "required fields are missing"));
        };

        let ticket_number = self
            .ticket_number
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(generate_ticket_number);

        Ok(TicketDraft {
            ticket_number,
            requester_name,
            status: self.status.unwrap_or_default(),
            priority,
            category,
            estimated_cost,
            currency,
            created_at: now.trunc_subsecs(6),
            due_date,
        })
    }
}

/// Update payload: a full replacement of the editable fields
///
/// Bodies may carry `id`, `ticketNumber` or `createdAt` (for instance when a client
/// sends back a ticket it fetched); those keys are ignored.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TicketUpdate {
    #[validate(
        required(message = "requester name is required"),
        custom(function = "not_blank", message = "requester name is required"),
        length(max = 255, message = "requester name must be at most 255 characters")
    )]
    pub requester_name: Option<String>,

    #[validate(required(message = "status is required"))]
    pub status: Option<TicketStatus>,

    #[validate(required(message = "priority is required"))]
    pub priority: Option<Priority>,

    #[validate(
        required(message = "category is required"),
        custom(function = "not_blank", message = "category is required"),
        length(max = 255, message = "category must be at most 255 characters")
    )]
    pub category: Option<String>,

    #[validate(
        required(message = "estimated cost is required"),
        custom(function = "non_negative", message = "estimated cost cannot be negative")
    )]
    pub estimated_cost: Option<Decimal>,

    #[validate(required(message = "currency is required"))]
    pub currency: Option<Currency>,

    #[validate(required(message = "due date is required"))]
    pub due_date: Option<NaiveDate>,
}

impl TicketUpdate {
    /// Validate the payload and extract the replacement values
    pub fn into_fields(self) -> TicketResult<EditableFields> {
        validation::validate(&self)?;

        let (
            Some(requester_name),
            Some(status),
            Some(priority),
            Some(category),
            Some(estimated_cost),
            Some(currency),
            Some(due_date),
        ) = (
            self.requester_name,
            self.status,
            self.priority,
            self.category,
            self.estimated_cost,
            self.currency,
            self.due_date,
        )
        else {
            return Err(TicketError::field("ticket", "required fields are missing"));
        };

        Ok(EditableFields {
            requester_name,
            status,
            priority,
            category,
            estimated_cost,
            currency,
            due_date,
        })
    }
}

impl From<EditableFields> for TicketUpdate {
    fn from(fields: EditableFields) -> Self {
        Self {
            requester_name: Some(fields.requester_name),
            status: Some(fields.status),
            priority: Some(fields.priority),
            category: Some(fields.category),
            estimated_cost: Some(fields.estimated_cost),
            currency: Some(fields.currency),
            due_date: Some(fields.due_date),
        }
    }
}

/// Generate a ticket number: `ST-` followed by 8 upper-case hex characters of a v4 UUID
pub fn generate_ticket_number() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!(
        "{}{}",
        TICKET_NUMBER_PREFIX,
        hex[..TICKET_NUMBER_HEX_LEN].to_uppercase()
    )
}

/// Current wall-clock time used for `created_at`, truncated to microseconds
pub fn creation_timestamp() -> NaiveDateTime {
    Utc::now().naive_utc().trunc_subsecs(6)
}
