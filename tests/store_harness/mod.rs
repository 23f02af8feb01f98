//! Shared test harness for ticket store testing
//!
//! Provides draft and payload builders plus the `ticket_store_tests!` macro that
//! checks any `TicketStore` implementation against the store contract.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod store_harness;
//! use store_harness::*;
//! ```

#![allow(dead_code)]

pub mod ticket_store_tests;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use tickets::core::entity::{Currency, NewTicket, Priority, TicketDraft, TicketStatus};

/// 2025-01-`day` at `hour`:00:00
pub fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, day)
        .unwrap()
        .and_hms_micro_opt(hour, 0, 0, 123_456)
        .unwrap()
}

pub fn due(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 2, day).unwrap()
}

/// A draft with sensible defaults; override fields with struct update syntax
pub fn draft(number: &str, requester: &str, cost: Decimal, created_at: NaiveDateTime) -> TicketDraft {
    TicketDraft {
        ticket_number: number.to_string(),
        requester_name: requester.to_string(),
        status: TicketStatus::Open,
        priority: Priority::Medium,
        category: "Billing".to_string(),
        estimated_cost: cost,
        currency: Currency::Usd,
        created_at,
        due_date: due(1),
    }
}

/// A valid create payload
pub fn new_ticket(requester: &str, cost: Decimal, currency: Currency) -> NewTicket {
    NewTicket {
        ticket_number: None,
        requester_name: Some(requester.to_string()),
        status: None,
        priority: Some(Priority::High),
        category: Some("Billing".to_string()),
        estimated_cost: Some(cost),
        currency: Some(currency),
        due_date: Some(due(10)),
    }
}
