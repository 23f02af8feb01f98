//! # Support Tickets
//!
//! A CRUD REST service for support tickets with filtered, paginated listing.
//!
//! ## Features
//!
//! - **Typed tickets**: closed enumerations for status, priority and currency,
//!   exact decimal costs
//! - **Creation defaults**: `OPEN` status, generated `ST-XXXXXXXX` ticket numbers,
//!   server-side `createdAt`
//! - **Search**: free text, status, currency, cost range and creation date range,
//!   combined conjunctively
//! - **Paging**: 0-based pages, bounded page size, sortable by any ticket field
//! - **Uniform errors**: every failure answers with the same JSON shape and a
//!   stable code
//! - **Pluggable storage**: in-memory by default, PostgreSQL behind the `postgres`
//!   feature
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tickets::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     ServerBuilder::new()
//!         .with_store(InMemoryTicketStore::new())
//!         .with_config(AppConfig::load()?)
//!         .serve()
//!         .await
//! }
//! ```

pub mod config;
pub mod core;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        entity::{Currency, NewTicket, Priority, SupportTicket, TicketStatus, TicketUpdate},
        error::{TicketError, TicketResult},
        filter::TicketFilter,
        query::{Page, PageRequest, Sort, SortDirection, SortField},
        service::TicketService,
        store::TicketStore,
    };

    // === Storage ===
    pub use crate::storage::InMemoryTicketStore;
    #[cfg(feature = "postgres")]
    pub use crate::storage::PostgresTicketStore;

    // === Config ===
    pub use crate::config::AppConfig;

    // === Server ===
    pub use crate::server::ServerBuilder;

    // === External dependencies ===
    pub use async_trait::async_trait;
    pub use chrono::{NaiveDate, NaiveDateTime};
    pub use rust_decimal::Decimal;
    pub use serde::{Deserialize, Serialize};
}
