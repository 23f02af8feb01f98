//! Core module containing the ticket model, its rules and the storage contract

pub mod entity;
pub mod error;
pub mod filter;
pub mod query;
pub mod service;
pub mod store;
pub mod validation;

pub use entity::{Currency, NewTicket, Priority, SupportTicket, TicketDraft, TicketStatus, TicketUpdate};
pub use error::{StorageError, TicketError, TicketResult};
pub use filter::{Criterion, TicketFilter, TicketPredicate};
pub use query::{Page, PageRequest, PaginationMeta, Sort, SortDirection, SortField};
pub use service::TicketService;
pub use store::TicketStore;
