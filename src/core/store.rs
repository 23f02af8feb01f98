//! Persistence contract for support tickets

use crate::core::entity::{SupportTicket, TicketDraft};
use crate::core::error::TicketResult;
use crate::core::filter::TicketPredicate;
use crate::core::query::PageRequest;
use async_trait::async_trait;

/// Storage backend for tickets
///
/// Implementations own identity assignment and enforce that ticket numbers are
/// unique. A duplicate number is reported as `TicketError::Conflict`.
#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Persist a new ticket and assign its `id`
    async fn save(&self, draft: TicketDraft) -> TicketResult<SupportTicket>;

    /// Replace the editable fields of an existing ticket
    ///
    /// `ticket_number` and `created_at` of the stored record are kept.
    /// Fails with `TicketError::NotFound` when no ticket has `ticket.id`.
    async fn update(&self, ticket: SupportTicket) -> TicketResult<SupportTicket>;

    async fn find_by_id(&self, id: i64) -> TicketResult<Option<SupportTicket>>;

    async fn exists_by_id(&self, id: i64) -> TicketResult<bool>;

    /// Fails with `TicketError::NotFound` when nothing was deleted
    async fn delete_by_id(&self, id: i64) -> TicketResult<()>;

    /// Return one page of the tickets matching `predicate` and the total match count
    async fn find_page(
        &self,
        predicate: &TicketPredicate,
        page: &PageRequest,
    ) -> TicketResult<(Vec<SupportTicket>, u64)>;
}
