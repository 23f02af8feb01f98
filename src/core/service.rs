//! Ticket operations on top of a [`TicketStore`]

use crate::core::entity::{NewTicket, SupportTicket, TicketUpdate, creation_timestamp};
use crate::core::error::{TicketError, TicketResult};
use crate::core::filter::TicketFilter;
use crate::core::query::{Page, PageRequest};
use crate::core::store::TicketStore;
use std::sync::Arc;

/// Application service for support tickets
///
/// The storage mechanism is chosen by the caller; the service owns validation,
/// defaults and the not-found rules.
#[derive(Clone)]
pub struct TicketService {
    store: Arc<dyn TicketStore>,
}

impl TicketService {
    pub fn new(store: Arc<dyn TicketStore>) -> Self {
        Self { store }
    }

    pub fn from_store(store: impl TicketStore + 'static) -> Self {
        Self::new(Arc::new(store))
    }

    /// Validate, apply creation defaults and persist a new ticket
    pub async fn create(&self, ticket: NewTicket) -> TicketResult<SupportTicket> {
        let draft = ticket.into_draft(creation_timestamp())?;
        let saved = self.store.save(draft).await?;
        tracing::info!(
            id = saved.id,
            ticket_number = %saved.ticket_number,
            "support ticket created"
        );
        Ok(saved)
    }

    /// Return one page of the tickets matching `filter`
    pub async fn list(
        &self,
        filter: &TicketFilter,
        page: &PageRequest,
    ) -> TicketResult<Page<SupportTicket>> {
        if filter.has_inverted_range() {
            return Err(TicketError::business(
                "from date cannot be after to date",
            ));
        }

        let predicate = filter.to_predicate();
        tracing::debug!(
            criteria = predicate.criteria().len(),
            page = page.page,
            size = page.size,
            sort = %page.sort,
            "listing support tickets"
        );

        let (data, total) = self.store.find_page(&predicate, page).await?;
        Ok(Page::new(data, page, total))
    }

    pub async fn get_by_id(&self, id: i64) -> TicketResult<SupportTicket> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(TicketError::NotFound { id })
    }

    /// Replace every editable field of ticket `id`
    pub async fn update(&self, id: i64, changes: TicketUpdate) -> TicketResult<SupportTicket> {
        let fields = changes.into_fields()?;
        let mut ticket = self.get_by_id(id).await?;
        ticket.apply(fields);

        let updated = self.store.update(ticket).await?;
        tracing::info!(id, "support ticket updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> TicketResult<()> {
        if !self.store.exists_by_id(id).await? {
            return Err(TicketError::NotFound { id });
        }
        self.store.delete_by_id(id).await?;
        tracing::info!(id, "support ticket deleted");
        Ok(())
    }
}
