//! In-memory implementation of TicketStore for testing and development

use crate::core::entity::{SupportTicket, TicketDraft};
use crate::core::error::{StorageError, TicketError, TicketResult};
use crate::core::filter::TicketPredicate;
use crate::core::query::PageRequest;
use crate::core::store::TicketStore;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

const BACKEND: &str = "in_memory";

#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<i64, SupportTicket>,
    /// Unique index on ticket numbers
    numbers: HashMap<String, i64>,
    last_id: i64,
}

/// In-memory ticket store
///
/// Uses RwLock for thread-safe access. Ids start at 1 and are never reused.
#[derive(Clone, Default)]
pub struct InMemoryTicketStore {
    table: Arc<RwLock<Table>>,
}

impl InMemoryTicketStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> TicketResult<RwLockReadGuard<'_, Table>> {
        self.table.read().map_err(|e| {
            TicketError::from(StorageError::QueryError {
                backend: BACKEND.to_string(),
                message: format!("Failed to acquire read lock: {}", e),
            })
        })
    }

    fn write(&self) -> TicketResult<RwLockWriteGuard<'_, Table>> {
        self.table.write().map_err(|e| {
            TicketError::from(StorageError::QueryError {
                backend: BACKEND.to_string(),
                message: format!("Failed to acquire write lock: {}", e),
            })
        })
    }
}

#[async_trait]
impl TicketStore for InMemoryTicketStore {
    async fn save(&self, draft: TicketDraft) -> TicketResult<SupportTicket> {
        let mut table = self.write()?;

        if table.numbers.contains_key(&draft.ticket_number) {
            return Err(TicketError::Conflict {
                ticket_number: draft.ticket_number,
            });
        }

        table.last_id += 1;
        let ticket = draft.into_ticket(table.last_id);
        table
            .numbers
            .insert(ticket.ticket_number.clone(), ticket.id);
        table.rows.insert(ticket.id, ticket.clone());

        Ok(ticket)
    }

    async fn update(&self, ticket: SupportTicket) -> TicketResult<SupportTicket> {
        let mut table = self.write()?;

        let stored = table
            .rows
            .get_mut(&ticket.id)
            .ok_or(TicketError::NotFound { id: ticket.id })?;
        stored.apply(ticket.editable_fields());

        Ok(stored.clone())
    }

    async fn find_by_id(&self, id: i64) -> TicketResult<Option<SupportTicket>> {
        Ok(self.read()?.rows.get(&id).cloned())
    }

    async fn exists_by_id(&self, id: i64) -> TicketResult<bool> {
        Ok(self.read()?.rows.contains_key(&id))
    }

    async fn delete_by_id(&self, id: i64) -> TicketResult<()> {
        let mut table = self.write()?;

        let removed = table.rows.remove(&id).ok_or(TicketError::NotFound { id })?;
        table.numbers.remove(&removed.ticket_number);

        Ok(())
    }

    async fn find_page(
        &self,
        predicate: &TicketPredicate,
        page: &PageRequest,
    ) -> TicketResult<(Vec<SupportTicket>, u64)> {
        let table = self.read()?;

        let mut matching: Vec<&SupportTicket> = table
            .rows
            .values()
            .filter(|ticket| predicate.matches(ticket))
            .collect();
        matching.sort_by(|a, b| page.sort.compare(a, b));

        let total = matching.len() as u64;
        let data = matching
            .into_iter()
            .skip(page.offset())
            .take(page.size)
            .cloned()
            .collect();

        Ok((data, total))
    }
}
