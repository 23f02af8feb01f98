//! PostgreSQL storage backend using sqlx.
//!
//! Provides [`PostgresTicketStore`], backed by a `support_tickets` table via
//! `sqlx::PgPool`.
//!
//! # Feature flag
//!
//! This module is gated behind the `postgres` feature flag:
//! ```toml
//! [dependencies]
//! support-tickets = { version = "0.1", features = ["postgres"] }
//! ```
//!
//! # Schema
//!
//! - `id BIGSERIAL` assigned by the database
//! - `ticket_number` carries a `UNIQUE` constraint; a violation maps to
//!   `TicketError::Conflict`
//! - enumerations are stored as their upper-case names
//! - `estimated_cost NUMERIC` keeps the exact decimal value

use crate::core::entity::{SupportTicket, TicketDraft};
use crate::core::error::{StorageError, TicketError, TicketResult};
use crate::core::filter::{Criterion, TicketPredicate};
use crate::core::query::PageRequest;
use crate::core::store::TicketStore;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

const BACKEND: &str = "postgres";

const COLUMNS: &str = "id, ticket_number, requester_name, status, priority, category, \
                       estimated_cost, currency, created_at, due_date";

// ---------------------------------------------------------------------------
// Schema management
// ---------------------------------------------------------------------------

/// Apply the required table and indexes (idempotent).
///
/// Safe to call on every startup.
pub async fn ensure_schema(pool: &PgPool) -> TicketResult<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS support_tickets (
            id BIGSERIAL PRIMARY KEY,
            ticket_number VARCHAR(64) NOT NULL UNIQUE,
            requester_name VARCHAR(255) NOT NULL,
            status VARCHAR(32) NOT NULL
                CHECK (status IN ('OPEN', 'IN_PROGRESS', 'RESOLVED', 'CLOSED')),
            priority VARCHAR(32) NOT NULL
                CHECK (priority IN ('LOW', 'MEDIUM', 'HIGH', 'CRITICAL')),
            category VARCHAR(255) NOT NULL,
            estimated_cost NUMERIC NOT NULL CHECK (estimated_cost >= 0),
            currency VARCHAR(8) NOT NULL CHECK (currency IN ('USD', 'EUR', 'PEN')),
            created_at TIMESTAMP NOT NULL,
            due_date DATE NOT NULL
        )",
    )
    .execute(pool)
    .await
    .map_err(|e| query_error("create support_tickets table", e))?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_support_tickets_created_at
            ON support_tickets (created_at)",
    )
    .execute(pool)
    .await
    .map_err(|e| query_error("create created_at index", e))?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

#[derive(Debug, FromRow)]
struct TicketRow {
    id: i64,
    ticket_number: String,
    requester_name: String,
    status: String,
    priority: String,
    category: String,
    estimated_cost: Decimal,
    currency: String,
    created_at: NaiveDateTime,
    due_date: NaiveDate,
}

impl TryFrom<TicketRow> for SupportTicket {
    type Error = TicketError;

    fn try_from(row: TicketRow) -> Result<Self, Self::Error> {
        let integrity = |message: String| {
            TicketError::from(StorageError::IntegrityError {
                message: format!("ticket {}: {}", row.id, message),
            })
        };

        Ok(SupportTicket {
            id: row.id,
            status: row.status.parse().map_err(integrity)?,
            priority: row.priority.parse().map_err(integrity)?,
            currency: row.currency.parse().map_err(integrity)?,
            ticket_number: row.ticket_number,
            requester_name: row.requester_name,
            category: row.category,
            estimated_cost: row.estimated_cost,
            created_at: row.created_at,
            due_date: row.due_date,
        })
    }
}

fn query_error(operation: &str, err: sqlx::Error) -> TicketError {
    TicketError::from(StorageError::QueryError {
        backend: BACKEND.to_string(),
        message: format!("Failed to {}: {}", operation, err),
    })
}

/// Render `predicate` as a `WHERE` clause with bound parameters
fn push_predicate(qb: &mut QueryBuilder<'_, Postgres>, predicate: &TicketPredicate) {
    for (i, criterion) in predicate.criteria().iter().enumerate() {
        qb.push(if i == 0 { " WHERE " } else { " AND " });
        match criterion {
            Criterion::Text(needle) => {
                let pattern = like_pattern(needle);
                qb.push("(LOWER(ticket_number) LIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR LOWER(requester_name) LIKE ")
                    .push_bind(pattern)
                    .push(")");
            }
            Criterion::Status(status) => {
                qb.push("status = ").push_bind(status.as_str());
            }
            Criterion::Currency(currency) => {
                qb.push("currency = ").push_bind(currency.as_str());
            }
            Criterion::MinCost(min) => {
                qb.push("estimated_cost >= ").push_bind(*min);
            }
            Criterion::MaxCost(max) => {
                qb.push("estimated_cost <= ").push_bind(*max);
            }
            Criterion::CreatedBetween(from, to) => {
                qb.push("created_at BETWEEN ")
                    .push_bind(*from)
                    .push(" AND ")
                    .push_bind(*to);
            }
            Criterion::CreatedFrom(from) => {
                qb.push("created_at >= ").push_bind(*from);
            }
            Criterion::CreatedUntil(to) => {
                qb.push("created_at <= ").push_bind(*to);
            }
        }
    }
}

/// `%needle%` with LIKE wildcards in the needle escaped
fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

// ---------------------------------------------------------------------------
// PostgresTicketStore
// ---------------------------------------------------------------------------

/// Ticket store backed by PostgreSQL.
#[derive(Clone, Debug)]
pub struct PostgresTicketStore {
    pool: PgPool,
}

impl PostgresTicketStore {
    /// Create a new `PostgresTicketStore` with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool on `database_url` and make sure the schema exists
    pub async fn connect(database_url: &str, max_connections: u32) -> TicketResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| {
                TicketError::from(StorageError::ConnectionError {
                    backend: BACKEND.to_string(),
                    message: e.to_string(),
                })
            })?;

        ensure_schema(&pool).await?;
        tracing::info!(max_connections, "connected to postgres ticket store");
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl TicketStore for PostgresTicketStore {
    async fn save(&self, draft: TicketDraft) -> TicketResult<SupportTicket> {
        let sql = format!(
            "INSERT INTO support_tickets
                (ticket_number, requester_name, status, priority, category,
                 estimated_cost, currency, created_at, due_date)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {}",
            COLUMNS
        );

        let row = sqlx::query_as::<_, TicketRow>(&sql)
            .bind(&draft.ticket_number)
            .bind(&draft.requester_name)
            .bind(draft.status.as_str())
            .bind(draft.priority.as_str())
            .bind(&draft.category)
            .bind(draft.estimated_cost)
            .bind(draft.currency.as_str())
            .bind(draft.created_at)
            .bind(draft.due_date)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        return TicketError::Conflict {
                            ticket_number: draft.ticket_number.clone(),
                        };
                    }
                }
                query_error("insert ticket", e)
            })?;

        row.try_into()
    }

    async fn update(&self, ticket: SupportTicket) -> TicketResult<SupportTicket> {
        let sql = format!(
            "UPDATE support_tickets
             SET requester_name = $1, status = $2, priority = $3, category = $4,
                 estimated_cost = $5, currency = $6, due_date = $7
             WHERE id = $8
             RETURNING {}",
            COLUMNS
        );

        let row = sqlx::query_as::<_, TicketRow>(&sql)
            .bind(&ticket.requester_name)
            .bind(ticket.status.as_str())
            .bind(ticket.priority.as_str())
            .bind(&ticket.category)
            .bind(ticket.estimated_cost)
            .bind(ticket.currency.as_str())
            .bind(ticket.due_date)
            .bind(ticket.id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_error("update ticket", e))?
            .ok_or(TicketError::NotFound { id: ticket.id })?;

        row.try_into()
    }

    async fn find_by_id(&self, id: i64) -> TicketResult<Option<SupportTicket>> {
        let sql = format!("SELECT {} FROM support_tickets WHERE id = $1", COLUMNS);

        sqlx::query_as::<_, TicketRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_error("fetch ticket", e))?
            .map(SupportTicket::try_from)
            .transpose()
    }

    async fn exists_by_id(&self, id: i64) -> TicketResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM support_tickets WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| query_error("check ticket existence", e))
    }

    async fn delete_by_id(&self, id: i64) -> TicketResult<()> {
        let result = sqlx::query("DELETE FROM support_tickets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| query_error("delete ticket", e))?;

        if result.rows_affected() == 0 {
            return Err(TicketError::NotFound { id });
        }
        Ok(())
    }

    async fn find_page(
        &self,
        predicate: &TicketPredicate,
        page: &PageRequest,
    ) -> TicketResult<(Vec<SupportTicket>, u64)> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM support_tickets");
        push_predicate(&mut count, predicate);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| query_error("count tickets", e))?;
        let total = total.max(0) as u64;

        // An offset beyond BIGINT cannot reach any row
        let Ok(offset) = i64::try_from(page.offset()) else {
            return Ok((Vec::new(), total));
        };
        let limit = i64::try_from(page.size).unwrap_or(i64::MAX);

        let mut select = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM support_tickets",
            COLUMNS
        ));
        push_predicate(&mut select, predicate);
        select
            .push(" ORDER BY ")
            .push(page.sort.field.column())
            .push(" ")
            .push(page.sort.direction.as_sql())
            .push(", id ASC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = select
            .build_query_as::<TicketRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| query_error("list tickets", e))?;

        let tickets = rows
            .into_iter()
            .map(SupportTicket::try_from)
            .collect::<TicketResult<Vec<_>>>()?;

        Ok((tickets, total))
    }
}
