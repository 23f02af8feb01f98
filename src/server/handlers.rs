//! HTTP handlers for support ticket operations

use axum::{Json, extract::State, http::StatusCode};

use crate::config::PaginationConfig;
use crate::core::entity::{NewTicket, SupportTicket, TicketUpdate};
use crate::core::error::TicketResult;
use crate::core::query::Page;
use crate::core::service::TicketService;
use crate::core::validation::Validated;
use crate::server::params::{ListParams, TicketId};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: TicketService,
    pub pagination: PaginationConfig,
}

/// POST /api/v1/support-tickets
pub async fn create_ticket(
    State(state): State<AppState>,
    Validated(payload): Validated<NewTicket>,
) -> TicketResult<(StatusCode, Json<SupportTicket>)> {
    let ticket = state.service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(ticket)))
}

/// GET /api/v1/support-tickets
pub async fn list_tickets(
    State(state): State<AppState>,
    params: ListParams,
) -> TicketResult<Json<Page<SupportTicket>>> {
    let (filter, page) = params.into_query(&state.pagination)?;
    let result = state.service.list(&filter, &page).await?;
    Ok(Json(result))
}

/// GET /api/v1/support-tickets/{id}
pub async fn get_ticket(
    State(state): State<AppState>,
    TicketId(id): TicketId,
) -> TicketResult<Json<SupportTicket>> {
    Ok(Json(state.service.get_by_id(id).await?))
}

/// PUT /api/v1/support-tickets/{id}
pub async fn update_ticket(
    State(state): State<AppState>,
    TicketId(id): TicketId,
    Validated(payload): Validated<TicketUpdate>,
) -> TicketResult<Json<SupportTicket>> {
    Ok(Json(state.service.update(id, payload).await?))
}

/// DELETE /api/v1/support-tickets/{id}
pub async fn delete_ticket(
    State(state): State<AppState>,
    TicketId(id): TicketId,
) -> TicketResult<StatusCode> {
    state.service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
