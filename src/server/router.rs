//! Route table of the ticket API

use crate::server::handlers::{
    AppState, create_ticket, delete_ticket, get_ticket, list_tickets, update_ticket,
};
use axum::{Json, Router, routing::get};
use serde_json::{Value, json};

/// Base path of the ticket resource
pub const TICKETS_PATH: &str = "/api/v1/support-tickets";

/// Build ticket routes
///
/// - GET    /api/v1/support-tickets       - Filtered, paginated listing
/// - POST   /api/v1/support-tickets       - Create a ticket
/// - GET    /api/v1/support-tickets/{id}  - Fetch one ticket
/// - PUT    /api/v1/support-tickets/{id}  - Replace the editable fields
/// - DELETE /api/v1/support-tickets/{id}  - Delete a ticket
pub fn build_ticket_routes(state: AppState) -> Router {
    Router::new()
        .route(TICKETS_PATH, get(list_tickets).post(create_ticket))
        .route(
            &format!("{}/{{id}}", TICKETS_PATH),
            get(get_ticket).put(update_ticket).delete(delete_ticket),
        )
        .with_state(state)
}

/// Build health check routes
pub fn health_routes() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
}

/// Health check endpoint handler
async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "support-tickets"
    }))
}
