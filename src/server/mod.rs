//! HTTP layer: handlers, parameter extraction, routes and the server builder

pub mod builder;
pub mod handlers;
pub mod params;
pub mod router;

pub use builder::ServerBuilder;
pub use handlers::AppState;
pub use router::{TICKETS_PATH, build_ticket_routes};
