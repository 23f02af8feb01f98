//! ServerBuilder for fluent API to build HTTP servers

use super::handlers::AppState;
use super::router::{build_ticket_routes, health_routes};
use crate::config::{AppConfig, CorsConfig};
use crate::core::service::TicketService;
use crate::core::store::TicketStore;
use anyhow::{Context, Result};
use axum::Router;
use axum::http::{HeaderValue, Method, header};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// Builder for the ticket HTTP server
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_store(InMemoryTicketStore::new())
///     .with_config(AppConfig::load()?)
///     .build()?;
/// ```
pub struct ServerBuilder {
    store: Option<Arc<dyn TicketStore>>,
    config: AppConfig,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder with default configuration
    pub fn new() -> Self {
        Self {
            store: None,
            config: AppConfig::default(),
            custom_routes: Vec::new(),
        }
    }

    /// Set the ticket store (required)
    pub fn with_store(self, store: impl TicketStore + 'static) -> Self {
        self.with_shared_store(Arc::new(store))
    }

    /// Set a ticket store that is also held elsewhere
    pub fn with_shared_store(mut self, store: Arc<dyn TicketStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Add custom routes to the server
    ///
    /// They are merged next to the ticket and health routes and get the same
    /// CORS and tracing layers.
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Build the final router
    ///
    /// This generates:
    /// - Ticket CRUD routes
    /// - Health check routes
    /// - Custom routes
    pub fn build(mut self) -> Result<Router> {
        let store = self
            .store
            .take()
            .ok_or_else(|| anyhow::anyhow!("TicketStore is required. Call .with_store()"))?;

        let state = AppState {
            service: TicketService::new(store),
            pagination: self.config.pagination,
        };

        let mut app = health_routes().merge(build_ticket_routes(state));
        for custom_router in self.custom_routes {
            app = app.merge(custom_router);
        }

        let cors = cors_layer(&self.config.cors)?;
        Ok(app.layer(cors).layer(TraceLayer::new_for_http()))
    }

    /// Serve the application with graceful shutdown
    ///
    /// This will:
    /// - Bind to `server.host:server.port` from the configuration
    /// - Start serving requests
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    pub async fn serve(self) -> Result<()> {
        let addr = self.config.bind_address();
        let app = self.build()?;
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind {}", addr))?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// CORS policy restricted to the configured origins
///
/// With no origins configured, no cross-origin request is allowed.
pub fn cors_layer(config: &CorsConfig) -> Result<CorsLayer> {
    let origins = config
        .allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .with_context(|| format!("invalid CORS origin '{}'", origin))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION]))
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
