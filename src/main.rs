//! Support ticket service binary
//!
//! Reads configuration (see [`tickets::config`]), opens the configured store and
//! serves the REST API until SIGINT or SIGTERM.

use anyhow::{Context, Result};
use std::sync::Arc;
use tickets::config::{AppConfig, StorageBackend};
use tickets::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .context("invalid log level")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let store = open_store(&config).await?;

    tracing::info!(
        backend = ?config.storage.backend,
        address = %config.bind_address(),
        "starting support-tickets v{}",
        env!("CARGO_PKG_VERSION")
    );

    ServerBuilder::new()
        .with_shared_store(store)
        .with_config(config)
        .serve()
        .await
}

async fn open_store(config: &AppConfig) -> Result<Arc<dyn TicketStore>> {
    match config.storage.backend {
        StorageBackend::InMemory => Ok(Arc::new(InMemoryTicketStore::new())),
        #[cfg(feature = "postgres")]
        StorageBackend::Postgres => {
            let url = config
                .storage
                .database_url
                .as_deref()
                .context("storage.database_url is required for the postgres backend")?;
            let store =
                tickets::storage::PostgresTicketStore::connect(url, config.storage.max_connections)
                    .await?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "postgres"))]
        StorageBackend::Postgres => {
            anyhow::bail!("the postgres backend requires building with --features postgres")
        }
    }
}
