mod error;
mod handlers;
mod routes;
mod state;

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;

use paperdesk_core::config::ServerConfig;
use paperdesk_db::DocumentRepository;
use paperdesk_services::{HttpExtractionClient, MemoryStatusStore};
use paperdesk_worker::{BatchCoordinator, ExtractionProcessor};

use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "paperdesk=info,tower_http=info".into()),
        )
        .init();

    let config = ServerConfig::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await?;

    let repository = Arc::new(DocumentRepository::new(pool.clone()));
    let extractor = Arc::new(HttpExtractionClient::new(&config.ingest)?);
    let status_store = Arc::new(MemoryStatusStore::new());

    let coordinator = BatchCoordinator::new(
        repository.clone(),
        extractor.clone(),
        status_store.clone(),
        config.ingest.clone(),
    );
    let processor = Arc::new(ExtractionProcessor::new(
        extractor,
        config.ingest.extraction_workers,
        config.ingest.extraction_queue_capacity,
    ));

    let state = Arc::new(AppState {
        coordinator,
        processor: processor.clone(),
        status_store,
        reader: repository,
        config: config.ingest.clone(),
    });

    let router = routes::build_router(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(addr = %addr, "Paperdesk API listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Drain the extraction pool after the HTTP server stops accepting work.
    processor.shutdown().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install shutdown signal handler");
    }
}
