//! Quire API Server
//!
//! Main entry point for the journal-entry batch service.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quire_api::{AppState, Engine, create_router};
use quire_core::import::ImportOptions;
use quire_core::{Actor, EngineSettings, JournalEngine};
use quire_shared::AppConfig;
use quire_shared::types::UserId;
use quire_store::InMemoryEntryStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    // Initialize tracing
    let json = config.log.json;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quire=debug,tower_http=debug".into()),
        )
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .init();

    let settings = EngineSettings::from_config(&config.engine, &config.import)
        .context("Invalid engine configuration")?;
    info!(
        concurrency = settings.batch.concurrency,
        approval_mode = ?config.engine.approval_mode,
        reversal_date = ?config.engine.reversal_date,
        "Engine configured"
    );

    let engine = JournalEngine::new(Arc::new(InMemoryEntryStore::new()), settings);
    let shutdown = CancellationToken::new();

    if let Some(path) = &config.import.seed_path {
        seed(&engine, path, &shutdown).await?;
    }

    let state = AppState::new(engine, shutdown.clone(), config.server.body_limit_bytes);
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    Ok(())
}

/// Imports the seed CSV as a system actor holding every capability.
async fn seed(engine: &Engine, path: &str, cancel: &CancellationToken) -> anyhow::Result<()> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read seed file {path}"))?;

    let system = Actor::with_all_capabilities(UserId::new());
    let result = engine
        .import(&system, &text, &ImportOptions::default(), cancel)
        .await
        .with_context(|| format!("Failed to import seed file {path}"))?;

    for failure in &result.errors {
        warn!(item = %failure.item, code = failure.code, message = %failure.message, "Seed row rejected");
    }
    info!(
        path,
        created = result.summary.successful,
        rejected = result.summary.failed,
        "Seed import finished"
    );
    Ok(())
}

/// Resolves on Ctrl+C and cancels in-flight batches, imports and exports.
async fn shutdown_signal(token: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
    token.cancel();
}
