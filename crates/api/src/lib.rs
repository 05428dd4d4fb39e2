//! HTTP API layer with Axum routes and extractors.
//!
//! This crate provides:
//! - REST routes over the batch, import and export entry points
//! - The caller identity extractor
//! - Mapping of engine errors to JSON responses

pub mod error;
pub mod middleware;
pub mod routes;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use quire_core::JournalEngine;
use quire_store::InMemoryEntryStore;

/// The engine type served over HTTP.
pub type Engine = JournalEngine<InMemoryEntryStore>;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Journal engine over the entry store.
    pub engine: Arc<Engine>,
    /// Cancelled on shutdown; every long-running operation gets a child token.
    pub shutdown: CancellationToken,
    /// Maximum accepted request body in bytes.
    pub body_limit: usize,
}

impl AppState {
    /// Creates state around an engine.
    pub fn new(engine: Engine, shutdown: CancellationToken, body_limit: usize) -> Self {
        Self {
            engine: Arc::new(engine),
            shutdown,
            body_limit,
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(DefaultBodyLimit::max(state.body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
