//! API route definitions.

use axum::Router;

use crate::AppState;

pub mod batch;
pub mod export;
pub mod health;
pub mod import;

/// Creates the API router with all routes.
///
/// Every route except health reads the caller from the actor headers.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(batch::routes())
        .merge(import::routes())
        .merge(export::routes())
}
