//! Caller identity extractor.
//!
//! Authentication and role resolution happen at the gateway, which forwards
//! the caller's id and pre-computed capabilities as request headers.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{HeaderMap, StatusCode, request::Parts},
};
use serde_json::json;

use quire_core::{Actor, Capability};
use quire_shared::types::UserId;

/// Header carrying the caller's UUID.
pub const ACTOR_ID_HEADER: &str = "x-actor-id";

/// Header carrying the caller's comma-separated capabilities.
pub const CAPABILITIES_HEADER: &str = "x-capabilities";

/// Extractor for the calling actor.
///
/// ```ignore
/// async fn handler(CallerActor(actor): CallerActor) -> impl IntoResponse {
///     actor.can(Capability::Post);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CallerActor(pub Actor);

fn rejection(error: &str, message: String) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": error, "message": message })),
    )
}

/// Reads the actor from request headers.
///
/// Unknown capability names are ignored so gateways can forward capabilities
/// of other services unchanged.
pub fn actor_from_headers(headers: &HeaderMap) -> Result<Actor, (&'static str, String)> {
    let raw_id = headers
        .get(ACTOR_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            (
                "MISSING_ACTOR",
                format!("{ACTOR_ID_HEADER} header is required"),
            )
        })?;
    let id: UserId = raw_id.trim().parse().map_err(|_| {
        (
            "INVALID_ACTOR",
            format!("{ACTOR_ID_HEADER} must be a UUID, got '{raw_id}'"),
        )
    })?;

    let capabilities = headers
        .get(CAPABILITIES_HEADER)
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default()
        .split(',')
        .filter_map(Capability::parse);

    Ok(Actor::new(id, capabilities))
}

impl<S> FromRequestParts<S> for CallerActor
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        actor_from_headers(&parts.headers)
            .map(CallerActor)
            .map_err(|(error, message)| rejection(error, message))
    }
}
