//! Batch lifecycle routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use quire_core::batch::BatchRequest;
use quire_core::journal::{EntryKind, JournalEntry};
use quire_core::report::OperationResult;
use quire_core::store::EntryFilter;
use quire_core::workflow::BatchOperation;
use quire_shared::AppError;
use quire_shared::types::EntryId;

use crate::{AppState, error::ApiError, middleware::CallerActor};

/// Creates the batch routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/journal-entries/batch/{operation}", post(run_batch))
        .route("/journal-entries/eligible", get(list_eligible))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for a batch operation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchBody {
    /// Selected entries, processed in this order.
    pub entry_ids: Vec<EntryId>,
    /// Approver comments (approve).
    #[serde(default)]
    pub comments: Option<String>,
    /// Reversal reason (reverse).
    #[serde(default)]
    pub reason: Option<String>,
}

/// Query parameters for listing eligible entries.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibleQuery {
    /// The operation to select for.
    pub operation: String,
    /// Earliest accounting date (inclusive).
    pub date_from: Option<NaiveDate>,
    /// Latest accounting date (inclusive).
    pub date_to: Option<NaiveDate>,
    /// Required entry kind.
    pub entry_type: Option<EntryKind>,
}

/// Response for the eligible listing.
#[derive(Debug, Serialize)]
pub struct EligibleResponse {
    /// The operation selected for.
    pub operation: BatchOperation,
    /// Matching entries ordered by date, reference and id.
    pub entries: Vec<JournalEntry>,
}

fn parse_operation(raw: &str) -> Result<BatchOperation, ApiError> {
    BatchOperation::parse(raw).ok_or_else(|| {
        AppError::NotFound(format!(
            "Unknown batch operation '{raw}' (expected submit, approve, post or reverse)"
        ))
        .into()
    })
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/journal-entries/batch/{operation}` - Run a batch over selected entries.
async fn run_batch(
    State(state): State<AppState>,
    CallerActor(actor): CallerActor,
    Path(operation): Path<String>,
    Json(body): Json<BatchBody>,
) -> Result<Json<OperationResult>, ApiError> {
    let operation = parse_operation(&operation)?;
    let request = BatchRequest {
        operation,
        entry_ids: body.entry_ids,
        comments: body.comments,
        reason: body.reason,
    };

    let cancel = state.shutdown.child_token();
    let result = state.engine.run_batch(&actor, request, &cancel).await?;

    info!(
        actor = %actor.id,
        operation = %operation,
        successful = result.summary.successful,
        failed = result.summary.failed,
        "Batch request served"
    );
    Ok(Json(result))
}

/// GET `/journal-entries/eligible` - Entries an operation may act on.
async fn list_eligible(
    State(state): State<AppState>,
    CallerActor(actor): CallerActor,
    Query(query): Query<EligibleQuery>,
) -> Result<Json<EligibleResponse>, ApiError> {
    let operation = parse_operation(&query.operation)?;
    let capability = operation.required_capability();
    if !actor.can(capability) {
        return Err(AppError::Forbidden(format!(
            "Capability '{capability}' is required to {operation} entries"
        ))
        .into());
    }
    if let (Some(from), Some(to)) = (query.date_from, query.date_to)
        && from > to
    {
        return Err(AppError::Validation(format!("dateFrom {from} is after dateTo {to}")).into());
    }

    let filter = EntryFilter {
        date_from: query.date_from,
        date_to: query.date_to,
        status: None,
        kind: query.entry_type,
    };
    let entries = state.engine.eligible(operation, &filter).await?;

    Ok(Json(EligibleResponse { operation, entries }))
}
