//! CSV import route.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::post,
};
use tracing::info;

use quire_core::import::ImportOptions;
use quire_core::report::OperationResult;

use crate::{AppState, error::ApiError, middleware::CallerActor};

/// Creates the import routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/journal-entries/import", post(import_entries))
}

/// POST `/journal-entries/import` - Import CSV text sent as the request body.
///
/// Options arrive as query parameters, e.g. `?createAsDraft=false&dateFormat=%25d/%25m/%25Y`.
async fn import_entries(
    State(state): State<AppState>,
    CallerActor(actor): CallerActor,
    Query(options): Query<ImportOptions>,
    body: String,
) -> Result<Json<OperationResult>, ApiError> {
    let cancel = state.shutdown.child_token();
    let result = state
        .engine
        .import(&actor, &body, &options, &cancel)
        .await?;

    info!(
        actor = %actor.id,
        bytes = body.len(),
        successful = result.summary.successful,
        failed = result.summary.failed,
        "Import request served"
    );
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::StatusCode};

    use quire_core::journal::EntryStatus;
    use quire_core::store::{EntryFilter, EntryStore};

    use crate::testing::{json, request, send, state};

    const MIXED: &str = "\
date,reference,memo,account_code,debit,credit,department,project
2024-01-15,JE-1,Office rent,6100,1500.00,,,
2024-01-15,JE-1,Office rent,1000,,1500.00,,
2024-01-16,JE-2,Supplies,6200,abc,,,
2024-01-16,JE-2,Supplies,1000,,40.00,,
";

    #[tokio::test]
    async fn test_import_reports_per_group() {
        let state = state();
        let response = send(
            &state,
            request("POST", "/api/v1/journal-entries/import", "import")
                .header("Content-Type", "text/csv")
                .body(Body::from(MIXED))
                .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let result = json(response).await;
        assert_eq!(result["summary"]["total"], 2);
        assert_eq!(result["summary"]["successful"], 1);
        assert_eq!(result["errors"][0]["reference"], "JE-2");
        assert_eq!(result["errors"][0]["code"], "INVALID_AMOUNT");
        assert_eq!(result["successes"][0]["reference"], "JE-1");
        assert_eq!(state.engine.store().len(), 1);
    }

    #[tokio::test]
    async fn test_import_options_from_query() {
        let state = state();
        let csv = "15/01/2024,JE-9,,6100,10.00,\n15/01/2024,JE-9,,1000,,10.00\n";
        let response = send(
            &state,
            request(
                "POST",
                "/api/v1/journal-entries/import?skipHeaderRow=false&createAsDraft=false&dateFormat=%25d%2F%25m%2F%25Y",
                "import",
            )
            .body(Body::from(csv))
            .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json(response).await["summary"]["successful"], 1);

        let entries = state
            .engine
            .store()
            .query(&EntryFilter::default())
            .await
            .unwrap();
        assert_eq!(entries[0].status, EntryStatus::PendingApproval);
        assert_eq!(entries[0].reference, "JE-9");
    }

    #[tokio::test]
    async fn test_missing_columns_is_400() {
        let state = state();
        let response = send(
            &state,
            request("POST", "/api/v1/journal-entries/import", "import")
                .body(Body::from("date,reference,memo\n2024-01-15,JE-1,rent\n"))
                .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json(response).await["error"], "MISSING_COLUMNS");
    }

    #[tokio::test]
    async fn test_import_needs_capability() {
        let state = state();
        let response = send(
            &state,
            request("POST", "/api/v1/journal-entries/import", "export")
                .body(Body::from(MIXED))
                .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(state.engine.store().is_empty());
    }
}
