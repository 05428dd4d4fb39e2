//! CSV/Excel export route.

use axum::{
    Router,
    extract::{Query, State},
    http::{HeaderName, HeaderValue, header},
    response::{IntoResponse, Response},
    routing::get,
};
use tracing::info;

use quire_core::export::ExportOptions;
use quire_shared::AppError;

use crate::{AppState, error::ApiError, middleware::CallerActor};

/// Set to `true` when shutdown cut the file short.
pub const TRUNCATED_HEADER: &str = "x-export-truncated";

/// Number of entries in the file.
pub const ENTRY_COUNT_HEADER: &str = "x-export-entries";

/// Creates the export routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/journal-entries/export", get(export_entries))
}

/// GET `/journal-entries/export` - Download entries as a CSV attachment.
async fn export_entries(
    State(state): State<AppState>,
    CallerActor(actor): CallerActor,
    Query(options): Query<ExportOptions>,
) -> Result<Response, ApiError> {
    let cancel = state.shutdown.child_token();
    let file = state.engine.export(&actor, &options, &cancel).await?;

    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", file.filename))
        .map_err(|e| AppError::Internal(format!("invalid export filename: {e}")))?;

    info!(
        actor = %actor.id,
        filename = %file.filename,
        entries = file.entry_count,
        "Export request served"
    );

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(file.content_type)),
            (header::CONTENT_DISPOSITION, disposition),
            (
                HeaderName::from_static(ENTRY_COUNT_HEADER),
                HeaderValue::from(file.entry_count),
            ),
            (
                HeaderName::from_static(TRUNCATED_HEADER),
                HeaderValue::from_static(if file.truncated { "true" } else { "false" }),
            ),
        ],
        file.bytes,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::StatusCode, http::header};
    use http_body_util::BodyExt;

    use crate::testing::{json, request, send, state};

    const CSV: &str = "\
date,reference,memo,account_code,debit,credit,department,project
2024-01-15,JE-1,Office rent,6100,1500.00,,,
2024-01-15,JE-1,Office rent,1000,,1500.00,,
";

    #[tokio::test]
    async fn test_export_headers_and_body() {
        let state = state();
        let imported = send(
            &state,
            request("POST", "/api/v1/journal-entries/import", "import")
                .body(Body::from(CSV))
                .unwrap(),
        )
        .await;
        assert_eq!(imported.status(), StatusCode::OK);

        let response = send(
            &state,
            request(
                "GET",
                "/api/v1/journal-entries/export?format=summary&dateFrom=2024-01-01",
                "export",
            )
            .body(Body::empty())
            .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers().clone();
        assert_eq!(headers[header::CONTENT_TYPE], "text/csv; charset=utf-8");
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"journal-entries-summary-2024-01-01-end.csv\""
        );
        assert_eq!(headers["x-export-entries"], "1");
        assert_eq!(headers["x-export-truncated"], "false");

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let mut reader = csv::Reader::from_reader(body.as_ref());
        let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][1], "JE-1");
        assert_eq!(&rows[0][4], "DRAFT");
    }

    #[tokio::test]
    async fn test_excel_content_type() {
        let state = state();
        let response = send(
            &state,
            request("GET", "/api/v1/journal-entries/export?fileFormat=excel", "export")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/vnd.ms-excel"
        );
    }

    #[tokio::test]
    async fn test_inverted_range_is_400() {
        let state = state();
        let response = send(
            &state,
            request(
                "GET",
                "/api/v1/journal-entries/export?dateFrom=2024-03-01&dateTo=2024-01-01",
                "export",
            )
            .body(Body::empty())
            .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json(response).await["error"], "INVALID_DATE_RANGE");
    }
}
