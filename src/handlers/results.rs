use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::Json;
use tracing::debug;

use crate::error::Result;
use crate::models::{DeleteResponse, ReceiveAck, ResultsResponse};
use crate::AppState;

/// Receive an asynchronously pushed approval result
/// POST /api/receive-result
#[utoipa::path(
    post,
    path = "/api/receive-result",
    tag = "results",
    responses(
        (status = 200, description = "Result stored", body = ReceiveAck),
        (status = 400, description = "Missing documentId or decision")
    )
)]
pub async fn receive_result(
    State(state): State<AppState>,
    payload: std::result::Result<Json<serde_json::Map<String, serde_json::Value>>, JsonRejection>,
) -> Result<Json<ReceiveAck>> {
    let Json(payload) = payload?;

    // Storage is acknowledged unconditionally; no downstream confirmation
    // is awaited.
    state.results.receive(payload)?;

    Ok(Json(ReceiveAck { success: true }))
}

/// Poll all received results, newest first
/// GET /api/receive-result
#[utoipa::path(
    get,
    path = "/api/receive-result",
    tag = "results",
    responses(
        (status = 200, description = "Stored results, newest first", body = ResultsResponse)
    )
)]
pub async fn list_results(State(state): State<AppState>) -> Result<Json<ResultsResponse>> {
    let results = state.results.query()?;
    debug!(count = results.len(), "returning stored results");

    Ok(Json(ResultsResponse {
        success: true,
        count: results.len(),
        results,
    }))
}

/// Delete a single stored result
/// DELETE /api/receive-result/{documentId}
#[utoipa::path(
    delete,
    path = "/api/receive-result/{documentId}",
    tag = "results",
    params(
        ("documentId" = String, Path, description = "Document identifier")
    ),
    responses(
        (status = 200, description = "Result deleted", body = DeleteResponse),
        (status = 404, description = "No stored result for this document")
    )
)]
pub async fn delete_result(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
) -> Result<Json<DeleteResponse>> {
    state.results.delete(&document_id)?;

    Ok(Json(DeleteResponse {
        success: true,
        message: "result deleted".to_string(),
    }))
}
