use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::Json;
use tracing::info;

use crate::error::Result;
use crate::models::{ManualResultRequest, PushDocumentRequest, PushResponse, WebhookConfig};
use crate::AppState;

/// Push a manual approval decision to the counterparty
/// POST /api/push-manual-result
#[utoipa::path(
    post,
    path = "/api/push-manual-result",
    tag = "push",
    request_body = ManualResultRequest,
    responses(
        (status = 200, description = "Result pushed and acknowledged", body = PushResponse),
        (status = 400, description = "Missing/invalid fields or unparsable webhookId"),
        (status = 502, description = "Counterparty rejected the push or was unreachable")
    )
)]
pub async fn push_manual_result(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ManualResultRequest>, JsonRejection>,
) -> Result<Json<PushResponse>> {
    let Json(mut request) = payload?;

    info!(
        document_id = request.document_id.as_deref().unwrap_or("<missing>"),
        decision = request.decision.as_deref().unwrap_or("<missing>"),
        "manual approval result push requested"
    );

    request.config = resolve_config(request.config, &state);
    let result = state.dispatcher.push_manual_result(request).await?;

    Ok(Json(PushResponse {
        success: true,
        message: "manual approval result pushed".to_string(),
        result,
    }))
}

/// Push a document event to the counterparty
/// POST /api/push-document
#[utoipa::path(
    post,
    path = "/api/push-document",
    tag = "push",
    request_body = PushDocumentRequest,
    responses(
        (status = 200, description = "Document pushed and acknowledged", body = PushResponse),
        (status = 400, description = "Missing/invalid fields"),
        (status = 502, description = "Counterparty rejected the push or was unreachable")
    )
)]
pub async fn push_document(
    State(state): State<AppState>,
    payload: std::result::Result<Json<PushDocumentRequest>, JsonRejection>,
) -> Result<Json<PushResponse>> {
    let Json(mut request) = payload?;

    info!("document push requested");

    request.config = resolve_config(request.config, &state);
    let result = state.dispatcher.push_document(request).await?;

    Ok(Json(PushResponse {
        success: true,
        message: "document pushed".to_string(),
        result,
    }))
}

/// Fall back to the configured default webhook target when the request
/// carries no inline config.
fn resolve_config(config: Option<WebhookConfig>, state: &AppState) -> Option<WebhookConfig> {
    config.or_else(|| {
        let defaults = &state.config.webhook;
        match (&defaults.webhook_url, &defaults.webhook_secret) {
            (None, None) => None,
            (url, secret) => Some(WebhookConfig {
                webhook_url: url.clone(),
                secret: secret.clone(),
            }),
        }
    })
}
