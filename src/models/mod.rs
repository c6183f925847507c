// Wire types shared between handlers and services.
// Field names follow the counterparty's camelCase JSON contract.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Identity of the human approver attached to a manual decision
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApproverInfo {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Per-call webhook target. Secrets are supplied by the caller; nothing is
/// stored server-side.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WebhookConfig {
    pub webhook_url: Option<String>,
    pub secret: Option<String>,
}

/// Request body for POST /api/push-manual-result.
///
/// Presence of the top-level fields is checked by the dispatcher rather than
/// by serde so that each missing field is reported by name.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManualResultRequest {
    pub document_id: Option<String>,
    pub decision: Option<String>,
    pub approver: Option<ApproverInfo>,
    pub config: Option<WebhookConfig>,
}

/// Request body for POST /api/push-document. The document itself is opaque
/// to the dispatcher; it is signed and transmitted as supplied.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PushDocumentRequest {
    #[schema(value_type = Object)]
    pub document: Option<serde_json::Value>,
    #[serde(default)]
    pub attachments: Vec<String>,
    pub config: Option<WebhookConfig>,
}

/// A stored approval result, as delivered by the counterparty plus receipt
/// stamps. Fields beyond the known ones are preserved verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalResult {
    pub document_id: String,
    pub decision: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval_url: Option<String>,
    /// ISO-8601 receipt time
    pub received_at: String,
    /// Receipt time in Unix milliseconds; query ordering key
    pub received_timestamp: i64,
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Response for both push endpoints
#[derive(Debug, Serialize, ToSchema)]
pub struct PushResponse {
    pub success: bool,
    pub message: String,
    #[schema(value_type = Object)]
    pub result: serde_json::Value,
}

/// Acknowledgement returned to the counterparty on receive
#[derive(Debug, Serialize, ToSchema)]
pub struct ReceiveAck {
    pub success: bool,
}

/// Response for GET /api/receive-result
#[derive(Debug, Serialize, ToSchema)]
pub struct ResultsResponse {
    pub success: bool,
    pub count: usize,
    pub results: Vec<ApprovalResult>,
}

/// Response for DELETE /api/receive-result/{documentId}
#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}
