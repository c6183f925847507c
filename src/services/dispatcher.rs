//! Outbound webhook dispatcher.
//!
//! Both operations share one pattern: validate the caller input, derive the
//! target endpoint, sign the payload, POST it with the `x-webhook-*` headers,
//! and surface the counterparty's response. A dispatch is a single attempt
//! with no retry; retry policy belongs to the calling layer.

use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{Client, Url};
use serde_json::{json, Map, Value};
use tracing::info;

use crate::error::{ApiError, Result};
use crate::models::{ApproverInfo, ManualResultRequest, PushDocumentRequest, WebhookConfig};
use crate::signature::{self, SignatureInfo};

/// Path segment pattern the webhook id is extracted from,
/// e.g. `https://host/v1/integrations/webhook/{webhookId}/...`
static WEBHOOK_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"webhook/([^/]+)").expect("webhook id pattern is valid"));

/// Outbound webhook dispatcher service
#[derive(Clone)]
pub struct WebhookDispatcher {
    client: Client,
}

impl WebhookDispatcher {
    /// Build the dispatcher with its own HTTP client.
    ///
    /// The counterparty in this demo presents a self-signed certificate, so
    /// certificate validation is disabled for this client only. The
    /// downgrade is scoped here and never applied globally.
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(true)
            .build()?;

        Ok(Self { client })
    }

    /// Push a manual approval decision to the counterparty's manual-result
    /// endpoint.
    ///
    /// The signature payload carries one more field than the transmitted
    /// body: `webhookId` travels in the URL path, but the receiving endpoint
    /// folds the path parameter into its verification input, so it is
    /// prepended to the signed object.
    pub async fn push_manual_result(&self, request: ManualResultRequest) -> Result<Value> {
        let (document_id, decision, approver, config) = validate_manual_result(request)?;
        let (webhook_url, secret) = validate_config(&config)?;

        let webhook_id = extract_webhook_id(&webhook_url)?;
        let target_url = manual_result_url(&webhook_url, &webhook_id)?;

        // Transmitted body; its `timestamp` field is distinct from the
        // signature's own timestamp.
        let mut body = Map::new();
        body.insert("documentId".to_string(), json!(document_id));
        body.insert("decision".to_string(), json!(decision));
        body.insert(
            "approver".to_string(),
            json!({
                "id": approver.id,
                "name": approver.name,
                "email": approver.email,
            }),
        );
        body.insert("timestamp".to_string(), json!(signature::unix_timestamp()));

        // Signature payload: body plus webhookId as the first key.
        let mut signed = Map::with_capacity(body.len() + 1);
        signed.insert("webhookId".to_string(), json!(webhook_id));
        signed.extend(body.clone());

        let body = Value::Object(body);
        let sig = signature::signature_info(&Value::Object(signed), &secret)?;

        info!(
            document_id = %document_id,
            decision = %decision,
            url = %target_url,
            "pushing manual approval result"
        );

        let result = self.send_signed(&target_url, &body, &sig).await?;
        info!(document_id = %document_id, "manual approval result pushed");

        Ok(result)
    }

    /// Push a document event. The combined body is opaque to the dispatcher:
    /// it is the signature payload verbatim and is sent to the
    /// caller-supplied webhook URL as-is.
    pub async fn push_document(&self, request: PushDocumentRequest) -> Result<Value> {
        let document = request
            .document
            .ok_or_else(|| ApiError::Validation("missing required field: document".to_string()))?;
        let config = request
            .config
            .ok_or_else(|| ApiError::Validation("missing required field: config".to_string()))?;
        let (webhook_url, secret) = validate_config(&config)?;

        let mut body = Map::new();
        body.insert("document".to_string(), document);
        body.insert("attachments".to_string(), json!(request.attachments));
        let body = Value::Object(body);

        let sig = signature::signature_info(&body, &secret)?;

        info!(url = %webhook_url, "pushing document event");

        self.send_signed(&webhook_url, &body, &sig).await
    }

    /// POST a signed payload and map the outcome onto the dispatch taxonomy.
    async fn send_signed(&self, url: &str, body: &Value, sig: &SignatureInfo) -> Result<Value> {
        let response = self
            .client
            .post(url)
            .header("x-webhook-signature", &sig.signature)
            .header("x-webhook-timestamp", sig.timestamp.to_string())
            .header("x-webhook-nonce", &sig.nonce)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        let result = response.json().await?;
        Ok(result)
    }
}

/// Check presence of the four top-level fields, by name, before any network
/// I/O. Decision must be exactly "approve" or "reject".
fn validate_manual_result(
    request: ManualResultRequest,
) -> Result<(String, String, ApproverInfo, WebhookConfig)> {
    let document_id = request
        .document_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::Validation("missing required field: documentId".to_string()))?;
    let decision = request
        .decision
        .filter(|d| !d.is_empty())
        .ok_or_else(|| ApiError::Validation("missing required field: decision".to_string()))?;
    let approver = request
        .approver
        .ok_or_else(|| ApiError::Validation("missing required field: approver".to_string()))?;
    let config = request
        .config
        .ok_or_else(|| ApiError::Validation("missing required field: config".to_string()))?;

    if decision != "approve" && decision != "reject" {
        return Err(ApiError::Validation(format!(
            "decision must be \"approve\" or \"reject\", got \"{}\"",
            decision
        )));
    }

    Ok((document_id, decision, approver, config))
}

fn validate_config(config: &WebhookConfig) -> Result<(String, String)> {
    let webhook_url = config
        .webhook_url
        .clone()
        .filter(|u| !u.is_empty())
        .ok_or_else(|| {
            ApiError::Validation("missing required field: config.webhookUrl".to_string())
        })?;
    let secret = config
        .secret
        .clone()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::Validation("missing required field: config.secret".to_string()))?;

    Ok((webhook_url, secret))
}

/// Extract the webhook id from the path segment following `webhook/`.
fn extract_webhook_id(webhook_url: &str) -> Result<String> {
    WEBHOOK_ID_RE
        .captures(webhook_url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| {
            ApiError::EndpointResolution(format!(
                "cannot extract webhookId from \"{}\"; expected .../webhook/{{webhookId}}/...",
                webhook_url
            ))
        })
}

/// Rewrite host + webhookId into the fixed manual-result path, discarding
/// whatever trailed the webhook id in the caller's URL.
fn manual_result_url(webhook_url: &str, webhook_id: &str) -> Result<String> {
    let parsed = Url::parse(webhook_url)
        .map_err(|e| ApiError::EndpointResolution(format!("invalid webhookUrl: {}", e)))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| ApiError::EndpointResolution("webhookUrl has no host".to_string()))?;

    let mut base = format!("{}://{}", parsed.scheme(), host);
    if let Some(port) = parsed.port() {
        base.push_str(&format!(":{}", port));
    }

    Ok(format!(
        "{}/api/v1/integrations/webhook/{}/manual-result",
        base, webhook_id
    ))
}
