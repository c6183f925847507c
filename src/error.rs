use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or missing caller input. Never retried; the message names
    /// the offending field.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The webhook id could not be extracted from the caller-supplied URL.
    #[error("Cannot resolve webhook endpoint: {0}")]
    EndpointResolution(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The counterparty answered with a non-2xx status.
    #[error("Webhook dispatch failed with status {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    /// The request never produced a response (connect failure, timeout, ...).
    #[error("Webhook dispatch failed: {0}")]
    UpstreamTransport(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Structured error response, `{success:false, error, ...}` on every failure
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::EndpointResolution(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::UpstreamStatus { .. } | ApiError::UpstreamTransport(_) => {
                StatusCode::BAD_GATEWAY
            }
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Log error with appropriate level
    fn log_error(&self, request_id: &str) {
        match self.status_code() {
            status if status.is_server_error() => {
                error!(
                    request_id = %request_id,
                    error = %self,
                    "Server error occurred"
                );
            }
            status if status.is_client_error() => {
                warn!(
                    request_id = %request_id,
                    error = %self,
                    "Client error occurred"
                );
            }
            _ => {}
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::UpstreamTransport(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Internal(format!("JSON serialization failed: {}", err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let request_id = Uuid::new_v4().to_string();
        let status = self.status_code();

        self.log_error(&request_id);

        // Debug rendering of the error is only exposed outside production,
        // mirroring the stack traces the demo shows in development mode.
        let stack = if is_production() {
            None
        } else {
            Some(format!("{:?}", self))
        };

        let body = ErrorResponse {
            success: false,
            error: self.to_string(),
            request_id,
            stack,
        };

        (status, Json(body)).into_response()
    }
}

fn is_production() -> bool {
    std::env::var("ENVIRONMENT")
        .map(|env| env == "production")
        .unwrap_or(false)
}

/// Convert Axum JSON rejections into structured API errors so handlers can
/// extract with `?`
impl From<JsonRejection> for ApiError {
    fn from(err: JsonRejection) -> Self {
        match err {
            JsonRejection::JsonDataError(e) => {
                ApiError::Validation(format!("Invalid request body: {}", e))
            }
            JsonRejection::JsonSyntaxError(_) => {
                ApiError::Validation("Invalid JSON format".to_string())
            }
            JsonRejection::MissingJsonContentType(_) => {
                ApiError::Validation("JSON content type required".to_string())
            }
            _ => ApiError::Validation("Invalid request body format".to_string()),
        }
    }
}
