//! Router configuration.

use std::time::Duration;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers::{health, push, results};
use crate::AppState;

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Webhook Relay API",
        description = "Signed webhook exchange between a document-workflow platform and an external approver",
        version = "0.1.0",
    ),
    paths(
        health::health_check,
        push::push_document,
        push::push_manual_result,
        results::receive_result,
        results::list_results,
        results::delete_result,
    )
)]
struct ApiDoc;

/// Build the application router.
pub fn build_router(app_state: AppState) -> Router {
    let request_timeout = app_state.config.request_timeout;

    Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/push-document", post(push::push_document))
        .route("/api/push-manual-result", post(push::push_manual_result))
        .route(
            "/api/receive-result",
            post(results::receive_result).get(results::list_results),
        )
        .route(
            "/api/receive-result/{documentId}",
            delete(results::delete_result),
        )
        // Swagger UI
        .merge(SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(Duration::from_secs(request_timeout)))
                // Demo UI is a local browser page; origins are left open
                .layer(CorsLayer::permissive()),
        )
        .with_state(app_state)
}
