use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// Health check endpoint for liveness probes. The service carries no
/// external dependencies in local mode, so up means healthy.
pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": "hospital-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}
