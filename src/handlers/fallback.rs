use axum::{
    http::{StatusCode, Uri},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const VALID_ENDPOINTS: [&str; 7] = [
    "GET /",
    "GET /index",
    "POST /api/register",
    "GET /api/data",
    "GET /api/stats",
    "GET /health",
    "GET /static/*",
];

#[derive(Debug, Serialize, Deserialize)]
pub struct FallbackResponse {
    pub success: bool,
    pub error: String,
    pub valid_endpoints: Vec<String>,
}

pub async fn fallback_handler(uri: Uri) -> Response {
    debug!(path = %uri.path(), "No route matched");

    (
        StatusCode::NOT_FOUND,
        Json(FallbackResponse {
            success: false,
            error: format!("Invalid endpoint {}", uri.path()),
            valid_endpoints: VALID_ENDPOINTS.iter().map(|e| e.to_string()).collect(),
        }),
    )
        .into_response()
}
