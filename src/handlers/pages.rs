use crate::core::error::ApiError;
use crate::core::state::AppState;
use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
};
use std::sync::Arc;
use tracing::warn;

const INDEX_FILE: &str = "index.html";

/// Landing page
///
/// GET / and GET /index
pub async fn index_handler(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let path = state.config.web.templates_dir.join(INDEX_FILE);

    match tokio::fs::read_to_string(&path).await {
        Ok(html) => Ok(Html(html).into_response()),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Landing page unavailable");
            Err(ApiError::NotFound(INDEX_FILE.to_string()))
        }
    }
}
