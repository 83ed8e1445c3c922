use crate::core::error::ApiError;
use crate::core::state::AppState;
use crate::models::user::StatsResponse;
use axum::{extract::State, response::Json};
use std::sync::Arc;

/// GET /api/stats
pub async fn stats_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatsResponse>, ApiError> {
    let total_registrations = state.store.count().await?;

    Ok(Json(StatsResponse {
        total_registrations,
        status: "active".to_string(),
    }))
}
