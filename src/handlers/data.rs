use crate::core::error::ApiError;
use crate::core::state::AppState;
use crate::models::user::UserRecord;
use axum::{extract::State, response::Json};
use std::sync::Arc;
use tracing::debug;

/// List every stored registration
///
/// GET /api/data
pub async fn data_handler(State(state): State<Arc<AppState>>) -> Result<Json<Vec<UserRecord>>, ApiError> {
    let users = state.store.list().await?;

    debug!(count = users.len(), "Listed registrations");

    Ok(Json(users))
}
