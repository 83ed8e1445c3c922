use crate::core::error::ApiError;
use crate::core::state::AppState;
use crate::models::user::{RegisterResponse, RegistrationRequest};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Register a new user
///
/// POST /api/register
///
/// # Flow
/// 1. Reject malformed JSON or out-of-range field lengths (422), before the store is touched
/// 2. Hand the validated request to the store
/// 3. Duplicate username in the database backend (400)
/// 4. Any other store failure (500, nothing written)
/// 5. 201 with the stored record
#[instrument(skip_all)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegistrationRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload.inspect_err(|e| warn!(error = %e, "Rejected registration body"))?;

    let registration = request
        .validate()
        .inspect_err(|e| warn!(error = %e, "Registration failed validation"))?;

    let record = match state.store.register(registration).await {
        Ok(record) => record,
        Err(e) => {
            let err = ApiError::from(e);
            if let ApiError::Conflict { username } = &err {
                warn!(username = %username, "Registration rejected, username taken");
            }
            return Err(err);
        }
    };

    info!(
        username = %record.username,
        id = ?record.id,
        backend = state.store.backend(),
        "User registered"
    );

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            success: true,
            message: "Registration successful!".to_string(),
            data: record,
        }),
    )
        .into_response())
}
