// Centralized error handling for the HTTP layer

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;
use tracing::error;

use crate::models::user::ErrorResponse;
use crate::stores::StoreError;
use crate::validation::registration::ValidationError;

/// Errors returned by request handlers
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Username already exists")]
    Conflict { username: String },

    #[error("Internal server error")]
    Store(#[source] StoreError),

    #[error("{0} not found")]
    NotFound(String),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict { username } => ApiError::Conflict { username },
            other => ApiError::Store(other),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(ValidationError::MalformedBody(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Conflict { .. } => StatusCode::BAD_REQUEST,
            ApiError::Store(e) => {
                // Detail stays in the logs, the client gets the generic message
                error!(error = %e, "Store operation failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        };

        (
            status,
            Json(ErrorResponse {
                success: false,
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http_body_util::BodyExt;

    async fn body_of(err: ApiError) -> (StatusCode, ErrorResponse) {
        let (parts, body) = err.into_response().into_parts();
        let bytes = Body::new(body).collect().await.unwrap().to_bytes();
        (parts.status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_validation_is_422() {
        let err = ApiError::from(ValidationError::TooShort {
            field: "username",
            min: 3,
            actual: 1,
        });

        let (status, body) = body_of(err).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(!body.success);
        assert_eq!(body.error, "username must be at least 3 characters, got 1");
    }

    #[tokio::test]
    async fn test_conflict_is_400() {
        let err = ApiError::from(StoreError::Conflict {
            username: "taken".to_string(),
        });

        let (status, body) = body_of(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "Username already exists");
    }

    #[tokio::test]
    async fn test_store_failure_hides_detail() {
        let err = ApiError::from(StoreError::Database(sqlx::Error::PoolTimedOut));

        let (status, body) = body_of(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "Internal server error");
    }

    #[tokio::test]
    async fn test_not_found_is_404() {
        let (status, body) = body_of(ApiError::NotFound("index.html".to_string())).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error, "index.html not found");
    }
}
