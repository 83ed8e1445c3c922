// HTTP routes configuration

use crate::core::state::AppState;
use crate::handlers::{data, fallback, health, pages, register, stats};
use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

pub fn build_router(state: Arc<AppState>) -> Router {
    let static_dir = state.config.web.static_dir.clone();

    Router::new()
        // Pages
        .route("/", get(pages::index_handler))
        .route("/index", get(pages::index_handler))
        .nest_service("/static", ServeDir::new(static_dir))

        // API
        .route("/api/register", post(register::register_handler))
        .route("/api/data", get(data::data_handler))
        .route("/api/stats", get(stats::stats_handler))

        // Liveness check
        .route("/health", get(health::health_handler))

        // 404 fallback for all unmatched routes
        .fallback(fallback::fallback_handler)

        .with_state(state)
}

/// Router plus tracing, CORS and request timeout middleware
pub fn build_app(state: Arc<AppState>) -> Router {
    let timeout = Duration::from_secs(state.config.server.request_timeout);

    build_router(state).layer(
        ServiceBuilder::new()
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                    .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
            )
            .layer(CorsLayer::permissive())
            .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout)),
    )
}
