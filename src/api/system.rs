use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;

use super::{AppState, HealthResponse, MessageResponse};

/// GET /
pub async fn welcome() -> Json<MessageResponse> {
    Json(MessageResponse::new("Welcome to application."))
}

/// GET /api/health
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let version = env!("CARGO_PKG_VERSION");
    let uptime_seconds = state.start_time.elapsed().as_secs();

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                database: "ok",
                version,
                uptime_seconds,
            }),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Health check failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(HealthResponse {
                    status: "error",
                    database: "unreachable",
                    version,
                    uptime_seconds,
                }),
            )
        }
    }
}
