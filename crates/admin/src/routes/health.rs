//! Health check endpoints.

use axum::extract::State;
use axum::http::StatusCode;

use crate::state::AppState;

/// Liveness. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness: 503 until the points API answers.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.api().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "points API unreachable");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
