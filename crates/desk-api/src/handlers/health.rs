//! Health check handlers

use axum::{extract::State, http::StatusCode, Json};
use desk_service::{HealthResponse, ReadinessResponse};

use crate::state::AppState;

/// Liveness check
///
/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(
        env!("CARGO_PKG_VERSION"),
        state.uptime_secs(),
    ))
}

/// Readiness check
///
/// GET /health/ready
///
/// Verifies the database connection and returns 503 when it is unreachable.
pub async fn readiness_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let database_healthy = match state.service_context().health_probe().ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed to reach the database");
            false
        }
    };

    let status = if database_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(ReadinessResponse::ready(database_healthy)))
}
