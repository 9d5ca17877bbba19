//! Liveness and readiness probes

use axum::{extract::State, http::StatusCode, Json};
use screen_service::dto::{HealthResponse, ReadinessResponse};

use crate::state::AppState;

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /health/ready
///
/// Contexts without a database (in-memory storage) report it as skipped.
pub async fn readiness_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let database = match state.service_context().pool() {
        Some(pool) => match pool.acquire().await {
            Ok(_) => "up",
            Err(e) => {
                tracing::warn!(error = %e, "Readiness probe could not reach the database");
                "down"
            }
        },
        None => "skipped",
    };

    if database == "down" {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadinessResponse {
                status: "unavailable",
                database,
            }),
        )
    } else {
        (
            StatusCode::OK,
            Json(ReadinessResponse {
                status: "ready",
                database,
            }),
        )
    }
}
