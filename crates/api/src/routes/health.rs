//! Health check endpoints.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub checks: HealthChecks,
}

#[derive(Debug, Serialize)]
pub struct HealthChecks {
    pub database: &'static str,
}

/// `GET /health`: dependency report, 503 if any check fails.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let database_ok = database_reachable(&state).await;

    let (status, label) = if database_ok {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };

    (
        status,
        Json(HealthReport {
            status: label,
            checks: HealthChecks {
                database: if database_ok { "up" } else { "down" },
            },
        }),
    )
}

/// `GET /health/live`: the process is serving requests.
pub async fn live() -> &'static str {
    "ok"
}

/// `GET /health/ready`: 503 until the database answers.
pub async fn ready(State(state): State<AppState>) -> StatusCode {
    if database_reachable(&state).await {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

async fn database_reachable(state: &AppState) -> bool {
    match sqlx::query("SELECT 1").execute(state.pool()).await {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            false
        }
    }
}
