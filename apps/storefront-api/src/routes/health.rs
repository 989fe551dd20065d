//! Health check endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub migrations_applied: usize,
    pub migrations_total: usize,
}

/// GET /health: reports whether the database answers and how far it is migrated.
pub async fn check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let healthy = state.db.health_check().await;
    let (total, applied) = state.db.migration_status().await.unwrap_or((0, 0));

    let (status, code) = if healthy {
        ("ok", StatusCode::OK)
    } else {
        tracing::warn!("Health check failed: database unreachable");
        ("degraded", StatusCode::SERVICE_UNAVAILABLE)
    };

    (
        code,
        Json(HealthResponse {
            status,
            database: if healthy { "up" } else { "down" },
            migrations_applied: applied,
            migrations_total: total,
        }),
    )
}
