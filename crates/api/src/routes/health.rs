use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Body of `GET /health`.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok` when the database answers, `degraded` otherwise.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Customers with a running order job.
    pub active_jobs: usize,
    pub ws_connections: usize,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = orderpulse_db::health_check(&state.pool).await.is_ok();

    Json(HealthResponse {
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        active_jobs: state.jobs.active_count().await,
        ws_connections: state.ws_manager.connection_count().await,
    })
}

/// Root-level health route; not nested under `/api/v1`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
