use std::sync::Arc;

use orderpulse_jobs::JobRegistry;

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: orderpulse_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// WebSocket connection manager (browser clients). Also the event sink
    /// the order jobs publish through.
    pub ws_manager: Arc<WsManager>,
    /// Per-customer order jobs.
    pub jobs: Arc<JobRegistry>,
}
