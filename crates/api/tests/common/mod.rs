#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use orderpulse_api::config::ServerConfig;
use orderpulse_api::router::build_app_router;
use orderpulse_api::state::AppState;
use orderpulse_api::ws::WsManager;
use orderpulse_jobs::{JobConfig, JobRegistry, PgEntityGateway};

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:4200".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        ws_heartbeat_secs: 30,
    }
}

/// Build application state backed by `pool`.
///
/// Jobs use the real Postgres gateway with a one-hour period, so a started
/// job performs exactly one cycle during a test.
pub fn build_test_state(pool: PgPool) -> AppState {
    let ws_manager = Arc::new(WsManager::new());
    let jobs = Arc::new(JobRegistry::new(
        Arc::new(PgEntityGateway::new(pool.clone())),
        Arc::clone(&ws_manager) as Arc<dyn orderpulse_events::EventSink>,
        JobConfig::default().with_period(Duration::from_secs(3600)),
    ));

    AppState {
        pool,
        config: Arc::new(test_config()),
        ws_manager,
        jobs,
    }
}

/// Build the full application router with all middleware layers.
pub fn build_test_app(pool: PgPool) -> Router {
    build_app_router(build_test_state(pool), &test_config())
}

/// Build the router around an existing state so tests can inspect it.
pub fn app_with_state(state: &AppState) -> Router {
    build_app_router(state.clone(), &test_config())
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None).await
}

pub async fn delete(app: Router, uri: &str) -> Response {
    send(app, Method::DELETE, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::PUT, uri, Some(body)).await
}

async fn send(app: Router, method: Method, uri: &str, body: Option<serde_json::Value>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
