use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use orderpulse_db::repositories::CustomerRepo;
use orderpulse_db::DbPool;
use orderpulse_events::EventSink;
use orderpulse_jobs::{EntityGateway, JobConfig, JobRegistry, PgEntityGateway};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use orderpulse_api::config::ServerConfig;
use orderpulse_api::router::build_app_router;
use orderpulse_api::state::AppState;
use orderpulse_api::ws::{start_heartbeat, WsManager};

const DEFAULT_LOG_FILTER: &str = "orderpulse_api=debug,orderpulse_jobs=debug,tower_http=debug";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env();
    let job_config = JobConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = config.port,
        period_secs = job_config.period.as_secs(),
        amount_min = job_config.amounts.min(),
        amount_max = job_config.amounts.max(),
        "Configuration loaded"
    );

    let pool = connect_database().await;

    let ws_manager = Arc::new(WsManager::new());
    let heartbeat = start_heartbeat(
        Arc::clone(&ws_manager),
        Duration::from_secs(config.ws_heartbeat_secs),
    );

    let jobs = start_jobs(&pool, Arc::clone(&ws_manager), job_config).await;

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        ws_manager: Arc::clone(&ws_manager),
        jobs: Arc::clone(&jobs),
    };
    let app = build_app_router(state, &config);

    let ip = config.host.parse().expect("HOST must be an IP address");
    let addr = SocketAddr::new(ip, config.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("HTTP server stopped");

    // Order jobs publish into sockets, so they go first.
    let grace = Duration::from_secs(config.shutdown_timeout_secs);
    if tokio::time::timeout(grace, jobs.shutdown()).await.is_err() {
        tracing::warn!(?grace, "Order jobs still running after shutdown timeout");
    }

    tracing::info!(
        connections = ws_manager.connection_count().await,
        "Closing WebSocket connections"
    );
    ws_manager.shutdown_all().await;
    heartbeat.abort();

    tracing::info!("Shutdown complete");
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Connect, verify, and migrate. Any failure aborts startup.
async fn connect_database() -> DbPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = orderpulse_db::create_pool(&url)
        .await
        .expect("Failed to connect to database");
    orderpulse_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    orderpulse_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database ready");
    pool
}

/// Build the registry and start a job for every stored customer.
///
/// Jobs live only in memory, so a restart has to re-arm them. A failed
/// customer lookup leaves the registry empty rather than aborting startup.
async fn start_jobs(
    pool: &DbPool,
    ws_manager: Arc<WsManager>,
    config: JobConfig,
) -> Arc<JobRegistry> {
    let gateway: Arc<dyn EntityGateway> = Arc::new(PgEntityGateway::new(pool.clone()));
    let sink: Arc<dyn EventSink> = ws_manager;
    let jobs = Arc::new(JobRegistry::new(gateway, sink, config));

    match CustomerRepo::list_ids(pool).await {
        Ok(ids) => jobs.resume(ids).await,
        Err(e) => tracing::error!(error = %e, "Could not load customers, no jobs resumed"),
    }
    jobs
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let signal = tokio::select! {
        () = ctrl_c => "SIGINT",
        () = terminate => "SIGTERM",
    };
    tracing::info!(signal, "Shutdown requested");
}
