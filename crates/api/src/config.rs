use std::fmt::Display;
use std::str::FromStr;

/// HTTP server settings, read from the environment at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Browser origins allowed by CORS.
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    /// Upper bound on post-shutdown cleanup (job drain).
    pub shutdown_timeout_secs: u64,
    /// Seconds between WebSocket pings. Never zero.
    pub ws_heartbeat_secs: u64,
}

impl ServerConfig {
    /// Read settings from the environment, falling back to local defaults.
    ///
    /// | Env Var                 | Default                 |
    /// |-------------------------|-------------------------|
    /// | `HOST`                  | `0.0.0.0`               |
    /// | `PORT`                  | `3000`                  |
    /// | `CORS_ORIGINS`          | `http://localhost:4200` |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `30`                    |
    /// | `WS_HEARTBEAT_SECS`     | `30`                    |
    ///
    /// `CORS_ORIGINS` is comma-separated.
    ///
    /// # Panics
    ///
    /// Panics on a value that does not parse, or a zero heartbeat interval.
    pub fn from_env() -> Self {
        let cors_origins = env_or("CORS_ORIGINS", "http://localhost:4200".to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();

        let ws_heartbeat_secs: u64 = env_or("WS_HEARTBEAT_SECS", 30);
        assert!(ws_heartbeat_secs > 0, "WS_HEARTBEAT_SECS must be positive");

        Self {
            host: env_or("HOST", "0.0.0.0".to_string()),
            port: env_or("PORT", 3000),
            cors_origins,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30),
            shutdown_timeout_secs: env_or("SHUTDOWN_TIMEOUT_SECS", 30),
            ws_heartbeat_secs,
        }
    }
}

/// Parse `key` from the environment, or return `default` when it is unset.
fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{key} has an invalid value '{raw}': {e}")),
        Err(_) => default,
    }
}
