//! WebSocket infrastructure for real-time order notifications.
//!
//! Provides connection management, per-customer subscription groups, the
//! JSON frame protocol, heartbeat pings, and the HTTP upgrade handler used by
//! Axum routes.

mod handler;
mod heartbeat;
pub mod manager;
pub mod protocol;

pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use manager::WsManager;
