use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::ws::manager::WsManager;

/// Ping every connected client once per `every`.
///
/// Runs until the returned handle is aborted. Ticks with no connections are
/// skipped silently.
pub fn start_heartbeat(ws_manager: Arc<WsManager>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;

            let connections = ws_manager.connection_count().await;
            if connections == 0 {
                continue;
            }
            tracing::trace!(connections, "Sending WebSocket heartbeat");
            ws_manager.ping_all().await;
        }
    })
}
