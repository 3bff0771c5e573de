pub mod customer;
pub mod health;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /ws                                  WebSocket (order notifications)
///
/// /customers                           list, create
/// /customers/jobs                      running job ids
/// /customers/{id}                      get, update, delete
/// /customers/{id}/orders               paged order listing
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .nest("/customers", customer::router())
}
