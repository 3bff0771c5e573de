use axum::routing::get;
use axum::Router;

use crate::handlers::{customer, order};
use crate::state::AppState;

/// Routes mounted at `/customers`.
///
/// ```text
/// GET    /                -> list
/// POST   /                -> create
/// GET    /jobs            -> active_jobs
/// GET    /{id}            -> get_by_id
/// PUT    /{id}            -> update
/// DELETE /{id}            -> delete
/// GET    /{id}/orders     -> list_for_customer
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(customer::list).post(customer::create))
        .route("/jobs", get(customer::active_jobs))
        .route(
            "/{id}",
            get(customer::get_by_id)
                .put(customer::update)
                .delete(customer::delete),
        )
        .route("/{id}/orders", get(order::list_for_customer))
}
