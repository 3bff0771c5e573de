//! Handlers for a customer's generated orders.

use axum::extract::{Path, Query, State};
use axum::Json;
use orderpulse_core::error::CoreError;
use orderpulse_core::types::DbId;
use orderpulse_db::models::order::{OrderSummary, PagedResult};
use orderpulse_db::repositories::{CustomerRepo, OrderRepo};

use crate::error::{AppError, AppResult};
use crate::query::OrderListParams;
use crate::state::AppState;

/// GET /api/v1/customers/{id}/orders
///
/// An unknown customer is a 404 and an inverted amount or date range is a
/// 400, rather than an empty page, so clients can tell "no orders yet" from
/// a bad request.
pub async fn list_for_customer(
    State(state): State<AppState>,
    Path(customer_id): Path<DbId>,
    Query(params): Query<OrderListParams>,
) -> AppResult<Json<PagedResult<OrderSummary>>> {
    let (filter, page) = params.into_parts()?;

    CustomerRepo::find_by_id(&state.pool, customer_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Customer",
            id: customer_id,
        }))?;

    let result = OrderRepo::list_for_customer(&state.pool, customer_id, &filter, page).await?;
    Ok(Json(result))
}
