//! Handlers for the `/customers` resource.
//!
//! Creating a customer starts its order job; deleting one stops it.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use orderpulse_core::error::CoreError;
use orderpulse_core::types::DbId;
use orderpulse_core::validation::validate_customer;
use orderpulse_db::models::customer::{CreateCustomer, Customer, UpdateCustomer};
use orderpulse_db::repositories::CustomerRepo;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Customer",
        id,
    })
}

/// POST /api/v1/customers
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateCustomer>,
) -> AppResult<(StatusCode, Json<Customer>)> {
    validate_customer(&input.name, &input.email)?;

    let customer = CustomerRepo::create(&state.pool, &input).await?;
    tracing::info!(customer_id = customer.id, "Customer created");

    state.jobs.start(customer.id).await;

    Ok((StatusCode::CREATED, Json(customer)))
}

/// GET /api/v1/customers
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<Customer>>> {
    let customers = CustomerRepo::list(&state.pool).await?;
    Ok(Json(customers))
}

/// GET /api/v1/customers/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Customer>> {
    let customer = CustomerRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(customer))
}

/// PUT /api/v1/customers/{id}
///
/// Leaves the job alone: the active flag is re-read on every cycle.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCustomer>,
) -> AppResult<Json<Customer>> {
    validate_customer(&input.name, &input.email)?;

    let customer = CustomerRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(customer))
}

/// DELETE /api/v1/customers/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    let deleted = CustomerRepo::delete(&state.pool, id).await?;
    if !deleted {
        return Err(not_found(id));
    }
    tracing::info!(customer_id = id, "Customer deleted");

    state.jobs.stop(id).await;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/customers/jobs
///
/// Ids of customers whose order job is currently running.
pub async fn active_jobs(State(state): State<AppState>) -> Json<Vec<DbId>> {
    Json(state.jobs.active_ids().await)
}
