//! Customer entity model and DTOs.

use orderpulse_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A customer row from the `customers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub is_active: bool,
    pub created_at: Timestamp,
}

/// DTO for creating a new customer.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomer {
    pub name: String,
    pub email: String,
    /// Defaults to `true` if omitted.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// DTO for replacing a customer's editable fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCustomer {
    pub name: String,
    pub email: String,
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}
