//! Order model, insert DTO, and the paged list projection.

use orderpulse_core::types::{DbId, Timestamp};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

/// An order row from the `orders` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: DbId,
    pub customer_id: DbId,
    pub description: String,
    pub amount: Decimal,
    pub created_at: Timestamp,
}

/// DTO for inserting an order. `id` is assigned by the database.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub customer_id: DbId,
    pub description: String,
    pub amount: Decimal,
    pub created_at: Timestamp,
}

/// Order as returned by the customer order listing.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub id: DbId,
    pub description: String,
    pub amount: Decimal,
    pub created_at: Timestamp,
}

/// Optional filters for listing a customer's orders. Bounds are inclusive.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub from_date: Option<Timestamp>,
    pub to_date: Option<Timestamp>,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
}

/// One page of results plus the unpaged total.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResult<T: Serialize> {
    pub items: Vec<T>,
    pub total_count: i64,
    pub page: i64,
    pub page_size: i64,
}
