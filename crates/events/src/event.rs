//! The `OrderCreated` notification.

use orderpulse_core::types::{DbId, Timestamp};
use orderpulse_db::models::order::Order;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Projection of a freshly persisted [`Order`] sent to live subscribers.
///
/// Carries no identity of its own; `id` is the order's database id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreated {
    pub customer_id: DbId,
    pub id: DbId,
    pub amount: Decimal,
    pub created_at: Timestamp,
}

impl From<&Order> for OrderCreated {
    fn from(order: &Order) -> Self {
        Self {
            customer_id: order.customer_id,
            id: order.id,
            amount: order.amount,
            created_at: order.created_at,
        }
    }
}
