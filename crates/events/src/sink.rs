//! Delivery of events to a customer's subscribers.

use async_trait::async_trait;
use orderpulse_core::types::DbId;

use crate::event::OrderCreated;

/// Delivers events to every live subscriber of a customer.
///
/// Delivery is best-effort: a subscriber that cannot receive the event is
/// skipped without affecting the others, and nothing is buffered for
/// subscribers that join later. Implementations never fail the caller.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Push `event` to the group for `customer_id`.
    ///
    /// Returns the number of subscribers the event was handed to.
    async fn publish(&self, customer_id: DbId, event: &OrderCreated) -> usize;
}

