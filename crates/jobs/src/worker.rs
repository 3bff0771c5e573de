//! The recurring task behind one customer job.

use std::sync::Arc;
use std::time::Duration;

use orderpulse_core::order_generation::{AmountRange, AUTO_ORDER_DESCRIPTION};
use orderpulse_core::types::DbId;
use orderpulse_db::models::order::NewOrder;
use orderpulse_events::{EventSink, OrderCreated};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::gateway::{EntityGateway, GatewayError};

/// Collaborators and settings a worker needs. Cheap to clone.
#[derive(Clone)]
pub struct JobContext {
    pub gateway: Arc<dyn EntityGateway>,
    pub sink: Arc<dyn EventSink>,
    pub amounts: AmountRange,
    pub period: Duration,
}

/// What a single cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The customer was missing or inactive; nothing was produced.
    Skipped,
    /// An order was stored and announced to `delivered` subscribers.
    Published { order_id: DbId, delivered: usize },
}

/// Run one cycle for `customer_id`.
///
/// The event is published only after the order is stored. The gateway scope
/// is released before publishing.
pub async fn run_cycle(
    customer_id: DbId,
    gateway: &dyn EntityGateway,
    sink: &dyn EventSink,
    amounts: &AmountRange,
) -> Result<CycleOutcome, GatewayError> {
    let mut scope = gateway.scope().await?;

    if !scope.is_eligible(customer_id).await? {
        return Ok(CycleOutcome::Skipped);
    }

    let new_order = NewOrder {
        customer_id,
        description: AUTO_ORDER_DESCRIPTION.to_string(),
        amount: amounts.sample(),
        created_at: chrono::Utc::now(),
    };
    let order = scope.persist(&new_order).await?;
    drop(scope);

    let event = OrderCreated::from(&order);
    let delivered = sink.publish(customer_id, &event).await;

    Ok(CycleOutcome::Published {
        order_id: order.id,
        delivered,
    })
}

/// Worker loop: one cycle now, then one per `ctx.period` until `cancel` fires.
///
/// Cancellation is only observed between cycles. Cycle errors are logged and
/// the loop carries on with the next tick.
pub async fn run(customer_id: DbId, ctx: JobContext, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(ctx.period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!(
        customer_id,
        period_secs = ctx.period.as_secs(),
        "Order job started"
    );

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!(customer_id, "Order job cancelled");
                break;
            }
            _ = interval.tick() => {
                let result = run_cycle(
                    customer_id,
                    ctx.gateway.as_ref(),
                    ctx.sink.as_ref(),
                    &ctx.amounts,
                )
                .await;

                match result {
                    Ok(CycleOutcome::Skipped) => {
                        tracing::debug!(customer_id, "Customer not eligible, cycle skipped");
                    }
                    Ok(CycleOutcome::Published { order_id, delivered }) => {
                        tracing::debug!(customer_id, order_id, delivered, "Order generated");
                    }
                    Err(e) => {
                        tracing::error!(customer_id, error = %e, "Order job cycle failed");
                    }
                }
            }
        }
    }
}
