//! Per-customer recurring order jobs.
//!
//! [`JobRegistry`] keeps at most one running job per customer. Each job is a
//! worker task that runs one cycle immediately and then one per period:
//! check eligibility through an [`EntityGateway`], persist a generated order,
//! and publish an `OrderCreated` event through an
//! [`EventSink`](orderpulse_events::EventSink).

pub mod config;
pub mod gateway;
pub mod registry;
pub mod worker;

pub use config::JobConfig;
pub use gateway::{EntityGateway, GatewayError, GatewayScope, PgEntityGateway};
pub use registry::JobRegistry;
pub use worker::CycleOutcome;
