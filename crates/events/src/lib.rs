//! Real-time notification building blocks.
//!
//! - [`OrderCreated`]: the event pushed to subscribers when a customer job
//!   persists an order.
//! - [`EventSink`]: delivery of an event to every subscriber of a customer.
//! - [`SubscriptionGroups`]: per-customer connection membership used by
//!   sink implementations to decide who receives what.

pub mod event;
pub mod groups;
pub mod sink;

pub use event::OrderCreated;
pub use groups::SubscriptionGroups;
pub use sink::EventSink;
