//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods.
//! Most accept `&PgPool` as the first argument; the ones used by the order
//! job take a `&mut PgConnection` so a caller can scope a single pooled
//! connection across several calls.

pub mod customer_repo;
pub mod order_repo;

pub use customer_repo::CustomerRepo;
pub use order_repo::OrderRepo;
