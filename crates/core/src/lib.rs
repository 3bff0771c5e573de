pub mod error;
pub mod order_generation;
pub mod pagination;
pub mod types;
pub mod validation;
