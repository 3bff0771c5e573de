//! Storage access used by a job cycle.
//!
//! A cycle opens one [`GatewayScope`] through [`EntityGateway::scope`], uses
//! it for the eligibility check and the insert, and drops it when the cycle
//! ends. Dropping the scope releases whatever it holds (a pooled connection
//! for [`PgEntityGateway`]), whichever path the cycle took.

use async_trait::async_trait;
use orderpulse_core::types::DbId;
use orderpulse_db::models::order::{NewOrder, Order};
use orderpulse_db::repositories::{CustomerRepo, OrderRepo};
use orderpulse_db::DbPool;
use sqlx::pool::PoolConnection;
use sqlx::Postgres;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Gateway unavailable: {0}")]
    Unavailable(String),
}

/// Opens per-cycle storage scopes.
#[async_trait]
pub trait EntityGateway: Send + Sync {
    async fn scope(&self) -> Result<Box<dyn GatewayScope>, GatewayError>;
}

/// Storage operations available within one cycle.
#[async_trait]
pub trait GatewayScope: Send {
    /// Whether the customer exists and is active. Read fresh on every call.
    async fn is_eligible(&mut self, customer_id: DbId) -> Result<bool, GatewayError>;

    /// Insert an order and return the stored row.
    async fn persist(&mut self, order: &NewOrder) -> Result<Order, GatewayError>;
}

/// Postgres-backed gateway. Each scope holds one pooled connection.
#[derive(Clone)]
pub struct PgEntityGateway {
    pool: DbPool,
}

impl PgEntityGateway {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntityGateway for PgEntityGateway {
    async fn scope(&self) -> Result<Box<dyn GatewayScope>, GatewayError> {
        let conn = self.pool.acquire().await?;
        Ok(Box::new(PgGatewayScope { conn }))
    }
}

/// Returned to the pool when dropped.
struct PgGatewayScope {
    conn: PoolConnection<Postgres>,
}

#[async_trait]
impl GatewayScope for PgGatewayScope {
    async fn is_eligible(&mut self, customer_id: DbId) -> Result<bool, GatewayError> {
        Ok(CustomerRepo::is_active(&mut *self.conn, customer_id).await?)
    }

    async fn persist(&mut self, order: &NewOrder) -> Result<Order, GatewayError> {
        Ok(OrderRepo::insert(&mut *self.conn, order).await?)
    }
}
