//! Repository for the `orders` table (append-only).

use orderpulse_core::pagination::PageRequest;
use orderpulse_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::order::{NewOrder, Order, OrderFilter, OrderSummary, PagedResult};

/// Column list for full `orders` rows.
const COLUMNS: &str = "id, customer_id, description, amount, created_at";

/// Shared predicate for the customer listing. `$1` is the customer, `$2..$5`
/// are the optional filters (a NULL bind disables that bound).
const LIST_PREDICATE: &str = "\
    customer_id = $1 \
    AND ($2::timestamptz IS NULL OR created_at >= $2) \
    AND ($3::timestamptz IS NULL OR created_at <= $3) \
    AND ($4::numeric IS NULL OR amount >= $4) \
    AND ($5::numeric IS NULL OR amount <= $5)";

/// Provides insert and query operations for orders.
pub struct OrderRepo;

impl OrderRepo {
    /// Insert an order, returning the stored row with its assigned `id`.
    pub async fn insert(conn: &mut PgConnection, input: &NewOrder) -> Result<Order, sqlx::Error> {
        let query = format!(
            "INSERT INTO orders (customer_id, description, amount, created_at)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Order>(&query)
            .bind(input.customer_id)
            .bind(&input.description)
            .bind(input.amount)
            .bind(input.created_at)
            .fetch_one(&mut *conn)
            .await
    }

    /// List one page of a customer's orders, newest first.
    ///
    /// `total_count` counts every row matching the filters, ignoring paging.
    pub async fn list_for_customer(
        pool: &PgPool,
        customer_id: DbId,
        filter: &OrderFilter,
        page: PageRequest,
    ) -> Result<PagedResult<OrderSummary>, sqlx::Error> {
        let count_query = format!("SELECT COUNT(*) FROM orders WHERE {LIST_PREDICATE}");
        let total_count = sqlx::query_scalar::<_, i64>(&count_query)
            .bind(customer_id)
            .bind(filter.from_date)
            .bind(filter.to_date)
            .bind(filter.min_amount)
            .bind(filter.max_amount)
            .fetch_one(pool)
            .await?;

        let page_query = format!(
            "SELECT id, description, amount, created_at FROM orders \
             WHERE {LIST_PREDICATE} \
             ORDER BY created_at DESC, id DESC \
             LIMIT $6 OFFSET $7"
        );
        let items = sqlx::query_as::<_, OrderSummary>(&page_query)
            .bind(customer_id)
            .bind(filter.from_date)
            .bind(filter.to_date)
            .bind(filter.min_amount)
            .bind(filter.max_amount)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        Ok(PagedResult {
            items,
            total_count,
            page: page.page,
            page_size: page.page_size,
        })
    }
}
