//! Repository for the `customers` table.

use orderpulse_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::customer::{CreateCustomer, Customer, UpdateCustomer};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, email, is_active, created_at";

/// Provides CRUD operations for customers.
pub struct CustomerRepo;

impl CustomerRepo {
    /// Insert a new customer, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateCustomer) -> Result<Customer, sqlx::Error> {
        let query = format!(
            "INSERT INTO customers (name, email, is_active)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Customer>(&query)
            .bind(input.name.trim())
            .bind(input.email.trim())
            .bind(input.is_active)
            .fetch_one(pool)
            .await
    }

    /// List all customers, most recently created first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Customer>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM customers ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Customer>(&query).fetch_all(pool).await
    }

    /// Find a customer by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Customer>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM customers WHERE id = $1");
        sqlx::query_as::<_, Customer>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Replace a customer's editable fields.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCustomer,
    ) -> Result<Option<Customer>, sqlx::Error> {
        let query = format!(
            "UPDATE customers SET
                name = $2,
                email = $3,
                is_active = $4
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Customer>(&query)
            .bind(id)
            .bind(input.name.trim())
            .bind(input.email.trim())
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete a customer (orders cascade). Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// IDs of every customer, oldest first. Used to re-arm jobs at boot.
    pub async fn list_ids(pool: &PgPool) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>("SELECT id FROM customers ORDER BY id")
            .fetch_all(pool)
            .await
    }

    /// Whether the customer exists and is flagged active.
    ///
    /// Always reads the current row; callers must not cache the answer.
    pub async fn is_active(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM customers WHERE id = $1 AND is_active)",
        )
        .bind(id)
        .fetch_one(&mut *conn)
        .await
    }
}
