//! Order repository.

use chrono::Utc;
use sqlx::{Row, sqlite::SqliteRow};

use stockroom_core::OrderId;

use super::{DbPool, RepositoryError, decode_decimal, decode_timestamp};
use crate::models::{NewOrder, Order, OrderItem};

/// Repository for the `orders` collection.
pub struct OrderRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Insert a new order and return the stored record.
    ///
    /// The identifier and both timestamps are assigned here; the caller has
    /// already resolved item prices and the snapshot total. A single insert
    /// keeps creation all-or-nothing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(&self, new: NewOrder) -> Result<Order, RepositoryError> {
        let id = OrderId::generate();
        let now = Utc::now();
        let items = serde_json::to_string(&new.items)
            .map_err(|e| RepositoryError::Decode(format!("failed to encode items: {e}")))?;

        sqlx::query(
            "INSERT INTO orders (id, user_id, items, total, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(&new.user_id)
        .bind(items)
        .bind(new.total.to_string())
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(self.pool)
        .await?;

        Ok(Order {
            id,
            user_id: new.user_id,
            items: new.items,
            total: new.total,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get an order by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::Decode` if the stored row is malformed.
    pub async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, user_id, items, total, created_at, updated_at
             FROM orders WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(ref r) => Ok(Some(row_to_order(r)?)),
            None => Ok(None),
        }
    }

    /// List a user's orders in insertion order.
    ///
    /// A user with no orders yields an empty vector, not an error.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::Decode` if a stored row is malformed.
    pub async fn list_for_user(
        &self,
        user_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, user_id, items, total, created_at, updated_at
             FROM orders WHERE user_id = ?
             ORDER BY rowid LIMIT ? OFFSET ?",
        )
        .bind(user_id)
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(self.pool)
        .await?;

        rows.iter().map(row_to_order).collect()
    }
}

fn row_to_order(row: &SqliteRow) -> Result<Order, RepositoryError> {
    let raw_id: String = row.try_get("id")?;
    let id = raw_id
        .parse::<OrderId>()
        .map_err(|e| RepositoryError::Decode(format!("invalid order id `{raw_id}`: {e}")))?;

    let items: String = row.try_get("items")?;
    let items: Vec<OrderItem> = serde_json::from_str(&items)
        .map_err(|e| RepositoryError::Decode(format!("invalid items document: {e}")))?;

    let total: String = row.try_get("total")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(Order {
        id,
        user_id: row.try_get("user_id")?,
        items,
        total: decode_decimal("total", &total)?,
        created_at: decode_timestamp("created_at", &created_at)?,
        updated_at: decode_timestamp("updated_at", &updated_at)?,
    })
}
