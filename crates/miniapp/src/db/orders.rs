//! Order repository.
//!
//! Orders are written once at submission with the checkout payload the
//! front end collected and the total computed server-side (cart subtotals
//! plus delivery). Status transitions belong to the operator bot and are out
//! of scope here beyond the stored text column.

use sqlx::{Row, SqlitePool};

use bazaar_core::{OrderId, UserId};

use super::RepositoryError;

/// A stored order row.
#[derive(Debug, Clone)]
pub struct OrderRecord {
    pub id: OrderId,
    pub total_amount: f64,
    pub status: String,
    pub created_at: String,
    pub order_data: serde_json::Value,
}

/// Repository for submitted orders.
pub struct OrderRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Save a new order and return its identifier.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails, or
    /// `DataCorruption` if the payload cannot be serialized.
    pub async fn save(
        &self,
        user: UserId,
        order_data: &serde_json::Value,
        total_amount: f64,
    ) -> Result<OrderId, RepositoryError> {
        let payload = serde_json::to_string(order_data)
            .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;

        let result = sqlx::query(
            "INSERT INTO orders (user_id, order_data, total_amount) VALUES (?, ?, ?)",
        )
        .bind(user)
        .bind(payload)
        .bind(total_amount)
        .execute(self.pool)
        .await?;

        Ok(OrderId::new(result.last_insert_rowid()))
    }

    /// The user's most recent orders, newest first, capped at `limit`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `DataCorruption` if a stored payload is no longer valid JSON.
    pub async fn recent(
        &self,
        user: UserId,
        limit: i64,
    ) -> Result<Vec<OrderRecord>, RepositoryError> {
        let rows = sqlx::query(
            r"
            SELECT id, total_amount, status, created_at, order_data
            FROM orders
            WHERE user_id = ?
            ORDER BY id DESC
            LIMIT ?
            ",
        )
        .bind(user)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let payload: String = row.get("order_data");
                let order_data = serde_json::from_str(&payload).map_err(|e| {
                    RepositoryError::DataCorruption(format!("invalid order payload: {e}"))
                })?;

                Ok(OrderRecord {
                    id: OrderId::new(row.get("id")),
                    total_amount: row.get("total_amount"),
                    status: row.get("status"),
                    created_at: row.get("created_at"),
                    order_data,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_pool() -> SqlitePool {
        crate::db::create_memory_pool().await.expect("pool")
    }

    #[tokio::test]
    async fn test_save_and_recent() {
        let pool = test_pool().await;
        let repo = OrderRepository::new(&pool);
        let user = UserId::new(5);

        let payload = serde_json::json!({"address": "Main st 1", "phone": "+100"});
        let first = repo.save(user, &payload, 1500.0).await.expect("save");
        let second = repo.save(user, &payload, 300.0).await.expect("save");
        assert_ne!(first, second);

        let orders = repo.recent(user, 20).await.expect("recent");
        assert_eq!(orders.len(), 2);
        // Newest first
        assert_eq!(orders[0].id, second);
        assert!((orders[0].total_amount - 300.0).abs() < f64::EPSILON);
        assert_eq!(orders[0].status, "new");
        assert_eq!(orders[1].order_data, payload);
    }

    #[tokio::test]
    async fn test_recent_respects_limit_and_user() {
        let pool = test_pool().await;
        let repo = OrderRepository::new(&pool);

        for i in 0..25 {
            repo.save(UserId::new(1), &serde_json::json!({"n": i}), 1.0)
                .await
                .expect("save");
        }
        repo.save(UserId::new(2), &serde_json::json!({}), 1.0)
            .await
            .expect("save");

        let orders = repo.recent(UserId::new(1), 20).await.expect("recent");
        assert_eq!(orders.len(), 20);
        assert!(orders.iter().all(|o| o.order_data["n"].is_number()));
    }
}
