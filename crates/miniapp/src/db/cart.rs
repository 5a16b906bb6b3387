//! Cart repository.
//!
//! Cart rows are keyed by (user, product). `add` is deliberately a
//! single-unit increment: the "add N units" API operation is defined as N
//! sequential calls, a contract callers rely on when the accessor enforces
//! per-call limits or logging.

use sqlx::{Row, SqlitePool};

use bazaar_core::UserId;

use super::RepositoryError;

/// Repository for per-user cart rows.
pub struct CartRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Add a single unit of a product to the user's cart.
    ///
    /// Creates the row with quantity 1, or increments an existing row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn add(&self, user: UserId, product_id: &str) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO cart (user_id, product_id, quantity) VALUES (?, ?, 1)
            ON CONFLICT(user_id, product_id) DO UPDATE SET quantity = quantity + 1
            ",
        )
        .bind(user)
        .bind(product_id)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Remove a product from the user's cart entirely.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn remove(&self, user: UserId, product_id: &str) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM cart WHERE user_id = ? AND product_id = ?")
            .bind(user)
            .bind(product_id)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Set the quantity of a product in the user's cart.
    ///
    /// A quantity of zero or less deletes the row, keeping the invariant
    /// that stored rows always have quantity >= 1.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn set_quantity(
        &self,
        user: UserId,
        product_id: &str,
        quantity: i64,
    ) -> Result<(), RepositoryError> {
        if quantity <= 0 {
            return self.remove(user, product_id).await;
        }

        sqlx::query(
            r"
            INSERT INTO cart (user_id, product_id, quantity) VALUES (?, ?, ?)
            ON CONFLICT(user_id, product_id) DO UPDATE SET quantity = excluded.quantity
            ",
        )
        .bind(user)
        .bind(product_id)
        .bind(quantity)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// List the user's cart as (product id, quantity) pairs.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user: UserId) -> Result<Vec<(String, i64)>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT product_id, quantity FROM cart WHERE user_id = ? ORDER BY product_id",
        )
        .bind(user)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| (row.get("product_id"), row.get("quantity")))
            .collect())
    }

    /// Clear the user's cart entirely (used after order submission).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn clear(&self, user: UserId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM cart WHERE user_id = ?")
            .bind(user)
            .execute(self.pool)
            .await?;

        Ok(())
    }
}
