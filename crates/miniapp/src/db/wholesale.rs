//! Wholesale request repository.

use sqlx::SqlitePool;

use bazaar_core::{RequestId, UserId};

use super::RepositoryError;

/// Repository for wholesale contact requests.
pub struct WholesaleRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> WholesaleRepository<'a> {
    /// Create a new wholesale repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Save a wholesale request and return its identifier.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn save(
        &self,
        user: UserId,
        name: &str,
        contact: &str,
        question: &str,
    ) -> Result<RequestId, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO wholesale_requests (user_id, name, contact, question) VALUES (?, ?, ?, ?)",
        )
        .bind(user)
        .bind(name)
        .bind(contact)
        .bind(question)
        .execute(self.pool)
        .await?;

        Ok(RequestId::new(result.last_insert_rowid()))
    }
}
