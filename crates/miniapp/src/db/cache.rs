//! Catalog snapshot cache repository.
//!
//! The external ingestion job refreshes the upstream catalog and stores each
//! snapshot as a single serialized JSON array under a fixed key. This
//! repository is the only reader; an absent row is the normal state before
//! the first ingestion run and is reported as `None`, never as an error.

use sqlx::{Row, SqlitePool};

use bazaar_core::Product;

use super::RepositoryError;

/// Cache key for the product snapshot.
pub const PRODUCTS_KEY: &str = "products";

/// Cache key for the category snapshot.
pub const CATEGORIES_KEY: &str = "categories";

/// Repository for the `catalog_cache` key→content table.
pub struct SnapshotRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SnapshotRepository<'a> {
    /// Create a new snapshot repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Read a snapshot by key and decode it as a JSON array.
    ///
    /// Returns `Ok(None)` when no row exists for the key (ingestion has not
    /// run yet).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored content is not
    /// a valid JSON array.
    pub async fn read(
        &self,
        key: &str,
    ) -> Result<Option<Vec<serde_json::Value>>, RepositoryError> {
        let row = sqlx::query("SELECT content FROM catalog_cache WHERE key = ?")
            .bind(key)
            .fetch_optional(self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let content: String = row.get("content");
        let value: serde_json::Value = serde_json::from_str(&content).map_err(|e| {
            RepositoryError::DataCorruption(format!("snapshot '{key}' is not valid JSON: {e}"))
        })?;

        match value {
            serde_json::Value::Array(items) => Ok(Some(items)),
            other => Err(RepositoryError::DataCorruption(format!(
                "snapshot '{key}' is not a JSON array (got {})",
                json_type_name(&other)
            ))),
        }
    }

    /// Read the product snapshot as typed [`Product`] records.
    ///
    /// # Errors
    ///
    /// Same as [`read`](Self::read); additionally `DataCorruption` if an
    /// entry does not deserialize as a product.
    pub async fn read_products(&self) -> Result<Option<Vec<Product>>, RepositoryError> {
        let Some(items) = self.read(PRODUCTS_KEY).await? else {
            return Ok(None);
        };

        let products = items
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Product>, _>>()
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid product in snapshot: {e}"))
            })?;

        Ok(Some(products))
    }

    /// Replace a snapshot wholesale.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails, or
    /// `DataCorruption` if the items cannot be serialized.
    pub async fn write(
        &self,
        key: &str,
        items: &[serde_json::Value],
    ) -> Result<(), RepositoryError> {
        let content = serde_json::to_string(items)
            .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;

        sqlx::query(
            r"
            INSERT INTO catalog_cache (key, content) VALUES (?, ?)
            ON CONFLICT(key) DO UPDATE SET content = excluded.content
            ",
        )
        .bind(key)
        .bind(content)
        .execute(self.pool)
        .await?;

        Ok(())
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_pool() -> SqlitePool {
        crate::db::create_memory_pool().await.expect("pool")
    }

    #[tokio::test]
    async fn test_read_missing_snapshot_is_none() {
        let pool = test_pool().await;
        let repo = SnapshotRepository::new(&pool);
        let result = repo.read(PRODUCTS_KEY).await.expect("read");
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_write_read_roundtrip_preserves_order() {
        let pool = test_pool().await;
        let repo = SnapshotRepository::new(&pool);

        let items = vec![
            serde_json::json!({"id": "b", "name": "Second"}),
            serde_json::json!({"id": "a", "name": "First"}),
            serde_json::json!({"id": "c", "name": "Third"}),
        ];
        repo.write(PRODUCTS_KEY, &items).await.expect("write");

        let back = repo.read(PRODUCTS_KEY).await.expect("read").expect("some");
        assert_eq!(back, items);
    }

    #[tokio::test]
    async fn test_write_replaces_wholesale() {
        let pool = test_pool().await;
        let repo = SnapshotRepository::new(&pool);

        repo.write(CATEGORIES_KEY, &[serde_json::json!({"id": 1})])
            .await
            .expect("write");
        repo.write(CATEGORIES_KEY, &[serde_json::json!({"id": 2})])
            .await
            .expect("rewrite");

        let back = repo
            .read(CATEGORIES_KEY)
            .await
            .expect("read")
            .expect("some");
        assert_eq!(back, vec![serde_json::json!({"id": 2})]);
    }

    #[tokio::test]
    async fn test_read_invalid_json_is_data_corruption() {
        let pool = test_pool().await;
        sqlx::query("INSERT INTO catalog_cache (key, content) VALUES ('products', 'not json')")
            .execute(&pool)
            .await
            .expect("insert");

        let repo = SnapshotRepository::new(&pool);
        let err = repo.read(PRODUCTS_KEY).await.expect_err("should fail");
        assert!(matches!(err, RepositoryError::DataCorruption(_)));
    }

    #[tokio::test]
    async fn test_read_non_array_is_data_corruption() {
        let pool = test_pool().await;
        sqlx::query(r#"INSERT INTO catalog_cache (key, content) VALUES ('products', '{"a":1}')"#)
            .execute(&pool)
            .await
            .expect("insert");

        let repo = SnapshotRepository::new(&pool);
        let err = repo.read(PRODUCTS_KEY).await.expect_err("should fail");
        assert!(matches!(err, RepositoryError::DataCorruption(_)));
    }

    #[tokio::test]
    async fn test_read_products_typed() {
        let pool = test_pool().await;
        let repo = SnapshotRepository::new(&pool);

        let items = vec![
            serde_json::json!({"id": "p1", "name": "Tea", "price": "120", "description": "leaf", "pictures": []}),
            serde_json::json!({"id": 2, "name": "Mug", "price": "bad", "description": "", "pictures": ["u"]}),
        ];
        repo.write(PRODUCTS_KEY, &items).await.expect("write");

        let products = repo
            .read_products()
            .await
            .expect("read")
            .expect("some");
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].key(), "p1");
        assert_eq!(products[1].key(), "2");
        assert_eq!(products[1].parsed_price(), None);
    }
}
