//! Subscription repository.
//!
//! One row per subscribed user. The chat id is stored alongside because the
//! broadcast bot needs it to deliver messages; the username is informational.

use sqlx::{Row, SqlitePool};

use bazaar_core::{ChatId, UserId};

use super::RepositoryError;

/// Repository for newsletter subscriptions.
pub struct SubscriptionRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SubscriptionRepository<'a> {
    /// Create a new subscription repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Whether the user is currently subscribed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn is_subscribed(&self, user: UserId) -> Result<bool, RepositoryError> {
        let row = sqlx::query("SELECT 1 AS present FROM subscriptions WHERE user_id = ?")
            .bind(user)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.is_some())
    }

    /// Subscribe the user, updating the chat id and username if re-subscribing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn subscribe(
        &self,
        user: UserId,
        chat: ChatId,
        username: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO subscriptions (user_id, chat_id, username) VALUES (?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                chat_id = excluded.chat_id,
                username = excluded.username
            ",
        )
        .bind(user)
        .bind(chat)
        .bind(username)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Unsubscribe the user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn unsubscribe(&self, user: UserId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM subscriptions WHERE user_id = ?")
            .bind(user)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// All subscriber chat ids (used by the broadcast bot).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn subscriber_chats(&self) -> Result<Vec<ChatId>, RepositoryError> {
        let rows = sqlx::query("SELECT chat_id FROM subscriptions ORDER BY user_id")
            .fetch_all(self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| ChatId::new(row.get("chat_id")))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_pool() -> SqlitePool {
        crate::db::create_memory_pool().await.expect("pool")
    }

    #[tokio::test]
    async fn test_subscribe_toggle_cycle() {
        let pool = test_pool().await;
        let repo = SubscriptionRepository::new(&pool);
        let user = UserId::new(9);

        assert!(!repo.is_subscribed(user).await.expect("check"));

        repo.subscribe(user, ChatId::new(9), "alice").await.expect("subscribe");
        assert!(repo.is_subscribed(user).await.expect("check"));

        repo.unsubscribe(user).await.expect("unsubscribe");
        assert!(!repo.is_subscribed(user).await.expect("check"));
    }

    #[tokio::test]
    async fn test_resubscribe_updates_chat() {
        let pool = test_pool().await;
        let repo = SubscriptionRepository::new(&pool);
        let user = UserId::new(9);

        repo.subscribe(user, ChatId::new(1), "a").await.expect("subscribe");
        repo.subscribe(user, ChatId::new(2), "a").await.expect("resubscribe");

        assert_eq!(repo.subscriber_chats().await.expect("chats"), vec![ChatId::new(2)]);
    }
}
