//! Database operations for the mini-app `SQLite` store.
//!
//! # Tables
//!
//! - `catalog_cache` - key→content JSON snapshots (`products`, `categories`),
//!   written wholesale by the external ingestion job
//! - `cart` - per-user cart rows keyed by (user, product)
//! - `orders` - submitted orders with JSON payload and computed total
//! - `subscriptions` - newsletter subscription per user
//! - `wholesale_requests` - wholesale contact requests
//!
//! Queries are runtime-bound (`sqlx::query(...).bind(...)`) because the
//! schema is created at startup and there is no offline prepare step.

pub mod cache;
pub mod cart;
pub mod orders;
pub mod subscriptions;
pub mod wholesale;

use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use thiserror::Error;

pub use cache::{CATEGORIES_KEY, PRODUCTS_KEY, SnapshotRepository};
pub use cart::CartRepository;
pub use orders::OrderRepository;
pub use subscriptions::SubscriptionRepository;
pub use wholesale::WholesaleRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,
}

/// Create a `SQLite` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (e.g., `sqlite://bazaar.db?mode=rwc`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    SqlitePoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url)
        .await
}

/// Create a single-connection in-memory pool with the schema applied.
///
/// `SQLite` gives every connection its own `:memory:` database, so the pool
/// is pinned to one connection that never expires. Used by tests and local
/// tooling.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection or schema setup fails.
pub async fn create_memory_pool() -> Result<SqlitePool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;
    init_schema(&pool).await?;
    Ok(pool)
}

/// Create all tables if they do not exist yet.
///
/// The catalog ingestion bot and this server share the database file; both
/// run this on startup so either can come up first.
///
/// # Errors
///
/// Returns `sqlx::Error` if any statement fails.
pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS catalog_cache (
            key TEXT PRIMARY KEY,
            content TEXT NOT NULL
        )
        ",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS cart (
            user_id INTEGER NOT NULL,
            product_id TEXT NOT NULL,
            quantity INTEGER NOT NULL,
            PRIMARY KEY (user_id, product_id)
        )
        ",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS orders (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            order_data TEXT NOT NULL,
            total_amount REAL NOT NULL,
            status TEXT NOT NULL DEFAULT 'new',
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        ",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS subscriptions (
            user_id INTEGER PRIMARY KEY,
            chat_id INTEGER NOT NULL,
            username TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        ",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS wholesale_requests (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            contact TEXT NOT NULL,
            question TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        ",
    )
    .execute(pool)
    .await?;

    Ok(())
}
