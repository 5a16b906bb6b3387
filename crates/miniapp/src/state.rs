//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::MiniAppConfig;
use crate::services::{AssistantClient, AssistantError, Notifier, NotifyError, Recommender};

/// Error creating application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("assistant client: {0}")]
    Assistant(#[from] AssistantError),
    #[error("telegram notifier: {0}")]
    Notifier(#[from] NotifyError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: MiniAppConfig,
    pool: SqlitePool,
    recommender: Recommender<AssistantClient>,
    notifier: Notifier,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the assistant or Telegram HTTP clients cannot
    /// be built from the configuration.
    pub fn new(config: MiniAppConfig, pool: SqlitePool) -> Result<Self, StateError> {
        let recommender = Recommender::new(AssistantClient::new(&config.assistant)?);
        let notifier = Notifier::new(&config.telegram)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                recommender,
                notifier,
            }),
        })
    }

    /// Get a reference to the application configuration.
    #[must_use]
    pub fn config(&self) -> &MiniAppConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.inner.pool
    }

    /// Get a reference to the recommendation orchestrator.
    #[must_use]
    pub fn recommender(&self) -> &Recommender<AssistantClient> {
        &self.inner.recommender
    }

    /// Get a reference to the Telegram notifier.
    #[must_use]
    pub fn notifier(&self) -> &Notifier {
        &self.inner.notifier
    }
}
