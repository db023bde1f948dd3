//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ApiConfig;
use crate::services::{NotificationDispatcher, PricingCatalog};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    pool: PgPool,
    pricing: PricingCatalog,
    notifications: NotificationDispatcher,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - API configuration
    /// * `pool` - `PostgreSQL` connection pool
    #[must_use]
    pub fn new(config: ApiConfig, pool: PgPool) -> Self {
        let pricing = PricingCatalog::new(config.pricing_cache_ttl);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                pricing,
                notifications: NotificationDispatcher::new(),
            }),
        }
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get the cached pricing catalog.
    #[must_use]
    pub fn pricing(&self) -> &PricingCatalog {
        &self.inner.pricing
    }

    /// Get the notification dispatcher.
    #[must_use]
    pub fn notifications(&self) -> &NotificationDispatcher {
        &self.inner.notifications
    }
}
