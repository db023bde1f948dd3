//! Database operations for the Solace `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `profiles` - Clients, therapists and admins
//! - `messages` - Two-party message threads keyed by conversation ID
//! - `notifications` - In-app notification feed
//! - `therapy_sessions` - Scheduled sessions (calendar)
//! - `documents` - Document metadata (files live in object storage)
//! - `feedback` - Session and service ratings
//! - `workshops`, `workshop_registrations` - Group workshops
//! - `pricing_plans`, `subscriptions`, `payments` - Billing
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p solace-cli -- migrate
//! ```

pub mod billing;
pub mod calendar;
pub mod content;
pub mod messages;
pub mod notifications;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use billing::{PaymentRepository, PricingRepository, SubscriptionRepository};
pub use calendar::SessionRepository;
pub use content::{DocumentRepository, FeedbackRepository, WorkshopRepository};
pub use messages::MessageRepository;
pub use notifications::NotificationRepository;

/// Migrations embedded from `crates/api/migrations/`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

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

    /// Constraint violation (e.g., duplicate registration).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map unique and foreign-key violations to `Conflict`, everything else
    /// to `Database`.
    pub(crate) fn from_write(err: sqlx::Error, conflict: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && (db_err.is_unique_violation() || db_err.is_foreign_key_violation())
        {
            return Self::Conflict(conflict.to_owned());
        }
        Self::Database(err)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
