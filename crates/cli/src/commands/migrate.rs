//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! solace-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `SOLACE_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! Migrations live in `crates/api/migrations/` and are embedded into the
//! binary at build time.

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;

use super::CliError;

/// Run the API database migrations.
///
/// # Errors
///
/// Returns `CliError` if the database URL is missing, the connection fails,
/// or a migration fails.
pub async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let database_url = database_url()?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    tracing::info!("Running migrations...");
    solace_api::db::MIGRATOR.run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}

fn database_url() -> Result<SecretString, CliError> {
    std::env::var("SOLACE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CliError::MissingEnvVar("SOLACE_DATABASE_URL"))
}
