//! Subcommand implementations.

pub mod billing;
pub mod migrate;
pub mod validate;

use thiserror::Error;

/// Errors returned by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Proration could not be computed.
    #[error("Proration error: {0}")]
    Proration(#[from] solace_core::ProrationError),

    /// A field failed validation.
    #[error("invalid {field}: {value}")]
    Invalid { field: &'static str, value: String },
}
