//! Error types for the sync and fix commands.

use std::path::PathBuf;

/// Errors that can occur while reading metadata or migration files.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Schema, provider or model error from the engine.
    #[error(transparent)]
    Core(#[from] colsync_core::Error),

    /// Database error while connecting or reading metadata.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// IO error (reading the schema, reading/writing migration files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A model's table does not exist in the connected database.
    #[error("Table '{table}' for model '{model}' does not exist in the database")]
    TableNotFound {
        /// Model name from the schema.
        model: String,
        /// Physical table name.
        table: String,
    },

    /// A database operation took longer than the configured limit.
    #[error("Database operation timed out after {0}s")]
    Timeout(u64),

    /// No migrations directory found.
    #[error("Migrations directory not found: {0}")]
    MigrationsDirNotFound(PathBuf),

    /// The migrations directory holds no migration.
    #[error("No migrations found in {0}")]
    NoMigrations(PathBuf),

    /// Migration directory already exists.
    #[error("Migration already exists: {0}")]
    MigrationExists(PathBuf),

    /// Serialization error (JSON output).
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;
