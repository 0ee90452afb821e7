//! Error types for the reconciliation engine.

/// Errors raised by the core engine.
///
/// Columns the engine merely encounters (for example an `ADD COLUMN` for a
/// field the schema does not declare yet) are skipped, never reported here.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The schema targets a database other than MySQL/MariaDB.
    #[error("Unsupported database provider '{provider}' (supported: {supported})")]
    UnsupportedProvider {
        /// Provider string found in the schema.
        provider: String,
        /// Comma-separated list of supported providers.
        supported: String,
    },

    /// An explicitly requested model does not exist in the schema.
    #[error("Model '{0}' not found in schema")]
    ModelNotFound(String),

    /// The schema file could not be read cleanly.
    #[error("Invalid schema:\n{}", .0.iter().map(|e| format!("  - {e}")).collect::<Vec<_>>().join("\n"))]
    InvalidSchema(Vec<String>),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;
