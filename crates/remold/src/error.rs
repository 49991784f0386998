//! Error types for the migration executor.

use remold_schema::SchemaError;

/// Errors surfaced by a migration pass.
///
/// Every variant is fatal to the pass: the enclosing transaction rolls back
/// and neither the catalog nor `user_version` changes.
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    /// Schema parsing, derivation or diffing failed.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The database rejected a statement.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;
