//! Error types for schema parsing, derivation and diffing.

use crate::storage::StorageClass;

/// Errors raised while parsing catalog text, deriving expected schemas, or
/// diffing two table specs.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The catalog returned empty text for a table.
    #[error("cannot construct a table spec from empty schema text")]
    EmptySchema,

    /// The catalog text is not a `CREATE TABLE` statement.
    #[error("'{text}' does not appear to be a valid CREATE TABLE statement")]
    NotCreateTable {
        /// The offending text, whitespace-collapsed.
        text: String,
    },

    /// A column fragment had fewer than the two required tokens.
    #[error("cannot parse '{fragment}' as a column definition")]
    BadColumn {
        /// The offending fragment.
        fragment: String,
    },

    /// A column's declared type does not resolve to a storage class.
    #[error("unrecognized storage class '{token}' in column definition '{fragment}'")]
    UnknownType {
        /// The declared type token.
        token: String,
        /// The fragment it appeared in.
        fragment: String,
    },

    /// More than one column declares `PRIMARY KEY`.
    #[error("schema for table '{table}' contains multiple primary keys")]
    MultiplePrimaryKeys {
        /// The table in question.
        table: String,
    },

    /// A descriptor-supplied identifier failed allow-list validation.
    #[error("'{name}' is not a valid SQL identifier")]
    BadIdentifier {
        /// The rejected identifier.
        name: String,
    },

    /// A default value whose SQL text would corrupt the stored table
    /// definition when read back.
    #[error("default value '{value}' cannot be safely embedded in a column definition")]
    BadDefault {
        /// The rendered default SQL.
        value: String,
    },

    /// Expected and observed columns disagree on storage class. Never
    /// coerced; the whole migration pass must abort.
    #[error(
        "table '{table}' column '{column}' cannot change storage class from {observed} to {expected}"
    )]
    TypeMismatch {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
        /// Storage class the model declares.
        expected: StorageClass,
        /// Storage class found on disk.
        observed: StorageClass,
    },
}
