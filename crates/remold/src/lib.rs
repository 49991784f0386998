//! Automatic, data-preserving schema migrations for embedded SQLite.
//!
//! Given a live database and a [`ModelRegistry`](remold_schema::ModelRegistry)
//! describing what the application's tables should look like, a
//! [`Migrator`](executor::Migrator) reconciles the two in one pass:
//!
//! - a table the catalog does not know is created fresh,
//! - a table whose observed schema already matches is skipped,
//! - a purely additive difference becomes `ALTER TABLE ADD COLUMN`
//!   statements,
//! - anything structural goes through a rename-create-copy-drop rebuild
//!   that carries existing row data across.
//!
//! The whole pass runs inside a single transaction and finishes by stamping
//! `PRAGMA user_version`; any error rolls everything back, so the database
//! is only ever observed fully migrated or fully untouched.
//!
//! ```rust,ignore
//! use remold::prelude::*;
//!
//! let registry = ModelRegistry::new().model(
//!     ModelSpec::new("notes")
//!         .identity("id")
//!         .field(FieldSpec::new("title", FieldType::Text).not_null())
//!         .field(FieldSpec::new("stars", FieldType::Double)),
//! );
//!
//! let report = Migrator::new(pool, registry, 2).run().await?;
//! ```
//!
//! The caller owns the connection exclusively for the duration of the pass;
//! migration runs synchronously during database open, before the handle is
//! shared.

pub mod catalog;
pub mod error;
pub mod executor;
pub mod value;

pub use error::{MigrateError, Result};
pub use executor::{MigrationReport, Migrator, TableOutcome};
pub use value::SqlValue;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{MigrateError, Result};
    pub use crate::executor::{MigrationReport, Migrator, TableOutcome};
    pub use remold_schema::{
        ColumnSpec, ConflictAction, DefaultValue, FieldSpec, FieldType, ForeignKeyAction,
        ModelRegistry, ModelSpec, SchemaDiff, SchemaError, StorageClass, TableSpec,
    };
}
