//! Schema parsing, model descriptors and diffing for remold automigrations.
//!
//! This crate is the database-free half of remold. It knows how to:
//!
//! - parse the verbatim `CREATE TABLE` text stored in SQLite's schema
//!   catalog into a structured [`TableSpec`] (the *observed* schema),
//! - derive the [`TableSpec`] a registered model *should* have from an
//!   explicitly constructed [`ModelRegistry`] (the *expected* schema),
//! - compute a [`SchemaDiff`] between the two and classify it as empty,
//!   safely additive, or structural.
//!
//! Executing the resulting migration is the `remold` crate's job; nothing
//! here touches a database.

pub mod column;
pub mod diff;
pub mod error;
pub mod ident;
pub mod model;
pub mod storage;
pub mod table;

pub use column::ColumnSpec;
pub use diff::{ColumnChange, SchemaDiff};
pub use error::SchemaError;
pub use ident::validate_identifier;
pub use model::{
    ConflictAction, DefaultValue, FieldSpec, FieldType, ForeignKeyAction, ModelRegistry, ModelSpec,
};
pub use storage::StorageClass;
pub use table::TableSpec;
