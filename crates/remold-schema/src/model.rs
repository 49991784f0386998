//! Model descriptors and expected-schema derivation.
//!
//! The expected side of a migration pass comes from an explicitly
//! constructed [`ModelRegistry`], not from any runtime reflection: the host
//! application registers one [`ModelSpec`] per table at startup and hands
//! the registry to the migrator. The registry owns its models in
//! registration order, which is also the order tables migrate in.

use serde::{Deserialize, Serialize};

use crate::column::ColumnSpec;
use crate::error::SchemaError;
use crate::ident::validate_identifier;
use crate::storage::StorageClass;
use crate::table::TableSpec;

/// Field types a model descriptor may declare.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldType {
    /// Small integer.
    SmallInt,
    /// Integer.
    Integer,
    /// Big integer.
    BigInt,
    /// Boolean, stored as 0/1.
    Boolean,
    /// Date/time, stored as a unix timestamp.
    DateTime,
    /// Single-precision float.
    Float,
    /// Double-precision float.
    Double,
    /// String.
    Text,
    /// Single character or short string.
    Char,
    /// Binary data.
    Blob,
    /// Reference to another model's identity column, stored as its integer
    /// key.
    ForeignKey {
        /// Referenced table name.
        table: String,
        /// Referenced column name.
        column: String,
    },
}

impl FieldType {
    /// Storage class this field type maps to.
    #[must_use]
    pub fn storage_class(&self) -> StorageClass {
        match self {
            Self::SmallInt
            | Self::Integer
            | Self::BigInt
            | Self::Boolean
            | Self::DateTime
            | Self::ForeignKey { .. } => StorageClass::Integer,
            Self::Float | Self::Double => StorageClass::Real,
            Self::Text | Self::Char => StorageClass::Text,
            Self::Blob => StorageClass::Blob,
        }
    }
}

/// Default value for a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DefaultValue {
    /// NULL default.
    Null,
    /// Boolean default, rendered as 0/1.
    Bool(bool),
    /// Integer default.
    Integer(i64),
    /// Float default.
    Float(f64),
    /// String default, single-quoted with quotes escaped.
    String(String),
    /// Raw SQL expression such as `CURRENT_TIMESTAMP`.
    Expression(String),
}

impl DefaultValue {
    /// Renders the SQL text of this default.
    #[must_use]
    pub fn to_sql(&self) -> String {
        match self {
            Self::Null => "NULL".to_string(),
            Self::Bool(b) => if *b { "1" } else { "0" }.to_string(),
            Self::Integer(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::String(s) => format!("'{}'", s.replace('\'', "''")),
            Self::Expression(expr) => expr.clone(),
        }
    }
}

/// Conflict resolution action for `NOT NULL` and `UNIQUE` constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConflictAction {
    /// Roll back the enclosing transaction.
    Rollback,
    /// Abort the statement.
    Abort,
    /// Fail the statement, keeping prior changes.
    Fail,
    /// Skip the conflicting row.
    Ignore,
    /// Replace the conflicting row.
    Replace,
}

impl ConflictAction {
    /// Returns the SQL keyword for this action.
    #[must_use]
    pub fn to_sql(self) -> &'static str {
        match self {
            Self::Rollback => "ROLLBACK",
            Self::Abort => "ABORT",
            Self::Fail => "FAIL",
            Self::Ignore => "IGNORE",
            Self::Replace => "REPLACE",
        }
    }
}

/// Foreign key action for `ON DELETE` / `ON UPDATE` clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ForeignKeyAction {
    /// No action.
    #[default]
    NoAction,
    /// Restrict.
    Restrict,
    /// Cascade to referencing rows.
    Cascade,
    /// Set the referencing column to NULL.
    SetNull,
    /// Set the referencing column to its default.
    SetDefault,
}

impl ForeignKeyAction {
    /// Returns the SQL text for this action.
    #[must_use]
    pub fn to_sql(self) -> &'static str {
        match self {
            Self::NoAction => "NO ACTION",
            Self::Restrict => "RESTRICT",
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
            Self::SetDefault => "SET DEFAULT",
        }
    }
}

/// One column of a model, declared through the builder API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Column name.
    pub name: String,
    /// Declared field type.
    pub field_type: FieldType,
    /// Optional length qualifier.
    pub length: Option<usize>,
    /// Whether this is the identity column.
    pub primary_key: bool,
    /// Whether the identity column auto-increments.
    pub auto_increment: bool,
    /// NOT NULL constraint.
    pub not_null: bool,
    /// ON CONFLICT action for the NOT NULL constraint.
    pub not_null_conflict: Option<ConflictAction>,
    /// UNIQUE constraint.
    pub unique: bool,
    /// ON CONFLICT action for the UNIQUE constraint.
    pub unique_conflict: Option<ConflictAction>,
    /// Default value.
    pub default: Option<DefaultValue>,
    /// ON DELETE action (foreign keys only).
    pub on_delete: Option<ForeignKeyAction>,
    /// ON UPDATE action (foreign keys only).
    pub on_update: Option<ForeignKeyAction>,
}

impl FieldSpec {
    /// Creates a plain field with no constraints.
    #[must_use]
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            length: None,
            primary_key: false,
            auto_increment: false,
            not_null: false,
            not_null_conflict: None,
            unique: false,
            unique_conflict: None,
            default: None,
            on_delete: None,
            on_update: None,
        }
    }

    /// Sets a length qualifier.
    #[must_use]
    pub fn length(mut self, length: usize) -> Self {
        self.length = Some(length);
        self
    }

    /// Marks this field as the identity column.
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Makes the identity column auto-increment.
    #[must_use]
    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    /// Adds a NOT NULL constraint.
    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    /// Sets the ON CONFLICT action for NOT NULL.
    #[must_use]
    pub fn not_null_conflict(mut self, action: ConflictAction) -> Self {
        self.not_null = true;
        self.not_null_conflict = Some(action);
        self
    }

    /// Adds a UNIQUE constraint.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Sets the ON CONFLICT action for UNIQUE.
    #[must_use]
    pub fn unique_conflict(mut self, action: ConflictAction) -> Self {
        self.unique = true;
        self.unique_conflict = Some(action);
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn default(mut self, value: DefaultValue) -> Self {
        self.default = Some(value);
        self
    }

    /// Sets the ON DELETE action for a foreign key field.
    #[must_use]
    pub fn on_delete(mut self, action: ForeignKeyAction) -> Self {
        self.on_delete = Some(action);
        self
    }

    /// Sets the ON UPDATE action for a foreign key field.
    #[must_use]
    pub fn on_update(mut self, action: ForeignKeyAction) -> Self {
        self.on_update = Some(action);
        self
    }

    /// Renders the SQL column-definition fragment for this field.
    ///
    /// All identifiers are validated before interpolation; they are never
    /// bound as parameters.
    pub(crate) fn definition(&self) -> Result<String, SchemaError> {
        validate_identifier(&self.name)?;

        let mut def = format!("{} {}", self.name, self.field_type.storage_class().sql_name());
        if let Some(length) = self.length {
            def.push_str(&format!("({length})"));
        }
        if self.primary_key {
            def.push_str(" PRIMARY KEY");
            if self.auto_increment {
                def.push_str(" AUTOINCREMENT");
            }
        }
        if self.not_null {
            def.push_str(" NOT NULL");
            if let Some(action) = self.not_null_conflict {
                def.push_str(&format!(" ON CONFLICT {}", action.to_sql()));
            }
        }
        if self.unique {
            def.push_str(" UNIQUE");
            if let Some(action) = self.unique_conflict {
                def.push_str(&format!(" ON CONFLICT {}", action.to_sql()));
            }
        }
        if let Some(default) = &self.default {
            let value = default.to_sql();
            validate_default_sql(&value)?;
            def.push_str(&format!(" DEFAULT {value}"));
        }
        if let FieldType::ForeignKey { table, column } = &self.field_type {
            validate_identifier(table)?;
            validate_identifier(column)?;
            def.push_str(&format!(" REFERENCES {table}({column})"));
            if let Some(action) = self.on_delete {
                def.push_str(&format!(" ON DELETE {}", action.to_sql()));
            }
            if let Some(action) = self.on_update {
                def.push_str(&format!(" ON UPDATE {}", action.to_sql()));
            }
        }

        Ok(def)
    }
}

/// Checks that a rendered default can be re-read out of the catalog.
///
/// The column splitter is not quote- or paren-aware, so a comma anywhere in
/// the default text would cut the stored definition in two on the next
/// pass. Unbalanced parens or an odd quote count would likewise corrupt the
/// outer-paren scan.
fn validate_default_sql(value: &str) -> Result<(), SchemaError> {
    let mut depth: u32 = 0;
    let mut quotes: usize = 0;
    for c in value.chars() {
        match c {
            ',' => {
                return Err(SchemaError::BadDefault {
                    value: value.to_string(),
                })
            }
            '\'' => quotes += 1,
            '(' => depth += 1,
            ')' => {
                let Some(next) = depth.checked_sub(1) else {
                    return Err(SchemaError::BadDefault {
                        value: value.to_string(),
                    });
                };
                depth = next;
            }
            _ => {}
        }
    }
    if depth != 0 || quotes % 2 != 0 {
        return Err(SchemaError::BadDefault {
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Declarative description of one model-backed table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Table name.
    pub table: String,
    /// Fields in declaration order.
    pub fields: Vec<FieldSpec>,
}

impl ModelSpec {
    /// Creates an empty model for the given table.
    #[must_use]
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            fields: Vec::new(),
        }
    }

    /// Adds a field.
    #[must_use]
    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Adds the conventional auto-increment integer identity column.
    #[must_use]
    pub fn identity(self, name: impl Into<String>) -> Self {
        self.field(
            FieldSpec::new(name, FieldType::BigInt)
                .primary_key()
                .auto_increment(),
        )
    }

    /// Derives the expected [`TableSpec`] for this model without touching
    /// the database.
    ///
    /// Each field renders to a definition fragment and goes through the
    /// same parser as catalog text, so both diff sides share one
    /// structural shape.
    pub fn expected_schema(&self) -> Result<TableSpec, SchemaError> {
        validate_identifier(&self.table)?;
        let mut columns = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            columns.push(ColumnSpec::parse(&field.definition()?)?);
        }
        TableSpec::from_columns(self.table.clone(), columns)
    }
}

/// Explicitly constructed, ordered collection of model descriptors.
///
/// Owned by whoever drives the migration pass. There is no global registry
/// and no lazy initialization; build it, hand it to the migrator, drop it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelRegistry {
    models: Vec<ModelSpec>,
}

impl ModelRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a model (builder form).
    #[must_use]
    pub fn model(mut self, model: ModelSpec) -> Self {
        self.models.push(model);
        self
    }

    /// Adds a model.
    pub fn register(&mut self, model: ModelSpec) {
        self.models.push(model);
    }

    /// Models in registration order.
    pub fn models(&self) -> impl Iterator<Item = &ModelSpec> {
        self.models.iter()
    }

    /// Looks up a model by case-insensitive table name.
    #[must_use]
    pub fn get(&self, table: &str) -> Option<&ModelSpec> {
        self.models
            .iter()
            .find(|m| m.table.eq_ignore_ascii_case(table))
    }

    /// Number of registered models.
    #[must_use]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
