//! `CREATE TABLE` parsing and reconstruction.

use serde::{Deserialize, Serialize};

use crate::column::{strip_quotes, ColumnSpec};
use crate::error::SchemaError;

/// A full table definition: name plus ordered columns.
///
/// Built either by parsing the verbatim statement SQLite's schema catalog
/// stores for a table (the observed side) or from a model descriptor via
/// [`ModelSpec::expected_schema`](crate::model::ModelSpec::expected_schema)
/// (the expected side). Column order is declaration order and is preserved
/// for reconstruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSpec {
    /// Table name, quote characters stripped.
    pub name: String,
    /// Columns in declaration order.
    pub columns: Vec<ColumnSpec>,
    /// Verbatim catalog text, present only when parsed from the catalog.
    pub source: Option<String>,
}

impl TableSpec {
    /// Assembles a spec from pre-parsed columns (the derivation path).
    pub fn from_columns(
        name: impl Into<String>,
        columns: Vec<ColumnSpec>,
    ) -> Result<Self, SchemaError> {
        let name = name.into();
        ensure_single_primary_key(&name, &columns)?;
        Ok(Self {
            name,
            columns,
            source: None,
        })
    }

    /// Parses the verbatim `CREATE TABLE` text stored in the schema catalog.
    ///
    /// The text must be non-empty, start (case-insensitively, after
    /// whitespace collapsing) with `CREATE TABLE`, and contain an outer pair
    /// of parentheses. `IF NOT EXISTS` is tolerated after the prefix since
    /// the catalog stores statements verbatim as issued and the executor
    /// issues `CREATE TABLE IF NOT EXISTS`.
    pub fn parse(sql: &str) -> Result<Self, SchemaError> {
        if sql.trim().is_empty() {
            return Err(SchemaError::EmptySchema);
        }

        let collapsed = sql.split_whitespace().collect::<Vec<_>>().join(" ");
        let not_create_table = || SchemaError::NotCreateTable {
            text: collapsed.clone(),
        };

        if !collapsed
            .to_ascii_uppercase()
            .starts_with("CREATE TABLE")
        {
            return Err(not_create_table());
        }

        let mut rest = collapsed["CREATE TABLE".len()..].trim_start();
        if rest.to_ascii_uppercase().starts_with("IF NOT EXISTS") {
            rest = rest["IF NOT EXISTS".len()..].trim_start();
        }

        let open = rest.find('(').ok_or_else(not_create_table)?;
        let close = rest.rfind(')').ok_or_else(not_create_table)?;
        if close < open {
            return Err(not_create_table());
        }

        let name = strip_quotes(rest[..open].trim());

        // Split on every comma between the outer parens. Generated schemas
        // never place commas inside a column definition: length qualifiers
        // are single numbers and default values are rejected at derivation
        // time if their SQL text contains a comma or unbalanced quoting.
        let mut columns = Vec::new();
        for fragment in rest[open + 1..close].split(',') {
            columns.push(ColumnSpec::parse(fragment)?);
        }
        ensure_single_primary_key(&name, &columns)?;

        Ok(Self {
            name,
            columns,
            source: Some(sql.to_string()),
        })
    }

    /// Renders the canonical `CREATE TABLE` statement for this spec.
    ///
    /// Round-trips: parsing the rendered statement yields a spec whose
    /// column definitions are case-insensitively equal to this one's.
    #[must_use]
    pub fn create_sql(&self) -> String {
        format!("CREATE TABLE {}({});", self.name, self.definition_list())
    }

    /// Same statement with `IF NOT EXISTS`, the executor's fresh-create
    /// path.
    #[must_use]
    pub fn create_if_not_exists_sql(&self) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {}({});",
            self.name,
            self.definition_list()
        )
    }

    /// Looks up a column by case-insensitive name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// The primary-key column, if one is declared.
    #[must_use]
    pub fn primary_key(&self) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.primary_key)
    }

    fn definition_list(&self) -> String {
        self.columns
            .iter()
            .map(ColumnSpec::definition)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn ensure_single_primary_key(table: &str, columns: &[ColumnSpec]) -> Result<(), SchemaError> {
    if columns.iter().filter(|c| c.primary_key).count() > 1 {
        return Err(SchemaError::MultiplePrimaryKeys {
            table: table.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        let spec =
            TableSpec::parse("CREATE TABLE test(id INTEGER PRIMARY KEY, my_value TEXT);").unwrap();
        assert_eq!(spec.name, "test");
        assert_eq!(spec.columns.len(), 2);
        assert_eq!(spec.columns[0].name, "id");
        assert!(spec.columns[0].primary_key);
        assert_eq!(spec.primary_key().unwrap().name, "id");
        assert!(spec.source.is_some());
    }

    #[test]
    fn test_round_trip() {
        let original = "CREATE TABLE test(id integer key, my_value TEXT, boolean_value INTEGER);";
        let spec = TableSpec::parse(original).unwrap();
        let rebuilt = spec.create_sql();
        assert!(rebuilt.eq_ignore_ascii_case(original));

        let reparsed = TableSpec::parse(&rebuilt).unwrap();
        assert_eq!(reparsed.name, spec.name);
        assert_eq!(reparsed.columns.len(), spec.columns.len());
        for (a, b) in reparsed.columns.iter().zip(&spec.columns) {
            assert!(a.same_definition(b));
        }
    }

    #[test]
    fn test_empty_input_rejected() {
        let err = TableSpec::parse("   ").unwrap_err();
        assert!(matches!(err, SchemaError::EmptySchema));
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_missing_prefix_rejected() {
        let err = TableSpec::parse("test(id integer primary key);").unwrap_err();
        assert!(matches!(err, SchemaError::NotCreateTable { .. }));
        assert!(err.to_string().contains("valid"));
    }

    #[test]
    fn test_missing_parens_rejected() {
        let err = TableSpec::parse("CREATE TABLE test").unwrap_err();
        assert!(matches!(err, SchemaError::NotCreateTable { .. }));
    }

    #[test]
    fn test_multiple_primary_keys_rejected() {
        let err = TableSpec::parse(
            "CREATE TABLE test(a INTEGER PRIMARY KEY, b INTEGER PRIMARY KEY);",
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::MultiplePrimaryKeys { .. }));
        assert!(err.to_string().contains("test"));
    }

    #[test]
    fn test_if_not_exists_tolerated() {
        let spec =
            TableSpec::parse("CREATE TABLE IF NOT EXISTS test(id INTEGER PRIMARY KEY);").unwrap();
        assert_eq!(spec.name, "test");
    }

    #[test]
    fn test_quoted_table_name_stripped() {
        let spec = TableSpec::parse("CREATE TABLE \"users\"(id INTEGER PRIMARY KEY);").unwrap();
        assert_eq!(spec.name, "users");
    }

    #[test]
    fn test_multiline_catalog_text() {
        let spec = TableSpec::parse(
            "CREATE TABLE test (\n  id INTEGER PRIMARY KEY,\n  name TEXT NOT NULL\n)",
        )
        .unwrap();
        assert_eq!(spec.columns.len(), 2);
        assert_eq!(spec.columns[1].constraints, "NOT NULL");
    }

    #[test]
    fn test_foreign_key_clause_survives() {
        let spec = TableSpec::parse(
            "CREATE TABLE child(id INTEGER PRIMARY KEY, parent INTEGER REFERENCES parent(id) ON DELETE CASCADE);",
        )
        .unwrap();
        assert_eq!(
            spec.columns[1].constraints,
            "REFERENCES parent(id) ON DELETE CASCADE"
        );
    }

    #[test]
    fn test_column_lookup_case_insensitive() {
        let spec = TableSpec::parse("CREATE TABLE t(MyValue TEXT, other INTEGER);").unwrap();
        assert!(spec.column("myvalue").is_some());
        assert!(spec.column("missing").is_none());
    }
}
