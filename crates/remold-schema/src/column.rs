//! Column definition parsing.

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::storage::StorageClass;

/// One parsed column definition.
///
/// Holds the pieces of a fragment like `id INTEGER PRIMARY KEY`: the name,
/// the declared type, and the verbatim constraint tail. Immutable once
/// parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Column name, quote characters stripped.
    pub name: String,
    /// Storage class resolved from the declared type.
    pub storage: StorageClass,
    /// Declared type token, verbatim (preserves length qualifiers).
    pub type_token: String,
    /// Everything after name and type, verbatim, rejoined with single
    /// spaces. Constraint clauses are carried through without structural
    /// parsing.
    pub constraints: String,
    /// Whether the constraint tail declares `PRIMARY KEY`.
    pub primary_key: bool,
    /// Whether the constraint tail declares `UNIQUE`.
    pub unique: bool,
}

impl ColumnSpec {
    /// Parses a single column-definition fragment.
    ///
    /// The fragment must tokenize on whitespace into at least a name and a
    /// type, and the type must resolve to a [`StorageClass`]. The
    /// `primary_key`/`unique` flags are case-insensitive substring checks on
    /// the constraint tail, not a structural parse; a string default that
    /// happens to contain the keyword would false-positive.
    pub fn parse(fragment: &str) -> Result<Self, SchemaError> {
        let tokens: Vec<&str> = fragment.split_whitespace().collect();
        if tokens.len() < 2 {
            return Err(SchemaError::BadColumn {
                fragment: fragment.trim().to_string(),
            });
        }

        let storage = StorageClass::from_token(tokens[1], fragment.trim())?;
        let constraints = tokens[2..].join(" ");
        let upper = constraints.to_ascii_uppercase();

        Ok(Self {
            name: strip_quotes(tokens[0]),
            storage,
            type_token: tokens[1].to_string(),
            primary_key: upper.contains("PRIMARY KEY"),
            unique: upper.contains("UNIQUE"),
            constraints,
        })
    }

    /// Renders the definition back to fragment form.
    #[must_use]
    pub fn definition(&self) -> String {
        if self.constraints.is_empty() {
            format!("{} {}", self.name, self.type_token)
        } else {
            format!("{} {} {}", self.name, self.type_token, self.constraints)
        }
    }

    /// Case-insensitive comparison of the full definitions.
    #[must_use]
    pub fn same_definition(&self, other: &ColumnSpec) -> bool {
        self.definition().eq_ignore_ascii_case(&other.definition())
    }
}

/// Removes identifier quote characters.
pub(crate) fn strip_quotes(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, '"' | '\'' | '`' | '[' | ']'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let col = ColumnSpec::parse("my_value TEXT").unwrap();
        assert_eq!(col.name, "my_value");
        assert_eq!(col.storage, StorageClass::Text);
        assert_eq!(col.constraints, "");
        assert!(!col.primary_key);
        assert!(!col.unique);
    }

    #[test]
    fn test_primary_key_detected() {
        let col = ColumnSpec::parse("id integer primary key").unwrap();
        assert!(col.primary_key);
    }

    #[test]
    fn test_bare_key_is_not_primary() {
        let col = ColumnSpec::parse("id integer key").unwrap();
        assert!(!col.primary_key);
        assert_eq!(col.constraints, "key");
    }

    #[test]
    fn test_unique_detected() {
        let col = ColumnSpec::parse("email TEXT NOT NULL unique").unwrap();
        assert!(col.unique);
        assert!(!col.primary_key);
    }

    #[test]
    fn test_too_few_tokens() {
        let err = ColumnSpec::parse("lonely").unwrap_err();
        assert!(matches!(err, SchemaError::BadColumn { .. }));
        assert!(err.to_string().contains("lonely"));
    }

    #[test]
    fn test_unknown_type_is_fatal() {
        let err = ColumnSpec::parse("name VARCHAR NOT NULL").unwrap_err();
        assert!(matches!(err, SchemaError::UnknownType { .. }));
    }

    #[test]
    fn test_constraints_rejoined_with_single_spaces() {
        let col = ColumnSpec::parse("  flag   INTEGER   NOT    NULL  DEFAULT 0 ").unwrap();
        assert_eq!(col.constraints, "NOT NULL DEFAULT 0");
        assert_eq!(col.definition(), "flag INTEGER NOT NULL DEFAULT 0");
    }

    #[test]
    fn test_quoted_name_stripped() {
        let col = ColumnSpec::parse("\"order\" INTEGER").unwrap();
        assert_eq!(col.name, "order");
    }

    #[test]
    fn test_length_qualifier_preserved() {
        let col = ColumnSpec::parse("name TEXT(32) NOT NULL").unwrap();
        assert_eq!(col.storage, StorageClass::Text);
        assert_eq!(col.definition(), "name TEXT(32) NOT NULL");
    }
}
