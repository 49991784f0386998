//! Expected-vs-observed schema diffing.

use crate::column::ColumnSpec;
use crate::error::SchemaError;
use crate::table::TableSpec;

/// One divergent column: the expected definition plus its observed
/// counterpart, if any. `observed: None` means the column does not exist
/// yet (a pure addition).
#[derive(Debug, Clone, Copy)]
pub struct ColumnChange<'a> {
    /// The column as the model declares it.
    pub expected: &'a ColumnSpec,
    /// The on-disk column with the same name, when its definition differs.
    pub observed: Option<&'a ColumnSpec>,
}

/// Structured difference between an expected and an observed table spec.
///
/// Computed fresh per table per migration pass; borrows both specs and is
/// discarded once the corresponding step executes.
#[derive(Debug)]
pub struct SchemaDiff<'a> {
    expected: &'a TableSpec,
    observed: &'a TableSpec,
    changes: Vec<ColumnChange<'a>>,
}

impl<'a> SchemaDiff<'a> {
    /// Compares the expected spec against the observed one.
    ///
    /// Columns match by case-insensitive name. A matched column whose
    /// definition is case-insensitively equal records nothing; one whose
    /// definition differs but whose storage class agrees records a
    /// modification. A storage-class disagreement is fatal and never
    /// coerced.
    pub fn compute(expected: &'a TableSpec, observed: &'a TableSpec) -> Result<Self, SchemaError> {
        let mut changes = Vec::new();

        for column in &expected.columns {
            let Some(found) = observed.column(&column.name) else {
                changes.push(ColumnChange {
                    expected: column,
                    observed: None,
                });
                continue;
            };
            if found.same_definition(column) {
                continue;
            }
            if found.storage != column.storage {
                return Err(SchemaError::TypeMismatch {
                    table: expected.name.clone(),
                    column: column.name.clone(),
                    expected: column.storage,
                    observed: found.storage,
                });
            }
            changes.push(ColumnChange {
                expected: column,
                observed: Some(found),
            });
        }

        Ok(Self {
            expected,
            observed,
            changes,
        })
    }

    /// The expected spec this diff was computed from.
    #[must_use]
    pub fn expected(&self) -> &'a TableSpec {
        self.expected
    }

    /// The observed spec this diff was computed from.
    #[must_use]
    pub fn observed(&self) -> &'a TableSpec {
        self.observed
    }

    /// Recorded changes, in expected-schema order.
    #[must_use]
    pub fn changes(&self) -> &[ColumnChange<'a>] {
        &self.changes
    }

    /// No differences at all; the migration step is a no-op.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Every recorded change is a pure addition and none of the added
    /// columns carry `PRIMARY KEY` or `UNIQUE`.
    ///
    /// Those are the only changes `ALTER TABLE ADD COLUMN` can express:
    /// the engine cannot backfill a key assignment or a uniqueness
    /// guarantee for pre-existing rows, so anything else goes through the
    /// full rebuild.
    #[must_use]
    pub fn is_additive_only(&self) -> bool {
        self.changes
            .iter()
            .all(|c| c.observed.is_none() && !c.expected.primary_key && !c.expected.unique)
    }

    /// Columns to add, in expected-schema order.
    pub fn additions(&self) -> impl Iterator<Item = &'a ColumnSpec> + '_ {
        self.changes
            .iter()
            .filter(|c| c.observed.is_none())
            .map(|c| c.expected)
    }

    /// The observed column a given expected column copies its data from
    /// during a rebuild, if any: the diff-mapped counterpart when the
    /// definition changed, otherwise the identically-named observed column.
    /// `None` means the column is left unset, receiving its declared
    /// default or NULL.
    #[must_use]
    pub fn copy_source(&self, expected: &ColumnSpec) -> Option<&'a ColumnSpec> {
        for change in &self.changes {
            if change.expected.name.eq_ignore_ascii_case(&expected.name) {
                return change.observed;
            }
        }
        self.observed.column(&expected.name)
    }
}
