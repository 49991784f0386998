//! The migration executor.
//!
//! Runs one automatic migration pass: for every registered model, reconcile
//! the on-disk table with the expected schema, all inside a single
//! transaction that also stamps `PRAGMA user_version` on success.

use rand::random;
use sqlx::sqlite::{Sqlite, SqlitePool};
use sqlx::Transaction;
use tracing::{debug, info};

use remold_schema::{ColumnSpec, ModelRegistry, ModelSpec, SchemaDiff, TableSpec};

use crate::catalog;
use crate::error::Result;
use crate::value::SqlValue;

/// Terminal state of one table's migration step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableOutcome {
    /// The catalog had no such table; it was created fresh.
    Created,
    /// The observed schema already matches; no SQL issued.
    Skipped,
    /// Purely additive diff; this many `ADD COLUMN` statements issued.
    ColumnsAdded(usize),
    /// Structural diff; the table was rebuilt with data carried across.
    Rebuilt,
}

/// Summary of one migration pass.
#[derive(Debug)]
pub struct MigrationReport {
    /// Per-table outcomes in processing order.
    pub outcomes: Vec<(String, TableOutcome)>,
    /// The version stamped into `PRAGMA user_version`.
    pub version: i32,
}

impl MigrationReport {
    /// Whether the pass issued no DDL at all.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.outcomes
            .iter()
            .all(|(_, outcome)| *outcome == TableOutcome::Skipped)
    }
}

/// Runs automatic schema migrations for every model in a registry.
///
/// The pass is synchronous relative to the caller and assumes exclusive
/// ownership of the database for its duration; run it during open, before
/// the handle is shared.
pub struct Migrator {
    pool: SqlitePool,
    registry: ModelRegistry,
    target_version: i32,
}

impl Migrator {
    /// Creates a migrator. The target version is an `i32` to match the
    /// 32-bit field behind `PRAGMA user_version`.
    #[must_use]
    pub fn new(pool: SqlitePool, registry: ModelRegistry, target_version: i32) -> Self {
        Self {
            pool,
            registry,
            target_version,
        }
    }

    /// The registry this migrator was built with.
    #[must_use]
    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Runs one migration pass.
    ///
    /// All tables are processed inside a single transaction. Any error
    /// rolls the whole pass back: no table is left partially migrated and
    /// `user_version` is not bumped.
    pub async fn run(&self) -> Result<MigrationReport> {
        let mut tx = self.pool.begin().await?;
        let mut outcomes = Vec::with_capacity(self.registry.len());

        for model in self.registry.models() {
            let outcome = migrate_table(&mut tx, model).await?;
            info!(table = %model.table, outcome = ?outcome, "table reconciled");
            outcomes.push((model.table.clone(), outcome));
        }

        catalog::set_user_version(&mut *tx, self.target_version).await?;
        tx.commit().await?;

        Ok(MigrationReport {
            outcomes,
            version: self.target_version,
        })
    }
}

/// Migrates a single table: fetch the observed schema, diff against the
/// expected one, and take the cheapest safe path.
async fn migrate_table(
    tx: &mut Transaction<'_, Sqlite>,
    model: &ModelSpec,
) -> Result<TableOutcome> {
    let expected = model.expected_schema()?;

    let Some(observed_sql) = catalog::table_sql(&mut **tx, &model.table).await? else {
        let sql = expected.create_if_not_exists_sql();
        debug!(sql = %sql, "executing");
        sqlx::query(&sql).execute(&mut **tx).await?;
        return Ok(TableOutcome::Created);
    };

    let observed = TableSpec::parse(&observed_sql)?;
    let diff = SchemaDiff::compute(&expected, &observed)?;

    if diff.is_empty() {
        return Ok(TableOutcome::Skipped);
    }

    if diff.is_additive_only() {
        let mut added = 0;
        for column in diff.additions() {
            let sql = format!(
                "ALTER TABLE {} ADD COLUMN {};",
                expected.name,
                column.definition()
            );
            debug!(sql = %sql, "executing");
            sqlx::query(&sql).execute(&mut **tx).await?;
            added += 1;
        }
        return Ok(TableOutcome::ColumnsAdded(added));
    }

    rebuild_table(tx, &expected, &diff).await?;
    Ok(TableOutcome::Rebuilt)
}

/// Rename, recreate, copy, drop.
///
/// Step order is load-bearing: creating the new table before renaming the
/// old one would collide on the table name. Every expected column takes its
/// value from its diff-resolved source column; expected columns with no
/// source stay unset so declared defaults or NULL apply, and observed
/// columns absent from the expected schema are dropped with the renamed
/// table.
async fn rebuild_table(
    tx: &mut Transaction<'_, Sqlite>,
    expected: &TableSpec,
    diff: &SchemaDiff<'_>,
) -> Result<()> {
    let temp = temp_table_name(tx, &expected.name).await?;

    for sql in [
        format!("ALTER TABLE {} RENAME TO {};", expected.name, temp),
        expected.create_sql(),
    ] {
        debug!(sql = %sql, "executing");
        sqlx::query(&sql).execute(&mut **tx).await?;
    }

    let copies: Vec<(&ColumnSpec, &ColumnSpec)> = expected
        .columns
        .iter()
        .filter_map(|column| diff.copy_source(column).map(|source| (column, source)))
        .collect();

    let rows = sqlx::query(&format!("SELECT * FROM {temp};"))
        .fetch_all(&mut **tx)
        .await?;

    if copies.is_empty() {
        let insert_sql = format!("INSERT INTO {} DEFAULT VALUES;", expected.name);
        for _ in &rows {
            sqlx::query(&insert_sql).execute(&mut **tx).await?;
        }
    } else {
        let columns = copies
            .iter()
            .map(|(column, _)| column.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = vec!["?"; copies.len()].join(", ");
        let insert_sql = format!(
            "INSERT INTO {} ({columns}) VALUES ({placeholders});",
            expected.name
        );

        for row in &rows {
            let mut insert = sqlx::query(&insert_sql);
            for (_, source) in &copies {
                insert = SqlValue::from_row(row, &source.name, source.storage)?.bind(insert);
            }
            insert.execute(&mut **tx).await?;
        }
    }

    let drop_sql = format!("DROP TABLE {temp};");
    debug!(sql = %drop_sql, "executing");
    sqlx::query(&drop_sql).execute(&mut **tx).await?;

    Ok(())
}

/// Picks a rebuild name the catalog does not already know, in case a prior
/// failed migration or another table squats on the obvious one.
async fn temp_table_name(tx: &mut Transaction<'_, Sqlite>, table: &str) -> Result<String> {
    loop {
        let candidate = format!("{table}_{}", random::<u32>());
        if !catalog::table_exists(&mut **tx, &candidate).await? {
            return Ok(candidate);
        }
    }
}
