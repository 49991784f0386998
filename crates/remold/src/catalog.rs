//! Schema catalog queries.
//!
//! Thin helpers over `sqlite_master` and `PRAGMA user_version`, generic
//! over any SQLite executor so the same functions serve a pool and an open
//! transaction.

use sqlx::sqlite::Sqlite;
use sqlx::{Executor, Row};

use crate::error::Result;

/// Returns the verbatim creation statement for a table, or `None` if the
/// catalog has no such table.
pub async fn table_sql<'e, E>(executor: E, table: &str) -> Result<Option<String>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query("SELECT sql FROM sqlite_master WHERE type = 'table' AND tbl_name = ?")
        .bind(table)
        .fetch_optional(executor)
        .await?;

    Ok(match row {
        Some(row) => row.try_get(0)?,
        None => None,
    })
}

/// Whether the catalog knows a table by this exact name.
pub async fn table_exists<'e, E>(executor: E, table: &str) -> Result<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query("SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?")
        .bind(table)
        .fetch_optional(executor)
        .await?;
    Ok(row.is_some())
}

/// Reads `PRAGMA user_version`.
pub async fn user_version<'e, E>(executor: E) -> Result<i32>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query("PRAGMA user_version").fetch_one(executor).await?;
    Ok(row.try_get(0)?)
}

/// Stamps `PRAGMA user_version`.
///
/// The version is interpolated, not bound: SQLite does not accept
/// parameters in PRAGMA statements. It is an `i32` because the header
/// field SQLite backs the pragma with is 32-bit signed; a wider type would
/// silently truncate on write.
pub async fn set_user_version<'e, E>(executor: E, version: i32) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(&format!("PRAGMA user_version = {version}"))
        .execute(executor)
        .await?;
    Ok(())
}
