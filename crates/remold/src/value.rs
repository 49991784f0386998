//! Dynamic values carried across a table rebuild.

use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteRow};
use sqlx::Row;

use remold_schema::StorageClass;

use crate::error::Result;

/// One cell read from the renamed source table during a rebuild, typed by
/// the observed column's storage class.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// SQL NULL.
    Null,
    /// Integer storage.
    Integer(i64),
    /// Floating-point storage.
    Real(f64),
    /// Text storage.
    Text(String),
    /// Blob storage.
    Blob(Vec<u8>),
}

impl SqlValue {
    /// Reads a named column out of a row using the accessor for its
    /// storage class. NULLs pass through regardless of class.
    pub fn from_row(row: &SqliteRow, column: &str, storage: StorageClass) -> Result<Self> {
        let value = match storage {
            StorageClass::Integer => row
                .try_get::<Option<i64>, _>(column)?
                .map_or(Self::Null, Self::Integer),
            StorageClass::Real => row
                .try_get::<Option<f64>, _>(column)?
                .map_or(Self::Null, Self::Real),
            StorageClass::Text => row
                .try_get::<Option<String>, _>(column)?
                .map_or(Self::Null, Self::Text),
            StorageClass::Blob => row
                .try_get::<Option<Vec<u8>>, _>(column)?
                .map_or(Self::Null, Self::Blob),
        };
        Ok(value)
    }

    /// Binds this value onto a query.
    #[must_use]
    pub fn bind<'q>(
        self,
        query: Query<'q, Sqlite, SqliteArguments<'q>>,
    ) -> Query<'q, Sqlite, SqliteArguments<'q>> {
        match self {
            Self::Null => query.bind(Option::<i64>::None),
            Self::Integer(v) => query.bind(v),
            Self::Real(v) => query.bind(v),
            Self::Text(v) => query.bind(v),
            Self::Blob(v) => query.bind(v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

    async fn create_test_pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await
            .expect("Failed to create in-memory SQLite pool")
    }

    #[tokio::test]
    async fn test_extract_by_storage_class() {
        let pool = create_test_pool().await;
        sqlx::query("CREATE TABLE v(i INTEGER, r REAL, t TEXT, b BLOB)")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO v VALUES (7, 1.5, 'hello', x'0102')")
            .execute(&pool)
            .await
            .unwrap();

        let row = sqlx::query("SELECT * FROM v").fetch_one(&pool).await.unwrap();
        assert_eq!(
            SqlValue::from_row(&row, "i", StorageClass::Integer).unwrap(),
            SqlValue::Integer(7)
        );
        assert_eq!(
            SqlValue::from_row(&row, "r", StorageClass::Real).unwrap(),
            SqlValue::Real(1.5)
        );
        assert_eq!(
            SqlValue::from_row(&row, "t", StorageClass::Text).unwrap(),
            SqlValue::Text("hello".to_string())
        );
        assert_eq!(
            SqlValue::from_row(&row, "b", StorageClass::Blob).unwrap(),
            SqlValue::Blob(vec![1, 2])
        );
    }

    #[tokio::test]
    async fn test_null_passes_through() {
        let pool = create_test_pool().await;
        sqlx::query("CREATE TABLE v(t TEXT)").execute(&pool).await.unwrap();
        sqlx::query("INSERT INTO v VALUES (NULL)")
            .execute(&pool)
            .await
            .unwrap();

        let row = sqlx::query("SELECT * FROM v").fetch_one(&pool).await.unwrap();
        assert_eq!(
            SqlValue::from_row(&row, "t", StorageClass::Text).unwrap(),
            SqlValue::Null
        );
    }

    #[tokio::test]
    async fn test_bind_round_trip() {
        let pool = create_test_pool().await;
        sqlx::query("CREATE TABLE v(t TEXT, i INTEGER)")
            .execute(&pool)
            .await
            .unwrap();

        let mut insert = sqlx::query("INSERT INTO v VALUES (?, ?)");
        insert = SqlValue::Text("abc".to_string()).bind(insert);
        insert = SqlValue::Null.bind(insert);
        insert.execute(&pool).await.unwrap();

        let row = sqlx::query("SELECT * FROM v").fetch_one(&pool).await.unwrap();
        assert_eq!(
            SqlValue::from_row(&row, "t", StorageClass::Text).unwrap(),
            SqlValue::Text("abc".to_string())
        );
        assert_eq!(
            SqlValue::from_row(&row, "i", StorageClass::Integer).unwrap(),
            SqlValue::Null
        );
    }
}
