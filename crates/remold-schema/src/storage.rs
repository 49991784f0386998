//! SQLite storage classes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// The four storage classes a declared column type resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StorageClass {
    /// Integer affinity. Also stores booleans, dates and foreign keys.
    Integer,
    /// Floating point.
    Real,
    /// Text.
    Text,
    /// Binary data.
    Blob,
}

impl StorageClass {
    /// Canonical SQL name.
    #[must_use]
    pub fn sql_name(self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Real => "REAL",
            Self::Text => "TEXT",
            Self::Blob => "BLOB",
        }
    }

    /// Resolves a declared type token (`integer`, `TEXT(32)`, ...) to its
    /// storage class.
    ///
    /// A parenthesized length qualifier is ignored for matching but the
    /// caller keeps the token verbatim for reconstruction. Any other token
    /// is a fatal parse error.
    pub fn from_token(token: &str, fragment: &str) -> Result<Self, SchemaError> {
        let base = match token.find('(') {
            Some(pos) => &token[..pos],
            None => token,
        };
        match base.to_ascii_uppercase().as_str() {
            "INTEGER" => Ok(Self::Integer),
            "REAL" => Ok(Self::Real),
            "TEXT" => Ok(Self::Text),
            "BLOB" => Ok(Self::Blob),
            _ => Err(SchemaError::UnknownType {
                token: token.to_string(),
                fragment: fragment.to_string(),
            }),
        }
    }
}

impl fmt::Display for StorageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_name())
    }
}
