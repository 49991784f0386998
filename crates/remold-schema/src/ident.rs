//! Identifier validation.
//!
//! Table and column names coming from model descriptors are interpolated
//! into SQL text, never bound as parameters, so they must pass an
//! allow-list before any statement is built from them.

use crate::error::SchemaError;

/// Validates a descriptor-supplied identifier.
///
/// Accepted: an ASCII letter or underscore followed by ASCII alphanumerics
/// or underscores. Anything else is rejected, including the empty string.
pub fn validate_identifier(name: &str) -> Result<(), SchemaError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(SchemaError::BadIdentifier {
            name: name.to_string(),
        })
    }
}
