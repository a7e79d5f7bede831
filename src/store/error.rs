//! Store-level error types.
//!
//! These are the failure kinds the document-store semantics can surface:
//! caller errors (invalid schema, invalid names, malformed row payloads),
//! absence (`*NotFound`), duplicate creation (`*AlreadyExists`), the schema
//! lock, and pass-through backend failures including optimistic-concurrency
//! `Conflict` - which is surfaced verbatim, never retried here.

use thiserror::Error;

use crate::backend::BackendError;
use crate::schema::SchemaError;
use crate::store::names::InvalidNameError;

/// the main error type for store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// the proposed schema does not match the type grammar
    #[error("invalid schema: {0}")]
    Schema(#[from] SchemaError),

    /// invalid database or table name
    #[error("invalid name: {0}")]
    InvalidName(#[from] InvalidNameError),

    /// row payload was not a JSON object (or array of objects)
    #[error("invalid row payload: {0}")]
    InvalidRow(String),

    /// the database namespace does not exist
    #[error("database not found: {0}")]
    DatabaseNotFound(String),

    /// the database namespace already exists
    #[error("database already exists: {0}")]
    DatabaseAlreadyExists(String),

    /// the table's row collection does not exist
    #[error("table not found: {database}/{table}")]
    TableNotFound { database: String, table: String },

    /// the table already exists (schema document present)
    #[error("table already exists: {database}/{table}")]
    TableAlreadyExists { database: String, table: String },

    /// the table's schema document does not exist
    #[error("schema not found for table {database}/{table}")]
    SchemaNotFound { database: String, table: String },

    /// no row with the given identifier
    #[error("row not found: table={database}/{table}, id={id}")]
    RowNotFound {
        database: String,
        table: String,
        id: String,
    },

    /// a deletion by ids matched nothing
    #[error("no rows matched the given ids in {database}/{table}")]
    NoRowsMatched { database: String, table: String },

    /// schema replacement attempted while the table holds rows
    #[error("table {database}/{table} has data; schema is immutable until the table is emptied")]
    SchemaLocked { database: String, table: String },

    /// a persisted document failed to decode
    #[error("malformed document at {path}: {reason}")]
    Malformed { path: String, reason: String },

    /// JSON encoding failed
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// error from the versioned blob backend
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}

impl StoreError {
    /// check if this error indicates the resource doesn't exist
    pub fn is_not_found(&self) -> bool {
        match self {
            StoreError::DatabaseNotFound(_)
            | StoreError::TableNotFound { .. }
            | StoreError::SchemaNotFound { .. }
            | StoreError::RowNotFound { .. }
            | StoreError::NoRowsMatched { .. } => true,
            StoreError::Backend(e) => e.is_not_found(),
            _ => false,
        }
    }

    /// check if this is an optimistic-concurrency rejection (retryable:
    /// re-read, recompute, re-attempt)
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Backend(e) if e.is_conflict())
    }

    /// check if this is a caller error (bad input or duplicate creation)
    pub fn is_caller_error(&self) -> bool {
        match self {
            StoreError::Schema(_)
            | StoreError::InvalidName(_)
            | StoreError::InvalidRow(_)
            | StoreError::DatabaseAlreadyExists(_)
            | StoreError::TableAlreadyExists { .. }
            | StoreError::SchemaLocked { .. } => true,
            StoreError::Backend(BackendError::AlreadyExists(_)) => true,
            _ => false,
        }
    }
}

/// result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{ContentHash, DocPath};

    #[test]
    fn test_error_classification() {
        let not_found = StoreError::DatabaseNotFound("shop".to_string());
        assert!(not_found.is_not_found());
        assert!(!not_found.is_conflict());
        assert!(!not_found.is_caller_error());

        let locked = StoreError::SchemaLocked {
            database: "shop".to_string(),
            table: "users".to_string(),
        };
        assert!(locked.is_caller_error());

        let conflict = StoreError::Backend(BackendError::Conflict {
            path: DocPath::new("shop/Tables/users.json").unwrap(),
            expected: ContentHash::new("aaa"),
            current: ContentHash::new("bbb"),
        });
        assert!(conflict.is_conflict());
        assert!(!conflict.is_not_found());
    }
}
