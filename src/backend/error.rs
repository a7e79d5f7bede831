//! Backend error types.
//!
//! All errors that can occur while talking to the versioned blob store are
//! defined here. We use `thiserror` for ergonomic error definition.

use thiserror::Error;

use crate::backend::types::{ContentHash, DocPath, InvalidPathError};

/// the main error type for backend operations
#[derive(Debug, Error)]
pub enum BackendError {
    /// the requested document or namespace does not exist
    #[error("not found: {0}")]
    NotFound(DocPath),

    /// the document already exists
    #[error("already exists: {0}")]
    AlreadyExists(DocPath),

    /// a conditioned write was rejected because the supplied token is stale
    #[error("conflict at {path}: expected hash {expected}, current is {current}")]
    Conflict {
        path: DocPath,
        expected: ContentHash,
        current: ContentHash,
    },

    /// the tree entry has an unexpected type
    #[error("unexpected entry at {path}: expected {expected}, found {found}")]
    UnexpectedEntryType {
        path: DocPath,
        expected: &'static str,
        found: String,
    },

    /// invalid document path
    #[error("invalid path: {0}")]
    InvalidPath(#[from] InvalidPathError),

    /// error from the underlying Git library
    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    /// I/O error (filesystem level)
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// the repository has no commits yet
    #[error("repository is empty: no commits found")]
    EmptyRepository,

    /// internal error that shouldn't happen
    #[error("internal error: {0}")]
    Internal(String),
}

impl BackendError {
    /// check if this error indicates the resource doesn't exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, BackendError::NotFound(_))
    }

    /// check if this error is an optimistic-concurrency rejection
    pub fn is_conflict(&self) -> bool {
        matches!(self, BackendError::Conflict { .. })
    }
}

/// result type alias for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let not_found = BackendError::NotFound(DocPath::new("shop/Tables/users.json").unwrap());
        assert!(not_found.is_not_found());
        assert!(!not_found.is_conflict());

        let conflict = BackendError::Conflict {
            path: DocPath::new("shop/Tables/users.json").unwrap(),
            expected: ContentHash::new("aaa"),
            current: ContentHash::new("bbb"),
        };
        assert!(conflict.is_conflict());
        assert!(!conflict.is_not_found());
    }
}
