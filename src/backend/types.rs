//! core types for the versioned blob backend.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A validated, slash-separated path to a document or namespace.
///
/// Paths address blobs inside the backend's file tree, so the usual
/// traversal hazards are rejected up front:
/// - no empty segments (no leading/trailing/double slashes)
/// - no `.` or `..` segments
/// - segments are capped at 128 characters
///
/// The empty path is the root namespace, constructed via [`DocPath::root`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocPath(String);

impl DocPath {
    /// create a new DocPath, validating the input
    pub fn new(path: impl Into<String>) -> Result<Self, InvalidPathError> {
        let path = path.into();
        Self::validate(&path)?;
        Ok(Self(path))
    }

    /// the root namespace (lists top-level namespaces)
    pub fn root() -> Self {
        Self(String::new())
    }

    fn validate(path: &str) -> Result<(), InvalidPathError> {
        if path.is_empty() {
            return Err(InvalidPathError::Empty);
        }
        for segment in path.split('/') {
            if segment.is_empty() {
                return Err(InvalidPathError::EmptySegment(path.to_string()));
            }
            if segment == "." || segment == ".." {
                return Err(InvalidPathError::Traversal(path.to_string()));
            }
            if segment.len() > 128 {
                return Err(InvalidPathError::SegmentTooLong(segment.len()));
            }
        }
        Ok(())
    }

    /// construct from segments already validated by the caller.
    ///
    /// Used by the store layer, whose database and table names go through
    /// their own (stricter) validation before paths are built from them.
    pub(crate) fn from_validated(path: String) -> Self {
        debug_assert!(Self::validate(&path).is_ok());
        Self(path)
    }

    /// get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// whether this is the root namespace
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// iterate over the path segments (empty for the root)
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// child path under this namespace
    pub fn join(&self, segment: &str) -> Result<DocPath, InvalidPathError> {
        if self.is_root() {
            Self::new(segment)
        } else {
            Self::new(format!("{}/{}", self.0, segment))
        }
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            write!(f, "<root>")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl AsRef<str> for DocPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// error type for invalid document paths
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidPathError {
    #[error("path cannot be empty (use DocPath::root for the root namespace)")]
    Empty,

    #[error("path contains an empty segment: '{0}'")]
    EmptySegment(String),

    #[error("path contains a traversal segment: '{0}'")]
    Traversal(String),

    #[error("path segment too long: {0} characters")]
    SegmentTooLong(usize),
}

/// Opaque token identifying a document's current version.
///
/// Returned by every read and required by every conditioned write; the
/// backend rejects a write whose token no longer matches the document.
/// For the Git-backed store this is the blob OID, which means writing
/// byte-identical content yields the same token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(String);

impl ContentHash {
    /// wrap a raw token value
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// a single child of a namespace, as returned by `list_children`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub kind: EntryKind,
}

/// the kind of a namespace child
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// a document (blob)
    File,
    /// a nested namespace (directory)
    Namespace,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doc_path_valid() {
        assert!(DocPath::new("shop/Tables/users.json").is_ok());
        assert!(DocPath::new("shop").is_ok());
        assert!(DocPath::new("a/b/c/d").is_ok());
    }

    #[test]
    fn test_doc_path_invalid() {
        assert!(DocPath::new("").is_err());
        assert!(DocPath::new("/leading").is_err());
        assert!(DocPath::new("trailing/").is_err());
        assert!(DocPath::new("a//b").is_err());
        assert!(DocPath::new("a/../b").is_err());
        assert!(DocPath::new("./a").is_err());
        assert!(DocPath::new("x".repeat(129)).is_err());
    }

    #[test]
    fn test_root_path() {
        let root = DocPath::root();
        assert!(root.is_root());
        assert_eq!(root.segments().count(), 0);
        assert_eq!(root.join("shop").unwrap().as_str(), "shop");
    }

    #[test]
    fn test_segments() {
        let path = DocPath::new("shop/Tables/users.json").unwrap();
        let segments: Vec<&str> = path.segments().collect();
        assert_eq!(segments, vec!["shop", "Tables", "users.json"]);
    }

    #[test]
    fn test_join() {
        let path = DocPath::new("shop/Tables").unwrap();
        assert_eq!(path.join("users.json").unwrap().as_str(), "shop/Tables/users.json");
        assert!(path.join("..").is_err());
    }
}
