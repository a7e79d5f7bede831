//! The versioned blob store contract.
//!
//! This is the narrow interface everything above the backend funnels
//! through: read a document and its content-hash token, write conditioned
//! on the token read earlier. The store owns raw bytes only; the layers
//! above reconstruct their view on every operation and keep no cache.

use crate::backend::error::BackendResult;
use crate::backend::types::{ContentHash, DocPath, Entry};

/// a document read from the store: raw content plus its version token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub content: Vec<u8>,
    pub hash: ContentHash,
}

/// A path-keyed blob store with conditioned writes.
///
/// Namespaces are implicit: they exist exactly while at least one document
/// lives under them, and vanish when their last document is deleted.
///
/// Implementations: [`GitStore`](crate::backend::GitStore) over a local
/// Git repository, [`MemoryStore`](crate::backend::MemoryStore) for tests.
pub trait VersionedStore: Send + Sync {
    /// read a document and its current content-hash token
    fn read(&self, path: &DocPath) -> BackendResult<Document>;

    /// create a new document; fails with `AlreadyExists` if present
    fn create(&self, path: &DocPath, content: &[u8]) -> BackendResult<ContentHash>;

    /// replace a document's content, conditioned on the token read earlier.
    ///
    /// Fails with `Conflict` if the document's current token differs from
    /// `expected` (the document was written by someone else in between),
    /// or `NotFound` if it no longer exists.
    fn update(
        &self,
        path: &DocPath,
        content: &[u8],
        expected: &ContentHash,
    ) -> BackendResult<ContentHash>;

    /// delete a document, conditioned on the token read earlier
    fn delete(&self, path: &DocPath, expected: &ContentHash) -> BackendResult<()>;

    /// list the direct children of a namespace (root lists top level)
    fn list_children(&self, path: &DocPath) -> BackendResult<Vec<Entry>>;
}
