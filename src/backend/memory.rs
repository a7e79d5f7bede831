//! In-memory implementation of the versioned store, for tests.
//!
//! Documents live in a flat map keyed by path; version tokens come from a
//! monotonic counter instead of content hashing. Namespaces are derived
//! from key prefixes, so they exist exactly while some document lives
//! under them - the same implicit-materialization rule the Git store has.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::backend::error::{BackendError, BackendResult};
use crate::backend::store::{Document, VersionedStore};
use crate::backend::types::{ContentHash, DocPath, Entry, EntryKind};

/// in-memory versioned store
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
}

#[derive(Default)]
struct MemoryInner {
    docs: BTreeMap<String, StoredDoc>,
    next_rev: u64,
}

struct StoredDoc {
    content: Vec<u8>,
    hash: ContentHash,
}

impl MemoryStore {
    /// create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl MemoryInner {
    fn next_hash(&mut self) -> ContentHash {
        self.next_rev += 1;
        ContentHash::new(format!("rev-{:08x}", self.next_rev))
    }
}

impl VersionedStore for MemoryStore {
    fn read(&self, path: &DocPath) -> BackendResult<Document> {
        let inner = self.inner.lock();
        let doc = inner
            .docs
            .get(path.as_str())
            .ok_or_else(|| BackendError::NotFound(path.clone()))?;
        Ok(Document {
            content: doc.content.clone(),
            hash: doc.hash.clone(),
        })
    }

    fn create(&self, path: &DocPath, content: &[u8]) -> BackendResult<ContentHash> {
        let mut inner = self.inner.lock();
        if inner.docs.contains_key(path.as_str()) {
            return Err(BackendError::AlreadyExists(path.clone()));
        }
        let hash = inner.next_hash();
        inner.docs.insert(
            path.as_str().to_string(),
            StoredDoc {
                content: content.to_vec(),
                hash: hash.clone(),
            },
        );
        Ok(hash)
    }

    fn update(
        &self,
        path: &DocPath,
        content: &[u8],
        expected: &ContentHash,
    ) -> BackendResult<ContentHash> {
        let mut inner = self.inner.lock();
        let current = match inner.docs.get(path.as_str()) {
            Some(doc) => doc.hash.clone(),
            None => return Err(BackendError::NotFound(path.clone())),
        };
        if &current != expected {
            return Err(BackendError::Conflict {
                path: path.clone(),
                expected: expected.clone(),
                current,
            });
        }
        let hash = inner.next_hash();
        inner.docs.insert(
            path.as_str().to_string(),
            StoredDoc {
                content: content.to_vec(),
                hash: hash.clone(),
            },
        );
        Ok(hash)
    }

    fn delete(&self, path: &DocPath, expected: &ContentHash) -> BackendResult<()> {
        let mut inner = self.inner.lock();
        let current = match inner.docs.get(path.as_str()) {
            Some(doc) => doc.hash.clone(),
            None => return Err(BackendError::NotFound(path.clone())),
        };
        if &current != expected {
            return Err(BackendError::Conflict {
                path: path.clone(),
                expected: expected.clone(),
                current,
            });
        }
        inner.docs.remove(path.as_str());
        Ok(())
    }

    fn list_children(&self, path: &DocPath) -> BackendResult<Vec<Entry>> {
        let inner = self.inner.lock();
        let prefix = if path.is_root() {
            String::new()
        } else {
            format!("{}/", path.as_str())
        };

        let mut files = BTreeSet::new();
        let mut namespaces = BTreeSet::new();
        for key in inner.docs.keys() {
            let rest = match key.strip_prefix(&prefix) {
                Some(r) => r,
                None => continue,
            };
            match rest.split_once('/') {
                Some((dir, _)) => {
                    namespaces.insert(dir.to_string());
                }
                None => {
                    files.insert(rest.to_string());
                }
            }
        }

        if files.is_empty() && namespaces.is_empty() && !path.is_root() {
            return Err(BackendError::NotFound(path.clone()));
        }

        let mut entries: Vec<Entry> = namespaces
            .into_iter()
            .map(|name| Entry {
                name,
                kind: EntryKind::Namespace,
            })
            .collect();
        entries.extend(files.into_iter().map(|name| Entry {
            name,
            kind: EntryKind::File,
        }));
        Ok(entries)
    }
}
