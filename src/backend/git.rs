//! Git-backed implementation of the versioned store.
//!
//! Wraps `git2::Repository` with thread-safe access. Every successful
//! mutation is one commit on `main` whose tree is the previous tree with a
//! single document inserted, replaced or removed. The content-hash token
//! handed to callers is the document's blob OID, which is exactly the
//! conditioned-write token a hosted Git forge's contents API exposes:
//! stale tokens are rejected, and writing byte-identical content yields
//! the same token.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use git2::{ObjectType, Repository};
use log::debug;
use parking_lot::Mutex;

use crate::backend::error::{BackendError, BackendResult};
use crate::backend::store::{Document, VersionedStore};
use crate::backend::tree::{apply_edit, lookup, TreeEdit};
use crate::backend::types::{ContentHash, DocPath, Entry, EntryKind};

const MAIN_REF: &str = "refs/heads/main";

/// commit author/committer identity
#[derive(Debug, Clone)]
pub struct CommitSignature {
    pub name: String,
    pub email: String,
}

impl CommitSignature {
    /// create a new signature
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// default signature for forgedb commits
    pub fn forgedb() -> Self {
        Self::new("forgedb", "forgedb@localhost")
    }

    fn to_git2(&self) -> Result<git2::Signature<'static>, git2::Error> {
        git2::Signature::now(&self.name, &self.email)
    }
}

impl Default for CommitSignature {
    fn default() -> Self {
        Self::forgedb()
    }
}

/// The Git-backed versioned store.
///
/// Clone this to share across threads - it uses Arc internally. The inner
/// repository sits behind a `Mutex`: a libgit2 repository handle is not
/// shareable between threads, so reads and writes alike take the one lock,
/// and each mutation holds it across its read-edit-commit sequence so the
/// `main` ref never moves under a commit in this process. Writers in other
/// processes are still fenced by the content-hash check.
#[derive(Clone)]
pub struct GitStore {
    inner: Arc<GitStoreInner>,
}

struct GitStoreInner {
    repo: Mutex<Repository>,
    path: PathBuf,
    signature: CommitSignature,
    // keeps the backing directory alive for `temporary` stores
    _tempdir: Option<tempfile::TempDir>,
}

impl GitStore {
    /// Open an existing store.
    pub fn open(path: impl AsRef<Path>) -> BackendResult<Self> {
        let path = path.as_ref();
        let repo = Repository::open(path)?;

        Ok(Self {
            inner: Arc::new(GitStoreInner {
                repo: Mutex::new(repo),
                path: path.to_path_buf(),
                signature: CommitSignature::forgedb(),
                _tempdir: None,
            }),
        })
    }

    /// Initialize a new store with an empty root commit.
    pub fn init(path: impl AsRef<Path>) -> BackendResult<Self> {
        let path = path.as_ref();
        let repo = Self::init_repo(path)?;

        Ok(Self {
            inner: Arc::new(GitStoreInner {
                repo: Mutex::new(repo),
                path: path.to_path_buf(),
                signature: CommitSignature::forgedb(),
                _tempdir: None,
            }),
        })
    }

    /// Open or initialize a store.
    pub fn open_or_init(path: impl AsRef<Path>) -> BackendResult<Self> {
        let path = path.as_ref();
        if path.join(".git").exists() {
            Self::open(path)
        } else {
            Self::init(path)
        }
    }

    /// Create a store in a temporary directory (for tests).
    pub fn temporary() -> BackendResult<Self> {
        let dir = tempfile::TempDir::new()?;
        let path = dir.path().to_path_buf();
        let repo = Self::init_repo(&path)?;

        Ok(Self {
            inner: Arc::new(GitStoreInner {
                repo: Mutex::new(repo),
                path,
                signature: CommitSignature::forgedb(),
                _tempdir: Some(dir),
            }),
        })
    }

    fn init_repo(path: &Path) -> BackendResult<Repository> {
        let repo = Repository::init(path)?;
        {
            let sig = CommitSignature::forgedb().to_git2()?;
            let tree_id = repo.treebuilder(None)?.write()?;
            let tree = repo.find_tree(tree_id)?;
            repo.commit(Some(MAIN_REF), &sig, &sig, "init", &tree, &[])?;
            repo.set_head(MAIN_REF)?;
        }
        Ok(repo)
    }

    /// Get the store path.
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// the tree of the current head commit
    fn head_tree<'r>(&self, repo: &'r Repository) -> BackendResult<git2::Tree<'r>> {
        let head = repo.head().map_err(|e| {
            if e.code() == git2::ErrorCode::UnbornBranch {
                BackendError::EmptyRepository
            } else {
                BackendError::Git(e)
            }
        })?;
        let commit = head.peel_to_commit()?;
        Ok(commit.tree()?)
    }

    /// write a commit for an edited tree, advancing `main`
    fn commit_tree(
        &self,
        repo: &Repository,
        new_root: Option<git2::Oid>,
        message: &str,
    ) -> BackendResult<()> {
        let tree_id = match new_root {
            Some(id) => id,
            // the edit emptied the whole tree
            None => repo.treebuilder(None)?.write()?,
        };
        let tree = repo.find_tree(tree_id)?;
        let parent = repo.head()?.peel_to_commit()?;
        let sig = self.inner.signature.to_git2()?;
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &[&parent])?;
        debug!("committed: {}", message);
        Ok(())
    }
}

impl VersionedStore for GitStore {
    fn read(&self, path: &DocPath) -> BackendResult<Document> {
        let repo = self.inner.repo.lock();
        let tree = self.head_tree(&repo)?;

        let (oid, kind) = lookup(&tree, path).ok_or_else(|| BackendError::NotFound(path.clone()))?;
        if kind != ObjectType::Blob {
            return Err(BackendError::UnexpectedEntryType {
                path: path.clone(),
                expected: "file",
                found: format!("{:?}", kind),
            });
        }

        let blob = repo.find_blob(oid)?;
        Ok(Document {
            content: blob.content().to_vec(),
            hash: ContentHash::new(oid.to_string()),
        })
    }

    fn create(&self, path: &DocPath, content: &[u8]) -> BackendResult<ContentHash> {
        let repo = self.inner.repo.lock();
        let tree = self.head_tree(&repo)?;

        if lookup(&tree, path).is_some() {
            return Err(BackendError::AlreadyExists(path.clone()));
        }

        let blob = repo.blob(content)?;
        let segments: Vec<&str> = path.segments().collect();
        let new_root = apply_edit(&repo, Some(&tree), &segments, TreeEdit::Put(blob))?;
        self.commit_tree(&repo, new_root, &format!("create {}", path))?;

        Ok(ContentHash::new(blob.to_string()))
    }

    fn update(
        &self,
        path: &DocPath,
        content: &[u8],
        expected: &ContentHash,
    ) -> BackendResult<ContentHash> {
        let repo = self.inner.repo.lock();
        let tree = self.head_tree(&repo)?;

        let (current, _) =
            lookup(&tree, path).ok_or_else(|| BackendError::NotFound(path.clone()))?;
        let current = ContentHash::new(current.to_string());
        if &current != expected {
            return Err(BackendError::Conflict {
                path: path.clone(),
                expected: expected.clone(),
                current,
            });
        }

        let blob = repo.blob(content)?;
        let segments: Vec<&str> = path.segments().collect();
        let new_root = apply_edit(&repo, Some(&tree), &segments, TreeEdit::Put(blob))?;
        self.commit_tree(&repo, new_root, &format!("update {}", path))?;

        Ok(ContentHash::new(blob.to_string()))
    }

    fn delete(&self, path: &DocPath, expected: &ContentHash) -> BackendResult<()> {
        let repo = self.inner.repo.lock();
        let tree = self.head_tree(&repo)?;

        let (current, _) =
            lookup(&tree, path).ok_or_else(|| BackendError::NotFound(path.clone()))?;
        let current = ContentHash::new(current.to_string());
        if &current != expected {
            return Err(BackendError::Conflict {
                path: path.clone(),
                expected: expected.clone(),
                current,
            });
        }

        let segments: Vec<&str> = path.segments().collect();
        let new_root = apply_edit(&repo, Some(&tree), &segments, TreeEdit::Remove)?;
        self.commit_tree(&repo, new_root, &format!("delete {}", path))?;

        Ok(())
    }

    fn list_children(&self, path: &DocPath) -> BackendResult<Vec<Entry>> {
        let repo = self.inner.repo.lock();
        let root = self.head_tree(&repo)?;

        let tree = if path.is_root() {
            root
        } else {
            let (oid, kind) =
                lookup(&root, path).ok_or_else(|| BackendError::NotFound(path.clone()))?;
            if kind != ObjectType::Tree {
                return Err(BackendError::UnexpectedEntryType {
                    path: path.clone(),
                    expected: "namespace",
                    found: format!("{:?}", kind),
                });
            }
            repo.find_tree(oid)?
        };

        let mut entries = Vec::new();
        for entry in tree.iter() {
            let name = match entry.name() {
                Some(n) => n.to_string(),
                None => continue,
            };
            let kind = match entry.kind() {
                Some(ObjectType::Blob) => EntryKind::File,
                Some(ObjectType::Tree) => EntryKind::Namespace,
                _ => continue,
            };
            entries.push(Entry { name, kind });
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> DocPath {
        DocPath::new(s).unwrap()
    }

    #[test]
    fn test_create_and_read() {
        let store = GitStore::temporary().unwrap();
        let p = path("shop/Tables/users.json");

        let hash = store.create(&p, b"[]").unwrap();
        let doc = store.read(&p).unwrap();

        assert_eq!(doc.content, b"[]");
        assert_eq!(doc.hash, hash);
    }

    #[test]
    fn test_read_missing() {
        let store = GitStore::temporary().unwrap();
        let result = store.read(&path("nope.json"));
        assert!(matches!(result, Err(BackendError::NotFound(_))));
    }

    #[test]
    fn test_create_duplicate() {
        let store = GitStore::temporary().unwrap();
        let p = path("db/doc.json");

        store.create(&p, b"one").unwrap();
        let result = store.create(&p, b"two");
        assert!(matches!(result, Err(BackendError::AlreadyExists(_))));
    }

    #[test]
    fn test_update_with_current_hash() {
        let store = GitStore::temporary().unwrap();
        let p = path("db/doc.json");

        let hash = store.create(&p, b"v1").unwrap();
        let hash2 = store.update(&p, b"v2", &hash).unwrap();
        assert_ne!(hash, hash2);

        let doc = store.read(&p).unwrap();
        assert_eq!(doc.content, b"v2");
        assert_eq!(doc.hash, hash2);
    }

    #[test]
    fn test_update_with_stale_hash_conflicts() {
        let store = GitStore::temporary().unwrap();
        let p = path("db/doc.json");

        let stale = store.create(&p, b"v1").unwrap();
        store.update(&p, b"v2", &stale).unwrap();

        // a second writer holding the superseded token loses
        let result = store.update(&p, b"v3", &stale);
        assert!(matches!(result, Err(BackendError::Conflict { .. })));

        let doc = store.read(&p).unwrap();
        assert_eq!(doc.content, b"v2");
    }

    #[test]
    fn test_identical_content_keeps_token() {
        let store = GitStore::temporary().unwrap();
        let p = path("db/doc.json");

        let hash = store.create(&p, b"same").unwrap();
        let hash2 = store.update(&p, b"same", &hash).unwrap();
        assert_eq!(hash, hash2);
    }

    #[test]
    fn test_delete() {
        let store = GitStore::temporary().unwrap();
        let p = path("db/doc.json");

        let hash = store.create(&p, b"x").unwrap();
        store.delete(&p, &hash).unwrap();

        assert!(matches!(store.read(&p), Err(BackendError::NotFound(_))));
    }

    #[test]
    fn test_delete_with_stale_hash_conflicts() {
        let store = GitStore::temporary().unwrap();
        let p = path("db/doc.json");

        let stale = store.create(&p, b"v1").unwrap();
        store.update(&p, b"v2", &stale).unwrap();

        let result = store.delete(&p, &stale);
        assert!(matches!(result, Err(BackendError::Conflict { .. })));
    }

    #[test]
    fn test_list_children() {
        let store = GitStore::temporary().unwrap();
        store.create(&path("shop/Tables/.gitkeep"), b"").unwrap();
        store.create(&path("shop/Tables/users.json"), b"[]").unwrap();
        store.create(&path("shop/Schema/users.json"), b"{}").unwrap();

        let root = store.list_children(&DocPath::root()).unwrap();
        assert_eq!(root.len(), 1);
        assert_eq!(root[0].name, "shop");
        assert_eq!(root[0].kind, EntryKind::Namespace);

        let mut tables = store.list_children(&path("shop/Tables")).unwrap();
        tables.sort_by(|a, b| a.name.cmp(&b.name));
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].name, ".gitkeep");
        assert_eq!(tables[0].kind, EntryKind::File);
        assert_eq!(tables[1].name, "users.json");
    }

    #[test]
    fn test_list_missing_namespace() {
        let store = GitStore::temporary().unwrap();
        let result = store.list_children(&path("ghost"));
        assert!(matches!(result, Err(BackendError::NotFound(_))));
    }

    #[test]
    fn test_namespace_vanishes_with_last_document() {
        let store = GitStore::temporary().unwrap();
        let p = path("shop/Tables/users.json");

        let hash = store.create(&p, b"[]").unwrap();
        store.delete(&p, &hash).unwrap();

        assert!(store.list_children(&DocPath::root()).unwrap().is_empty());
        assert!(matches!(
            store.list_children(&path("shop")),
            Err(BackendError::NotFound(_))
        ));
    }

    #[test]
    fn test_shared_as_trait_object_across_threads() {
        let store: Arc<dyn VersionedStore> = Arc::new(GitStore::temporary().unwrap());
        let p = path("db/doc.json");
        store.create(&p, b"shared").unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || {
                    store.read(&DocPath::new("db/doc.json").unwrap()).unwrap().content
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), b"shared");
        }
    }

    #[test]
    fn test_reopen_preserves_documents() {
        let dir = tempfile::TempDir::new().unwrap();
        let p = path("db/doc.json");
        {
            let store = GitStore::init(dir.path()).unwrap();
            store.create(&p, b"persisted").unwrap();
        }

        let store = GitStore::open_or_init(dir.path()).unwrap();
        assert_eq!(store.read(&p).unwrap().content, b"persisted");
    }
}
