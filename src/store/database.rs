//! Database lifecycle: create, list, delete top-level namespaces.

use std::sync::Arc;

use crate::backend::{DocPath, EntryKind, VersionedStore};
use crate::store::error::{StoreError, StoreResult};
use crate::store::names::{self, DatabaseName, SCHEMA_DIR, TABLES_DIR};

/// Manages database namespaces.
///
/// A database is a folder pair: `{db}/Tables` and `{db}/Schema`, each kept
/// materialized by an empty placeholder document. The backend only
/// materializes non-empty namespaces, so the placeholders are what make a
/// freshly created database visible at all.
#[derive(Clone)]
pub struct DatabaseManager {
    backend: Arc<dyn VersionedStore>,
}

impl DatabaseManager {
    /// create a new manager over the given backend
    pub fn new(backend: Arc<dyn VersionedStore>) -> Self {
        Self { backend }
    }

    /// Create a database.
    ///
    /// Fails with `DatabaseAlreadyExists` if the namespace is present.
    /// A placeholder that already exists is skipped rather than treated as
    /// an error, so a creation that failed halfway can be re-run.
    pub fn create(&self, name: &str) -> StoreResult<()> {
        let name = DatabaseName::new(name)?;

        if self.exists(&name)? {
            return Err(StoreError::DatabaseAlreadyExists(name.as_str().to_string()));
        }

        for sub in [TABLES_DIR, SCHEMA_DIR] {
            let placeholder = names::placeholder_doc(&name, sub);
            match self.backend.read(&placeholder) {
                Ok(_) => {} // partial-creation recovery
                Err(e) if e.is_not_found() => {
                    self.backend.create(&placeholder, b"")?;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(())
    }

    /// list every database name
    pub fn list(&self) -> StoreResult<Vec<String>> {
        let entries = self.backend.list_children(&DocPath::root())?;
        Ok(entries
            .into_iter()
            .filter(|e| e.kind == EntryKind::Namespace)
            .map(|e| e.name)
            .collect())
    }

    /// check whether a database namespace exists
    pub fn exists(&self, name: &DatabaseName) -> StoreResult<bool> {
        Ok(self.list()?.iter().any(|n| n == name.as_str()))
    }

    /// Delete a database and everything under it.
    ///
    /// Enumerates and deletes every document depth-first; the backend
    /// drops emptied namespaces implicitly, so no separate directory
    /// removal is needed.
    pub fn delete(&self, name: &str) -> StoreResult<()> {
        let name = DatabaseName::new(name)?;

        if !self.exists(&name)? {
            return Err(StoreError::DatabaseNotFound(name.as_str().to_string()));
        }

        self.delete_namespace(&names::database_dir(&name))
    }

    fn delete_namespace(&self, path: &DocPath) -> StoreResult<()> {
        for entry in self.backend.list_children(path)? {
            let child = path.join(&entry.name).map_err(crate::backend::BackendError::from)?;
            match entry.kind {
                EntryKind::Namespace => self.delete_namespace(&child)?,
                EntryKind::File => {
                    let doc = self.backend.read(&child)?;
                    self.backend.delete(&child, &doc.hash)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryStore;

    fn manager() -> DatabaseManager {
        DatabaseManager::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_create_and_list() {
        let dbs = manager();
        dbs.create("shop").unwrap();
        dbs.create("crm").unwrap();

        let mut names = dbs.list().unwrap();
        names.sort();
        assert_eq!(names, vec!["crm", "shop"]);
    }

    #[test]
    fn test_create_duplicate() {
        let dbs = manager();
        dbs.create("shop").unwrap();

        let result = dbs.create("shop");
        assert!(matches!(result, Err(StoreError::DatabaseAlreadyExists(_))));
    }

    #[test]
    fn test_create_invalid_name() {
        let dbs = manager();
        assert!(matches!(
            dbs.create("no/slashes"),
            Err(StoreError::InvalidName(_))
        ));
    }

    #[test]
    fn test_half_created_namespace_counts_as_existing() {
        let backend = Arc::new(MemoryStore::new());
        let dbs = DatabaseManager::new(backend.clone());

        // a crash after the first placeholder still materializes the
        // namespace, so a retry sees it as present
        let half = DocPath::new("shop/Tables/.gitkeep").unwrap();
        backend.create(&half, b"").unwrap();

        let result = dbs.create("shop");
        assert!(matches!(result, Err(StoreError::DatabaseAlreadyExists(_))));
    }

    #[test]
    fn test_delete_missing() {
        let dbs = manager();
        assert!(matches!(
            dbs.delete("ghost"),
            Err(StoreError::DatabaseNotFound(_))
        ));
    }

    #[test]
    fn test_delete_removes_everything() {
        let backend = Arc::new(MemoryStore::new());
        let dbs = DatabaseManager::new(backend.clone());

        dbs.create("shop").unwrap();
        backend
            .create(&DocPath::new("shop/Tables/users.json").unwrap(), b"[]")
            .unwrap();
        backend
            .create(&DocPath::new("shop/Schema/users.json").unwrap(), b"{}")
            .unwrap();

        dbs.delete("shop").unwrap();
        assert!(dbs.list().unwrap().is_empty());
    }
}
