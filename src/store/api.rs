//! The top-level store handle.

use std::path::Path;
use std::sync::Arc;

use crate::backend::{GitStore, MemoryStore, VersionedStore};
use crate::store::database::DatabaseManager;
use crate::store::error::StoreResult;
use crate::store::rows::RowStore;
use crate::store::schema::SchemaManager;
use crate::store::table::TableManager;

/// A document store over a versioned blob backend.
///
/// Cheap to clone; clones share the backend and the row-level locks.
#[derive(Clone)]
pub struct Store {
    backend: Arc<dyn VersionedStore>,
    databases: DatabaseManager,
    tables: TableManager,
    schemas: SchemaManager,
    rows: RowStore,
}

impl Store {
    /// build a store over an existing backend
    pub fn new(backend: Arc<dyn VersionedStore>) -> Self {
        Self {
            databases: DatabaseManager::new(backend.clone()),
            tables: TableManager::new(backend.clone()),
            schemas: SchemaManager::new(backend.clone()),
            rows: RowStore::new(backend.clone()),
            backend,
        }
    }

    /// open (or initialize) a git-backed store at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let backend = GitStore::open_or_init(path)?;
        Ok(Self::new(Arc::new(backend)))
    }

    /// git-backed store in a temporary directory, removed on drop
    pub fn temporary() -> StoreResult<Self> {
        let backend = GitStore::temporary()?;
        Ok(Self::new(Arc::new(backend)))
    }

    /// in-memory store, mainly for tests
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// database operations
    pub fn databases(&self) -> &DatabaseManager {
        &self.databases
    }

    /// table operations
    pub fn tables(&self) -> &TableManager {
        &self.tables
    }

    /// schema operations
    pub fn schemas(&self) -> &SchemaManager {
        &self.schemas
    }

    /// row operations
    pub fn rows(&self) -> &RowStore {
        &self.rows
    }

    /// the underlying backend
    pub fn backend(&self) -> &Arc<dyn VersionedStore> {
        &self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::error::StoreError;
    use serde_json::json;

    #[test]
    fn test_full_lifecycle() {
        let store = Store::in_memory();

        store.databases().create("shop").unwrap();
        store
            .tables()
            .create("shop", "users", &json!({"name": "string", "age": "integer"}))
            .unwrap();

        let inserted = store
            .rows()
            .append("shop", "users", json!({"name": "Ann", "age": 30}))
            .unwrap();
        let first_id = inserted[0]["id"].as_str().unwrap().to_string();

        store
            .rows()
            .append("shop", "users", json!({"name": "Bo", "age": 25}))
            .unwrap();
        assert_eq!(store.rows().all("shop", "users").unwrap().len(), 2);

        store
            .rows()
            .delete_by_ids("shop", "users", &[first_id])
            .unwrap();
        let remaining = store.rows().all("shop", "users").unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0]["name"], "Bo");

        // the table still holds a row, so the schema stays locked
        let result = store
            .schemas()
            .replace("shop", "users", &json!({"name": "string"}));
        assert!(matches!(result, Err(StoreError::SchemaLocked { .. })));

        // empty the table, then replacement goes through
        store.rows().delete_by_ids("shop", "users", &[]).unwrap();
        store
            .schemas()
            .replace("shop", "users", &json!({"name": "string"}))
            .unwrap();
    }

    #[test]
    fn test_lifecycle_on_git_backend() {
        let store = Store::temporary().unwrap();

        store.databases().create("crm").unwrap();
        store
            .tables()
            .create("crm", "leads", &json!({"email": "string"}))
            .unwrap();
        store
            .rows()
            .append("crm", "leads", json!({"email": "a@b.c"}))
            .unwrap();

        assert_eq!(store.tables().list("crm").unwrap(), vec!["leads"]);
        assert_eq!(store.rows().all("crm", "leads").unwrap().len(), 1);

        store.databases().delete("crm").unwrap();
        assert!(store.databases().list().unwrap().is_empty());
    }
}
