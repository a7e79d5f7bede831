//! Schema retrieval and replacement.

use std::sync::Arc;

use serde_json::Value;

use crate::backend::VersionedStore;
use crate::schema::Schema;
use crate::store::database::DatabaseManager;
use crate::store::error::{StoreError, StoreResult};
use crate::store::names::{self, DatabaseName, TableName};

/// Manages the schema documents of existing tables.
///
/// A schema is immutable while the table holds rows. Replacement is only
/// possible once the row collection is empty, which keeps every persisted
/// row attributable to exactly one schema generation.
#[derive(Clone)]
pub struct SchemaManager {
    backend: Arc<dyn VersionedStore>,
    databases: DatabaseManager,
}

impl SchemaManager {
    /// create a new manager over the given backend
    pub fn new(backend: Arc<dyn VersionedStore>) -> Self {
        let databases = DatabaseManager::new(backend.clone());
        Self { backend, databases }
    }

    /// fetch a table's schema document
    pub fn get(&self, db: &str, table: &str) -> StoreResult<Value> {
        let db = DatabaseName::new(db)?;
        let table = TableName::new(table)?;

        let path = names::schema_doc(&db, &table);
        let doc = self.backend.read(&path).map_err(|e| {
            if e.is_not_found() {
                StoreError::SchemaNotFound {
                    database: db.as_str().to_string(),
                    table: table.as_str().to_string(),
                }
            } else {
                e.into()
            }
        })?;

        serde_json::from_slice(&doc.content).map_err(|e| StoreError::Malformed {
            path: path.as_str().to_string(),
            reason: e.to_string(),
        })
    }

    /// Replace a table's schema.
    ///
    /// The new schema is validated first. Fails with `SchemaLocked` when
    /// the row collection is non-empty. The old document is deleted under
    /// its current token and the new one created in its place, so a
    /// concurrent writer that touched the schema in between is rejected
    /// with a conflict instead of being overwritten.
    pub fn replace(&self, db: &str, table: &str, schema: &Value) -> StoreResult<()> {
        Schema::validate(schema)?;

        let db = DatabaseName::new(db)?;
        let table = TableName::new(table)?;

        if !self.databases.exists(&db)? {
            return Err(StoreError::DatabaseNotFound(db.as_str().to_string()));
        }

        let schema_path = names::schema_doc(&db, &table);
        let current = self.backend.read(&schema_path).map_err(|e| {
            if e.is_not_found() {
                StoreError::SchemaNotFound {
                    database: db.as_str().to_string(),
                    table: table.as_str().to_string(),
                }
            } else {
                e.into()
            }
        })?;

        match self.backend.read(&names::rows_doc(&db, &table)) {
            Ok(doc) => {
                let rows: Value =
                    serde_json::from_slice(&doc.content).unwrap_or(Value::Array(vec![]));
                let empty = rows.as_array().map(|a| a.is_empty()).unwrap_or(false);
                if !empty {
                    return Err(StoreError::SchemaLocked {
                        database: db.as_str().to_string(),
                        table: table.as_str().to_string(),
                    });
                }
            }
            Err(e) if e.is_not_found() => {} // no rows document means no rows
            Err(e) => return Err(e.into()),
        }

        self.backend.delete(&schema_path, &current.hash)?;
        self.backend
            .create(&schema_path, &serde_json::to_vec_pretty(schema)?)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{DocPath, MemoryStore};
    use crate::store::table::TableManager;
    use serde_json::json;

    fn setup() -> (Arc<MemoryStore>, TableManager, SchemaManager) {
        let backend = Arc::new(MemoryStore::new());
        let dbs = DatabaseManager::new(backend.clone());
        let tables = TableManager::new(backend.clone());
        let schemas = SchemaManager::new(backend.clone());
        dbs.create("shop").unwrap();
        tables
            .create("shop", "users", &json!({"name": "string"}))
            .unwrap();
        (backend, tables, schemas)
    }

    #[test]
    fn test_get() {
        let (_backend, _tables, schemas) = setup();
        let schema = schemas.get("shop", "users").unwrap();
        assert_eq!(schema, json!({"name": "string"}));
    }

    #[test]
    fn test_get_missing() {
        let (_backend, _tables, schemas) = setup();
        let result = schemas.get("shop", "ghost");
        assert!(matches!(result, Err(StoreError::SchemaNotFound { .. })));
    }

    #[test]
    fn test_get_malformed_document() {
        let (backend, _tables, schemas) = setup();
        let path = DocPath::new("shop/Schema/broken.json").unwrap();
        backend.create(&path, b"{not json").unwrap();

        let result = schemas.get("shop", "broken");
        assert!(matches!(result, Err(StoreError::Malformed { .. })));
    }

    #[test]
    fn test_replace_on_empty_table() {
        let (_backend, _tables, schemas) = setup();
        let new_schema = json!({"name": "string", "email": "string"});
        schemas.replace("shop", "users", &new_schema).unwrap();
        assert_eq!(schemas.get("shop", "users").unwrap(), new_schema);
    }

    #[test]
    fn test_replace_locked_when_rows_exist() {
        let (backend, _tables, schemas) = setup();
        let rows = DocPath::new("shop/Tables/users.json").unwrap();
        let doc = backend.read(&rows).unwrap();
        backend
            .update(&rows, br#"[{"id": "1", "name": "ann"}]"#, &doc.hash)
            .unwrap();

        let result = schemas.replace("shop", "users", &json!({"name": "string"}));
        assert!(matches!(result, Err(StoreError::SchemaLocked { .. })));
    }

    #[test]
    fn test_replace_validates_first() {
        let (_backend, _tables, schemas) = setup();
        let result = schemas.replace("shop", "users", &json!({"age": "number"}));
        assert!(matches!(result, Err(StoreError::Schema(_))));
        // original untouched
        assert_eq!(
            schemas.get("shop", "users").unwrap(),
            json!({"name": "string"})
        );
    }

    #[test]
    fn test_replace_missing_table() {
        let (_backend, _tables, schemas) = setup();
        let result = schemas.replace("shop", "ghost", &json!({"name": "string"}));
        assert!(matches!(result, Err(StoreError::SchemaNotFound { .. })));
    }
}
