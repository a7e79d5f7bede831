//! Table lifecycle: create, rename, list, delete.
//!
//! A table is a schema document plus a row-collection document, created
//! together and deleted together. The rename path is the one place the
//! pairing can skew: it copies both documents to the new name and then
//! deletes both old ones, and a failure between those steps leaves both
//! names referencing the table. That window is surfaced to the caller as
//! whatever step failed, never hidden.

use std::sync::Arc;

use serde_json::Value;

use crate::backend::{EntryKind, VersionedStore};
use crate::schema::Schema;
use crate::store::database::DatabaseManager;
use crate::store::error::{StoreError, StoreResult};
use crate::store::names::{self, DatabaseName, TableName, DOC_EXT, PLACEHOLDER};

/// Manages tables inside a database.
#[derive(Clone)]
pub struct TableManager {
    backend: Arc<dyn VersionedStore>,
    databases: DatabaseManager,
}

impl TableManager {
    /// create a new manager over the given backend
    pub fn new(backend: Arc<dyn VersionedStore>) -> Self {
        let databases = DatabaseManager::new(backend.clone());
        Self { backend, databases }
    }

    /// Create a table with the given schema.
    ///
    /// The schema is validated before any backend call. The schema
    /// document is written first and the empty row collection second, so
    /// a crash in between leaves a detectable inconsistency (schema
    /// present, no rows file) rather than a silent table.
    pub fn create(&self, db: &str, table: &str, schema: &Value) -> StoreResult<()> {
        Schema::validate(schema)?;

        let db = DatabaseName::new(db)?;
        let table = TableName::new(table)?;

        if !self.databases.exists(&db)? {
            return Err(StoreError::DatabaseNotFound(db.as_str().to_string()));
        }

        let schema_doc = names::schema_doc(&db, &table);
        match self.backend.read(&schema_doc) {
            Ok(_) => {
                return Err(StoreError::TableAlreadyExists {
                    database: db.as_str().to_string(),
                    table: table.as_str().to_string(),
                })
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e.into()),
        }

        let schema_bytes = serde_json::to_vec_pretty(schema)?;
        self.backend.create(&schema_doc, &schema_bytes)?;
        self.backend.create(&names::rows_doc(&db, &table), b"[]")?;

        Ok(())
    }

    /// Rename a table.
    ///
    /// Reads both documents, creates both under the new name, then
    /// deletes both old documents. Not atomic - see the module docs.
    pub fn rename(&self, db: &str, old: &str, new: &str) -> StoreResult<()> {
        let db = DatabaseName::new(db)?;
        let old = TableName::new(old)?;
        let new = TableName::new(new)?;

        let old_schema_doc = names::schema_doc(&db, &old);
        let old_rows_doc = names::rows_doc(&db, &old);

        let schema = self.backend.read(&old_schema_doc).map_err(|e| {
            if e.is_not_found() {
                StoreError::TableNotFound {
                    database: db.as_str().to_string(),
                    table: old.as_str().to_string(),
                }
            } else {
                e.into()
            }
        })?;
        let rows = self.backend.read(&old_rows_doc).map_err(|e| {
            if e.is_not_found() {
                StoreError::TableNotFound {
                    database: db.as_str().to_string(),
                    table: old.as_str().to_string(),
                }
            } else {
                e.into()
            }
        })?;

        self.backend
            .create(&names::schema_doc(&db, &new), &schema.content)?;
        self.backend
            .create(&names::rows_doc(&db, &new), &rows.content)?;

        self.backend.delete(&old_schema_doc, &schema.hash)?;
        self.backend.delete(&old_rows_doc, &rows.hash)?;

        Ok(())
    }

    /// List the tables of a database.
    ///
    /// Enumerates the row-collection namespace; placeholder documents are
    /// excluded and the `.json` extension is stripped.
    pub fn list(&self, db: &str) -> StoreResult<Vec<String>> {
        let db = DatabaseName::new(db)?;

        if !self.databases.exists(&db)? {
            return Err(StoreError::DatabaseNotFound(db.as_str().to_string()));
        }

        let entries = self.backend.list_children(&names::tables_dir(&db))?;
        Ok(entries
            .into_iter()
            .filter(|e| e.kind == EntryKind::File && e.name != PLACEHOLDER)
            .map(|e| {
                e.name
                    .strip_suffix(DOC_EXT)
                    .unwrap_or(&e.name)
                    .to_string()
            })
            .collect())
    }

    /// Delete a table: the schema document, then the row collection.
    ///
    /// Each step fails `NotFound` independently, so a previous partial
    /// deletion surfaces as the missing half rather than being masked.
    pub fn delete(&self, db: &str, table: &str) -> StoreResult<()> {
        let db = DatabaseName::new(db)?;
        let table = TableName::new(table)?;

        let schema_doc = names::schema_doc(&db, &table);
        let schema = self.backend.read(&schema_doc).map_err(|e| {
            if e.is_not_found() {
                StoreError::SchemaNotFound {
                    database: db.as_str().to_string(),
                    table: table.as_str().to_string(),
                }
            } else {
                e.into()
            }
        })?;
        self.backend.delete(&schema_doc, &schema.hash)?;

        let rows_doc = names::rows_doc(&db, &table);
        let rows = self.backend.read(&rows_doc).map_err(|e| {
            if e.is_not_found() {
                StoreError::TableNotFound {
                    database: db.as_str().to_string(),
                    table: table.as_str().to_string(),
                }
            } else {
                e.into()
            }
        })?;
        self.backend.delete(&rows_doc, &rows.hash)?;

        Ok(())
    }
}
