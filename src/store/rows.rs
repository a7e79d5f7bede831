//! Row operations over a table's collection document.
//!
//! Every row mutation is a read-modify-write of the whole collection,
//! re-submitted under the content token observed at read time. A per-table
//! mutex serializes writers inside this process so they queue instead of
//! burning conflict round-trips against each other; writers in other
//! processes still surface as `Conflict` through the backend token check.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{Map, Value};
use ulid::Ulid;

use crate::backend::{ContentHash, DocPath, VersionedStore};
use crate::store::error::{StoreError, StoreResult};
use crate::store::names::{self, DatabaseName, TableName};

/// Manages the rows of existing tables.
#[derive(Clone)]
pub struct RowStore {
    backend: Arc<dyn VersionedStore>,
    locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl RowStore {
    /// create a new row store over the given backend
    pub fn new(backend: Arc<dyn VersionedStore>) -> Self {
        Self {
            backend,
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn table_lock(&self, db: &DatabaseName, table: &TableName) -> Arc<Mutex<()>> {
        let key = format!("{}/{}", db, table);
        let mut locks = self.locks.lock();
        // entries only the map still references belong to idle (possibly
        // deleted) tables; drop them so the map tracks live writers, not
        // every table ever touched
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        locks.entry(key).or_default().clone()
    }

    #[cfg(test)]
    fn lock_count(&self) -> usize {
        self.locks.lock().len()
    }

    /// Read the collection document. `None` means the document does not
    /// exist. A document holding a single object instead of an array is
    /// treated as a one-row collection.
    fn read_collection(&self, path: &DocPath) -> StoreResult<Option<(Vec<Value>, ContentHash)>> {
        let doc = match self.backend.read(path) {
            Ok(doc) => doc,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let value: Value =
            serde_json::from_slice(&doc.content).map_err(|e| StoreError::Malformed {
                path: path.as_str().to_string(),
                reason: e.to_string(),
            })?;

        let rows = match value {
            Value::Array(rows) => rows,
            other => vec![other],
        };
        Ok(Some((rows, doc.hash)))
    }

    fn write_collection(
        &self,
        path: &DocPath,
        rows: &[Value],
        hash: Option<&ContentHash>,
    ) -> StoreResult<()> {
        let bytes = serde_json::to_vec_pretty(&rows)?;
        match hash {
            Some(hash) => self.backend.update(path, &bytes, hash)?,
            None => self.backend.create(path, &bytes)?,
        };
        Ok(())
    }

    /// Append one row or a batch of rows.
    ///
    /// `data` is a JSON object or an array of objects. Rows without an
    /// `"id"` field are assigned a fresh ULID; an `"id"` the caller
    /// supplies is kept as-is. Returns the rows as persisted.
    pub fn append(&self, db: &str, table: &str, data: Value) -> StoreResult<Vec<Value>> {
        let db = DatabaseName::new(db)?;
        let table = TableName::new(table)?;

        let mut incoming = match data {
            Value::Object(obj) => vec![Value::Object(obj)],
            Value::Array(items) => items,
            other => {
                return Err(StoreError::InvalidRow(format!(
                    "expected an object or an array of objects, got {}",
                    type_name(&other)
                )))
            }
        };
        for row in &mut incoming {
            let obj = row.as_object_mut().ok_or_else(|| {
                StoreError::InvalidRow("array items must be objects".to_string())
            })?;
            if !obj.contains_key("id") {
                obj.insert(
                    "id".to_string(),
                    Value::String(Ulid::new().to_string().to_lowercase()),
                );
            }
        }

        let lock = self.table_lock(&db, &table);
        let _guard = lock.lock();

        let path = names::rows_doc(&db, &table);
        let (mut rows, hash) = match self.read_collection(&path)? {
            Some((rows, hash)) => (rows, Some(hash)),
            None => (vec![], None),
        };
        rows.extend(incoming.iter().cloned());
        self.write_collection(&path, &rows, hash.as_ref())?;

        Ok(incoming)
    }

    /// fetch every row of a table
    pub fn all(&self, db: &str, table: &str) -> StoreResult<Vec<Value>> {
        let db = DatabaseName::new(db)?;
        let table = TableName::new(table)?;

        let path = names::rows_doc(&db, &table);
        match self.read_collection(&path)? {
            Some((rows, _)) => Ok(rows),
            None => Err(StoreError::TableNotFound {
                database: db.as_str().to_string(),
                table: table.as_str().to_string(),
            }),
        }
    }

    /// fetch a single row by its identifier
    pub fn by_id(&self, db: &str, table: &str, id: &str) -> StoreResult<Value> {
        let rows = self.all(db, table)?;
        rows.into_iter()
            .find(|row| row_id(row) == Some(id))
            .ok_or_else(|| StoreError::RowNotFound {
                database: db.to_string(),
                table: table.to_string(),
                id: id.to_string(),
            })
    }

    /// Delete the rows whose identifiers appear in `ids`.
    ///
    /// An empty `ids` slice empties the whole table. Fails with
    /// `NoRowsMatched` when none of the given identifiers were present.
    /// Returns the number of deleted rows.
    pub fn delete_by_ids(&self, db: &str, table: &str, ids: &[String]) -> StoreResult<usize> {
        let db = DatabaseName::new(db)?;
        let table = TableName::new(table)?;

        let lock = self.table_lock(&db, &table);
        let _guard = lock.lock();

        let path = names::rows_doc(&db, &table);
        let (rows, hash) = self.read_collection(&path)?.ok_or_else(|| {
            StoreError::TableNotFound {
                database: db.as_str().to_string(),
                table: table.as_str().to_string(),
            }
        })?;

        let before = rows.len();
        let kept: Vec<Value> = if ids.is_empty() {
            vec![]
        } else {
            rows.into_iter()
                .filter(|row| {
                    row_id(row).map_or(true, |id| !ids.iter().any(|wanted| wanted.as_str() == id))
                })
                .collect()
        };

        let deleted = before - kept.len();
        if deleted == 0 && !ids.is_empty() {
            return Err(StoreError::NoRowsMatched {
                database: db.as_str().to_string(),
                table: table.as_str().to_string(),
            });
        }

        self.write_collection(&path, &kept, Some(&hash))?;
        Ok(deleted)
    }

    /// Patch a single row.
    ///
    /// `patch` must be a JSON object; its fields are shallow-merged into
    /// the matching row. The `"id"` field is never overwritten. Returns
    /// the updated row.
    pub fn update_by_id(
        &self,
        db: &str,
        table: &str,
        id: &str,
        patch: Value,
    ) -> StoreResult<Value> {
        let db = DatabaseName::new(db)?;
        let table = TableName::new(table)?;

        let patch = match patch {
            Value::Object(obj) => obj,
            other => {
                return Err(StoreError::InvalidRow(format!(
                    "expected an object, got {}",
                    type_name(&other)
                )))
            }
        };

        let lock = self.table_lock(&db, &table);
        let _guard = lock.lock();

        let path = names::rows_doc(&db, &table);
        let (mut rows, hash) = self.read_collection(&path)?.ok_or_else(|| {
            StoreError::TableNotFound {
                database: db.as_str().to_string(),
                table: table.as_str().to_string(),
            }
        })?;

        let mut updated = None;
        for row in &mut rows {
            if row_id(row) != Some(id) {
                continue;
            }
            if let Some(obj) = row.as_object_mut() {
                merge_patch(obj, &patch);
            }
            updated = Some(row.clone());
            break;
        }

        let updated = updated.ok_or_else(|| StoreError::RowNotFound {
            database: db.as_str().to_string(),
            table: table.as_str().to_string(),
            id: id.to_string(),
        })?;

        self.write_collection(&path, &rows, Some(&hash))?;
        Ok(updated)
    }
}

/// extract a row's identifier, if it has a string `"id"` field
fn row_id(row: &Value) -> Option<&str> {
    row.get("id").and_then(Value::as_str)
}

/// shallow merge, leaving the identifier untouched
fn merge_patch(row: &mut Map<String, Value>, patch: &Map<String, Value>) {
    for (key, value) in patch {
        if key == "id" {
            continue;
        }
        row.insert(key.clone(), value.clone());
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
