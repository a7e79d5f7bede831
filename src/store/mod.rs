//! Document-store semantics over the versioned backend.
//!
//! The hierarchy is database -> table -> rows. A database is a namespace
//! holding a `Schema/` and a `Tables/` folder; a table is a schema document
//! plus a row-collection document (one JSON array holding every row).
//! [`Store`] bundles the four managers behind a single cloneable handle.

mod api;
mod database;
mod error;
mod names;
mod rows;
mod schema;
mod table;

pub use api::Store;
pub use database::DatabaseManager;
pub use error::{StoreError, StoreResult};
pub use names::{
    DatabaseName, InvalidNameError, TableName, DOC_EXT, PLACEHOLDER, SCHEMA_DIR, TABLES_DIR,
};
pub use rows::RowStore;
pub use schema::SchemaManager;
pub use table::TableManager;
