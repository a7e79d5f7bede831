//! ForgeDB - A JSON document store over a versioned file tree
//!
//! This crate provides a minimal multi-tenant document store whose durable
//! backend is a version-controlled file tree rather than a purpose-built
//! storage engine. Databases are folders, tables are a schema file plus a
//! row-collection file, and every mutation is a read-modify-write cycle
//! over a whole JSON document, conditioned on the backend's content-hash
//! token.
//!
//! # Example
//!
//! ```no_run
//! use forgedb::store::Store;
//! use serde_json::json;
//!
//! let store = Store::open("./my_data").unwrap();
//! store.databases().create("shop").unwrap();
//! store.tables().create("shop", "users", &json!({"name": "string", "age": "integer"})).unwrap();
//! store.rows().append("shop", "users", json!({"name": "Ann", "age": 30})).unwrap();
//! ```

pub mod backend;
pub mod http;
pub mod schema;
pub mod store;
