//! Validated names and the persisted layout.
//!
//! Database and table names end up as path segments in the backend, so
//! they are restricted to prevent traversal and keep the tree portable:
//! 1-64 characters, ASCII alphanumeric plus underscore and hyphen, and the
//! first character must be a letter or underscore.
//!
//! Layout:
//!
//! ```text
//! {database}/Schema/{table}.json   schema document
//! {database}/Tables/{table}.json   row-collection document (a JSON array)
//! {database}/Schema/.gitkeep       placeholder marking the namespace
//! {database}/Tables/.gitkeep
//! ```

use std::fmt;

use thiserror::Error;

use crate::backend::DocPath;

/// namespace holding the row-collection documents
pub const TABLES_DIR: &str = "Tables";
/// namespace holding the schema documents
pub const SCHEMA_DIR: &str = "Schema";
/// empty document that keeps an otherwise-empty namespace materialized
pub const PLACEHOLDER: &str = ".gitkeep";
/// extension of every persisted document
pub const DOC_EXT: &str = ".json";

fn validate_segment(name: &str) -> Result<(), InvalidNameError> {
    if name.is_empty() {
        return Err(InvalidNameError::Empty);
    }
    if name.len() > 64 {
        return Err(InvalidNameError::TooLong(name.len()));
    }

    let first = name.chars().next().unwrap_or_default();
    if !first.is_ascii_alphabetic() && first != '_' {
        return Err(InvalidNameError::InvalidStart(first));
    }

    for (i, c) in name.chars().enumerate() {
        if !c.is_ascii_alphanumeric() && c != '_' && c != '-' {
            return Err(InvalidNameError::InvalidCharacter { char: c, position: i });
        }
    }

    Ok(())
}

/// a validated database name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DatabaseName(String);

impl DatabaseName {
    /// create a new DatabaseName, validating the input
    pub fn new(name: impl Into<String>) -> Result<Self, InvalidNameError> {
        let name = name.into();
        validate_segment(&name)?;
        Ok(Self(name))
    }

    /// get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DatabaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for DatabaseName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// a validated table name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableName(String);

impl TableName {
    /// create a new TableName, validating the input
    pub fn new(name: impl Into<String>) -> Result<Self, InvalidNameError> {
        let name = name.into();
        validate_segment(&name)?;
        Ok(Self(name))
    }

    /// get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for TableName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// error type for invalid database/table names
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidNameError {
    #[error("name cannot be empty")]
    Empty,

    #[error("name too long: {0} characters")]
    TooLong(usize),

    #[error("name cannot start with '{0}'")]
    InvalidStart(char),

    #[error("invalid character '{char}' at position {position}")]
    InvalidCharacter { char: char, position: usize },
}

// Path construction. The segments below are either compile-time constants
// or names that passed validation above, so these cannot produce an
// invalid DocPath.

/// the database's root namespace
pub(crate) fn database_dir(db: &DatabaseName) -> DocPath {
    DocPath::from_validated(db.as_str().to_string())
}

/// the namespace holding a database's row-collection documents
pub(crate) fn tables_dir(db: &DatabaseName) -> DocPath {
    DocPath::from_validated(format!("{}/{}", db, TABLES_DIR))
}

/// placeholder document inside one of the database's sub-namespaces
pub(crate) fn placeholder_doc(db: &DatabaseName, sub: &str) -> DocPath {
    DocPath::from_validated(format!("{}/{}/{}", db, sub, PLACEHOLDER))
}

/// a table's schema document
pub(crate) fn schema_doc(db: &DatabaseName, table: &TableName) -> DocPath {
    DocPath::from_validated(format!("{}/{}/{}{}", db, SCHEMA_DIR, table, DOC_EXT))
}

/// a table's row-collection document
pub(crate) fn rows_doc(db: &DatabaseName, table: &TableName) -> DocPath {
    DocPath::from_validated(format!("{}/{}/{}{}", db, TABLES_DIR, table, DOC_EXT))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        assert!(DatabaseName::new("shop").is_ok());
        assert!(DatabaseName::new("my_app-v2").is_ok());
        assert!(TableName::new("_private").is_ok());
        assert!(TableName::new("Users123").is_ok());
    }

    #[test]
    fn test_invalid_names() {
        assert!(DatabaseName::new("").is_err());
        assert!(DatabaseName::new("123shop").is_err()); // starts with digit
        assert!(DatabaseName::new("-shop").is_err());
        assert!(TableName::new("users/admin").is_err()); // contains slash
        assert!(TableName::new("users table").is_err()); // contains space
        assert!(TableName::new("a".repeat(65)).is_err()); // too long
        assert!(TableName::new("..").is_err());
    }

    #[test]
    fn test_layout_paths() {
        let db = DatabaseName::new("shop").unwrap();
        let table = TableName::new("users").unwrap();

        assert_eq!(schema_doc(&db, &table).as_str(), "shop/Schema/users.json");
        assert_eq!(rows_doc(&db, &table).as_str(), "shop/Tables/users.json");
        assert_eq!(tables_dir(&db).as_str(), "shop/Tables");
        assert_eq!(
            placeholder_doc(&db, SCHEMA_DIR).as_str(),
            "shop/Schema/.gitkeep"
        );
    }
}
