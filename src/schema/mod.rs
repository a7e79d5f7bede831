//! Schema validation for table definitions.

mod descriptor;

pub use descriptor::{Schema, SchemaError, ScalarType, TypeDescriptor};
