//! Table schema descriptors and validation.
//!
//! A schema is a JSON object mapping field names to type descriptors. The
//! descriptor grammar:
//!
//! - a scalar tag: `"string" | "integer" | "boolean" | "array" | "object"`
//! - a nested object, validated recursively (a record)
//! - an array literal whose single element is a nested object (an array of
//!   records of that shape)
//! - an array literal of primitive tags (`string`/`integer`/`boolean` only)
//!
//! Parsing is the validation: [`Schema::parse`] either produces the typed
//! descriptor tree or an error naming the offending field. There is no
//! recursion depth guard - schemas are operator-authored, not adversarial.

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;

/// scalar type tags accepted at descriptor leaves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    String,
    Integer,
    Boolean,
    Array,
    Object,
}

impl ScalarType {
    /// parse a scalar tag
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "string" => Some(Self::String),
            "integer" => Some(Self::Integer),
            "boolean" => Some(Self::Boolean),
            "array" => Some(Self::Array),
            "object" => Some(Self::Object),
            _ => None,
        }
    }

    /// whether this tag is allowed inside an array literal
    pub fn is_primitive(self) -> bool {
        matches!(self, Self::String | Self::Integer | Self::Boolean)
    }

    /// the tag string
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

/// a parsed type descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescriptor {
    /// one of the five scalar tags
    Scalar(ScalarType),
    /// a nested object of named fields
    Record(BTreeMap<String, TypeDescriptor>),
    /// an array whose elements are records of the given shape
    RecordArray(BTreeMap<String, TypeDescriptor>),
    /// an array of primitive tags
    ScalarArray(Vec<ScalarType>),
}

impl TypeDescriptor {
    /// parse one descriptor; `field` is the dotted path used in errors
    fn parse(field: &str, value: &Value) -> Result<Self, SchemaError> {
        match value {
            Value::Object(map) => Ok(Self::Record(parse_fields(field, map)?)),
            Value::Array(items) => {
                if items.len() == 1 {
                    if let Value::Object(map) = &items[0] {
                        return Ok(Self::RecordArray(parse_fields(field, map)?));
                    }
                }
                let mut tags = Vec::with_capacity(items.len());
                for item in items {
                    let tag = item
                        .as_str()
                        .and_then(ScalarType::parse)
                        .filter(|t| t.is_primitive())
                        .ok_or_else(|| SchemaError::InvalidArrayType {
                            field: field.to_string(),
                            found: render(item),
                        })?;
                    tags.push(tag);
                }
                Ok(Self::ScalarArray(tags))
            }
            Value::String(tag) => match ScalarType::parse(tag) {
                Some(scalar) => Ok(Self::Scalar(scalar)),
                None => Err(SchemaError::InvalidType {
                    field: field.to_string(),
                    found: tag.clone(),
                }),
            },
            other => Err(SchemaError::InvalidType {
                field: field.to_string(),
                found: render(other),
            }),
        }
    }
}

fn parse_fields(
    parent: &str,
    map: &serde_json::Map<String, Value>,
) -> Result<BTreeMap<String, TypeDescriptor>, SchemaError> {
    let mut fields = BTreeMap::new();
    for (name, descriptor) in map {
        let path = if parent.is_empty() {
            name.clone()
        } else {
            format!("{}.{}", parent, name)
        };
        fields.insert(name.clone(), TypeDescriptor::parse(&path, descriptor)?);
    }
    Ok(fields)
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// a validated table schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    fields: BTreeMap<String, TypeDescriptor>,
}

impl Schema {
    /// Parse and validate a schema document.
    ///
    /// The top level must be a JSON object; every field's descriptor must
    /// match the grammar above. On failure the error names the offending
    /// field path and the invalid tag.
    pub fn parse(value: &Value) -> Result<Self, SchemaError> {
        let map = value.as_object().ok_or(SchemaError::NotAnObject)?;
        Ok(Self {
            fields: parse_fields("", map)?,
        })
    }

    /// validate without keeping the parsed form
    pub fn validate(value: &Value) -> Result<(), SchemaError> {
        Self::parse(value).map(|_| ())
    }

    /// get a field's descriptor by name
    pub fn field(&self, name: &str) -> Option<&TypeDescriptor> {
        self.fields.get(name)
    }

    /// field names in order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// number of top-level fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// whether the schema has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// schema validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("schema must be a JSON object")]
    NotAnObject,

    #[error("invalid type '{found}' for field '{field}'")]
    InvalidType { field: String, found: String },

    #[error("invalid array type '{found}' in field '{field}'")]
    InvalidArrayType { field: String, found: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_fields() {
        let schema = Schema::parse(&json!({
            "name": "string",
            "age": "integer",
            "active": "boolean",
            "tags": "array",
            "meta": "object"
        }))
        .unwrap();

        assert_eq!(schema.len(), 5);
        assert_eq!(
            schema.field("age"),
            Some(&TypeDescriptor::Scalar(ScalarType::Integer))
        );
    }

    #[test]
    fn test_invalid_scalar_tag() {
        let err = Schema::parse(&json!({"age": "number"})).unwrap_err();
        assert_eq!(
            err,
            SchemaError::InvalidType {
                field: "age".to_string(),
                found: "number".to_string()
            }
        );
    }

    #[test]
    fn test_non_string_descriptor() {
        let err = Schema::parse(&json!({"age": 42})).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidType { field, .. } if field == "age"));
    }

    #[test]
    fn test_nested_record() {
        let schema = Schema::parse(&json!({
            "address": {
                "city": "string",
                "zip": "integer",
                "geo": { "lat": "string", "lng": "string" }
            }
        }))
        .unwrap();

        match schema.field("address").unwrap() {
            TypeDescriptor::Record(fields) => {
                assert!(matches!(fields.get("geo"), Some(TypeDescriptor::Record(_))));
            }
            other => panic!("expected record, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_error_names_dotted_path() {
        let err = Schema::parse(&json!({
            "address": { "city": "string", "zip": "postcode" }
        }))
        .unwrap_err();

        assert_eq!(
            err,
            SchemaError::InvalidType {
                field: "address.zip".to_string(),
                found: "postcode".to_string()
            }
        );
    }

    #[test]
    fn test_array_of_records() {
        let schema = Schema::parse(&json!({
            "items": [{ "sku": "string", "qty": "integer" }]
        }))
        .unwrap();

        assert!(matches!(
            schema.field("items"),
            Some(TypeDescriptor::RecordArray(fields)) if fields.len() == 2
        ));
    }

    #[test]
    fn test_array_of_primitives() {
        let schema = Schema::parse(&json!({
            "labels": ["string", "string"],
            "mixed": ["string", "integer", "boolean"]
        }))
        .unwrap();

        assert_eq!(
            schema.field("labels"),
            Some(&TypeDescriptor::ScalarArray(vec![
                ScalarType::String,
                ScalarType::String
            ]))
        );
    }

    #[test]
    fn test_array_rejects_non_primitive_tags() {
        // "object" and "array" are valid scalar tags but not inside arrays
        let err = Schema::parse(&json!({"labels": ["string", "object"]})).unwrap_err();
        assert_eq!(
            err,
            SchemaError::InvalidArrayType {
                field: "labels".to_string(),
                found: "object".to_string()
            }
        );

        let err = Schema::parse(&json!({"labels": [1]})).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidArrayType { field, .. } if field == "labels"));
    }

    #[test]
    fn test_empty_array_literal_is_accepted() {
        // no elements, nothing to check
        let schema = Schema::parse(&json!({"anything": []})).unwrap();
        assert_eq!(
            schema.field("anything"),
            Some(&TypeDescriptor::ScalarArray(vec![]))
        );
    }

    #[test]
    fn test_record_array_with_invalid_inner_field() {
        let err = Schema::parse(&json!({
            "items": [{ "sku": "string", "qty": "quantity" }]
        }))
        .unwrap_err();

        assert!(matches!(err, SchemaError::InvalidType { field, .. } if field == "items.qty"));
    }

    #[test]
    fn test_top_level_must_be_object() {
        assert_eq!(
            Schema::parse(&json!(["string"])).unwrap_err(),
            SchemaError::NotAnObject
        );
        assert_eq!(Schema::parse(&json!("string")).unwrap_err(), SchemaError::NotAnObject);
    }

    #[test]
    fn test_empty_schema_is_valid() {
        let schema = Schema::parse(&json!({})).unwrap();
        assert!(schema.is_empty());
    }
}
