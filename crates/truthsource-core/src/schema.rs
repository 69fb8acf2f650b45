//! Response validators carried on adapters for the Gateway.
//!
//! The adapter core never validates what it fetches; it only exposes the
//! configured validator through [`DataSource::schema`](crate::DataSource::schema)
//! so the Gateway can check values before they enter consensus.

use std::fmt::{Debug, Display, Formatter};

use serde_json::{Map, Value};

/// Validation failure with a JSON-pointer-like path to the offending value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{path}: {message}")]
pub struct SchemaViolation {
    pub path: String,
    pub message: String,
}

impl SchemaViolation {
    fn at(path: &str, message: impl Into<String>) -> Self {
        Self {
            path: path.to_owned(),
            message: message.into(),
        }
    }
}

/// Validator applied by the Gateway to fetched values.
pub trait ResponseSchema: Debug + Send + Sync {
    fn validate(&self, value: &Value) -> Result<(), SchemaViolation>;
}

/// Validator for a subset of JSON Schema: `type`, `required`, `properties`,
/// `items` and `enum`.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonSchema {
    schema: Map<String, Value>,
}

impl JsonSchema {
    pub fn new(schema: Value) -> Result<Self, SchemaViolation> {
        match schema {
            Value::Object(schema) => Ok(Self { schema }),
            _ => Err(SchemaViolation::at("$", "schema must be an object")),
        }
    }

    pub fn as_value(&self) -> Value {
        Value::Object(self.schema.clone())
    }
}

impl ResponseSchema for JsonSchema {
    fn validate(&self, value: &Value) -> Result<(), SchemaViolation> {
        validate_value(value, &self.schema, "$")
    }
}

fn validate_value(
    value: &Value,
    schema: &Map<String, Value>,
    path: &str,
) -> Result<(), SchemaViolation> {
    if let Some(schema_type) = schema.get("type") {
        validate_type(value, schema_type, path)?;
    }

    if let Some(allowed) = schema.get("enum").and_then(Value::as_array) {
        if !allowed.contains(value) {
            return Err(SchemaViolation::at(
                path,
                format!("value {value} is not one of the allowed values"),
            ));
        }
    }

    if let (Some(required), Value::Object(obj)) = (schema.get("required"), value) {
        if let Some(required_arr) = required.as_array() {
            for field in required_arr.iter().filter_map(Value::as_str) {
                if !obj.contains_key(field) {
                    return Err(SchemaViolation::at(
                        &format!("{path}/{field}"),
                        format!("required field '{field}' is missing"),
                    ));
                }
            }
        }
    }

    if let (Some(properties), Value::Object(obj)) = (schema.get("properties"), value) {
        if let Some(props_obj) = properties.as_object() {
            for (key, prop_schema) in props_obj {
                if let (Some(prop_value), Some(prop_schema_obj)) =
                    (obj.get(key), prop_schema.as_object())
                {
                    validate_value(prop_value, prop_schema_obj, &format!("{path}/{key}"))?;
                }
            }
        }
    }

    if let (Some(items), Value::Array(arr)) = (schema.get("items"), value) {
        if let Some(items_schema) = items.as_object() {
            for (index, item) in arr.iter().enumerate() {
                validate_value(item, items_schema, &format!("{path}/{index}"))?;
            }
        }
    }

    Ok(())
}

fn validate_type(value: &Value, schema_type: &Value, path: &str) -> Result<(), SchemaViolation> {
    let type_str = schema_type
        .as_str()
        .ok_or_else(|| SchemaViolation::at(path, "schema type must be a string"))?;

    let matches = match (type_str, value) {
        ("object", Value::Object(_)) => true,
        ("array", Value::Array(_)) => true,
        ("string", Value::String(_)) => true,
        ("integer", Value::Number(n)) => n.is_i64() || n.is_u64(),
        ("number", Value::Number(_)) => true,
        ("boolean", Value::Bool(_)) => true,
        ("null", Value::Null) => true,
        _ => false,
    };

    if !matches {
        return Err(SchemaViolation::at(
            path,
            format!(
                "expected type '{type_str}', found '{}'",
                ValueKind::of(value)
            ),
        ));
    }

    Ok(())
}

/// Runtime type tag of a dynamically-typed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

impl ValueKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Boolean,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }

    /// Object or array.
    pub const fn is_structured(self) -> bool {
        matches!(self, Self::Array | Self::Object)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

impl Display for ValueKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
