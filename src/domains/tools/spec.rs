//! Structural descriptions of operation parameters and results.
//!
//! A [`TypeSpec`] is the single source for three things: the JSON schema
//! published over OpenAPI and MCP, request validation before a handler
//! runs, and the shape checked on the way out.

use serde_json::{Map, Value, json};

/// The shape of a parameter or return value.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeSpec {
    String,
    Integer {
        minimum: Option<i64>,
        maximum: Option<i64>,
    },
    Number,
    Boolean,
    /// One of a fixed set of strings.
    Enum(Vec<&'static str>),
    /// Value may be absent or null.
    Optional(Box<TypeSpec>),
    List(Box<TypeSpec>),
    Object(Vec<ParamSpec>),
    /// Any JSON value.
    Any,
}

impl TypeSpec {
    pub fn integer() -> Self {
        Self::Integer {
            minimum: None,
            maximum: None,
        }
    }

    pub fn bounded_integer(minimum: i64, maximum: i64) -> Self {
        Self::Integer {
            minimum: Some(minimum),
            maximum: Some(maximum),
        }
    }

    pub fn optional(inner: TypeSpec) -> Self {
        Self::Optional(Box::new(inner))
    }

    pub fn list(inner: TypeSpec) -> Self {
        Self::List(Box::new(inner))
    }

    pub fn object(fields: impl IntoIterator<Item = ParamSpec>) -> Self {
        Self::Object(fields.into_iter().collect())
    }

    pub fn one_of(values: &[&'static str]) -> Self {
        Self::Enum(values.to_vec())
    }

    fn is_optional(&self) -> bool {
        matches!(self, Self::Optional(_))
    }

    /// Render as a JSON Schema (2020-12 dialect, as used by OpenAPI 3.1).
    pub fn json_schema(&self) -> Value {
        match self {
            Self::String => json!({ "type": "string" }),
            Self::Integer { minimum, maximum } => {
                let mut schema = Map::new();
                schema.insert("type".into(), json!("integer"));
                if let Some(min) = minimum {
                    schema.insert("minimum".into(), json!(min));
                }
                if let Some(max) = maximum {
                    schema.insert("maximum".into(), json!(max));
                }
                Value::Object(schema)
            }
            Self::Number => json!({ "type": "number" }),
            Self::Boolean => json!({ "type": "boolean" }),
            Self::Enum(values) => json!({ "type": "string", "enum": values }),
            Self::Optional(inner) => json!({ "anyOf": [inner.json_schema(), { "type": "null" }] }),
            Self::List(inner) => json!({ "type": "array", "items": inner.json_schema() }),
            Self::Object(fields) => Value::Object(object_schema(fields)),
            Self::Any => json!({}),
        }
    }

    /// Check `value` against this shape. `path` names the value in errors.
    pub fn validate(&self, value: &Value, path: &str) -> Result<(), String> {
        match self {
            Self::String if value.is_string() => Ok(()),
            Self::String => Err(mismatch(path, "a string", value)),
            Self::Integer { minimum, maximum } => {
                let n = as_integer(value).ok_or_else(|| mismatch(path, "an integer", value))?;
                if let Some(min) = minimum.filter(|min| n < *min) {
                    return Err(format!("`{path}` must be greater than or equal to {min}"));
                }
                if let Some(max) = maximum.filter(|max| n > *max) {
                    return Err(format!("`{path}` must be less than or equal to {max}"));
                }
                Ok(())
            }
            Self::Number if value.is_number() => Ok(()),
            Self::Number => Err(mismatch(path, "a number", value)),
            Self::Boolean if value.is_boolean() => Ok(()),
            Self::Boolean => Err(mismatch(path, "a boolean", value)),
            Self::Enum(values) => match value.as_str() {
                Some(s) if values.contains(&s) => Ok(()),
                _ => Err(format!(
                    "`{path}` must be one of: {}",
                    values.join(", ")
                )),
            },
            Self::Optional(_) if value.is_null() => Ok(()),
            Self::Optional(inner) => inner.validate(value, path),
            Self::List(inner) => {
                let items = value
                    .as_array()
                    .ok_or_else(|| mismatch(path, "an array", value))?;
                for (i, item) in items.iter().enumerate() {
                    inner.validate(item, &format!("{path}[{i}]"))?;
                }
                Ok(())
            }
            Self::Object(fields) => {
                let map = value
                    .as_object()
                    .ok_or_else(|| mismatch(path, "an object", value))?;
                for field in fields {
                    let field_path = format!("{path}.{}", field.name);
                    match map.get(field.name) {
                        None | Some(Value::Null) if field.is_required() => {
                            return Err(format!("missing required field `{field_path}`"));
                        }
                        None | Some(Value::Null) => {}
                        Some(v) => field.ty.validate(v, &field_path)?,
                    }
                }
                Ok(())
            }
            Self::Any => Ok(()),
        }
    }
}

fn as_integer(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

fn mismatch(path: &str, expected: &str, value: &Value) -> String {
    let found = match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    };
    format!("`{path}` must be {expected}, found {found}")
}

/// A named parameter (or object field) with its shape and optional default.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub ty: TypeSpec,
    pub default: Option<Value>,
}

impl ParamSpec {
    pub fn new(name: &'static str, ty: TypeSpec) -> Self {
        Self {
            name,
            description: "",
            ty,
            default: None,
        }
    }

    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Required when neither optional nor defaulted.
    pub fn is_required(&self) -> bool {
        self.default.is_none() && !self.ty.is_optional()
    }
}

/// Build the `{"type":"object", ...}` schema for a parameter list.
pub fn object_schema(params: &[ParamSpec]) -> Map<String, Value> {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for param in params {
        let mut schema = match param.ty.json_schema() {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        if !param.description.is_empty() {
            schema.insert("description".into(), json!(param.description));
        }
        if let Some(default) = &param.default {
            schema.insert("default".into(), default.clone());
        }
        if param.is_required() {
            required.push(json!(param.name));
        }
        properties.insert(param.name.to_string(), Value::Object(schema));
    }

    let mut schema = Map::new();
    schema.insert("type".into(), json!("object"));
    schema.insert("properties".into(), Value::Object(properties));
    if !required.is_empty() {
        schema.insert("required".into(), Value::Array(required));
    }
    schema
}

/// Validate request arguments and fill in declared defaults.
///
/// A missing body (`null`) is treated as an empty object. Unknown keys
/// are left in place.
pub fn validate_arguments(params: &[ParamSpec], arguments: Value) -> Result<Value, String> {
    let mut map = match arguments {
        Value::Null => Map::new(),
        Value::Object(map) => map,
        other => {
            return Err(mismatch("body", "a JSON object", &other));
        }
    };

    for param in params {
        match map.get(param.name) {
            Some(Value::Null) | None => {
                if let Some(default) = &param.default {
                    map.insert(param.name.to_string(), default.clone());
                } else if !param.ty.is_optional() {
                    return Err(format!("missing required field `{}`", param.name));
                }
            }
            Some(value) => param.ty.validate(value, param.name)?,
        }
    }

    Ok(Value::Object(map))
}
