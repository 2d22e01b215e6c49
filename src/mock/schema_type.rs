use crate::mock::error::RegistryError;
use serde_json::{Map, Value};
use std::fmt;

/// Schema formats understood by the mock. The wire default is Avro.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum SchemaType {
    #[default]
    Avro,
    Json,
    Protobuf,
}

impl SchemaType {
    pub fn from_wire(schema_type: Option<&str>) -> Result<SchemaType, RegistryError> {
        match schema_type {
            None => Ok(SchemaType::Avro),
            Some(s) if s.eq_ignore_ascii_case("AVRO") => Ok(SchemaType::Avro),
            Some(s) if s.eq_ignore_ascii_case("JSON") => Ok(SchemaType::Json),
            Some(s) if s.eq_ignore_ascii_case("PROTOBUF") => Ok(SchemaType::Protobuf),
            Some(s) => Err(RegistryError::InvalidSchema(format!(
                "unsupported schema type {}",
                s
            ))),
        }
    }

    /// Name sent back in `schemaType`. Avro is implied and omitted, as the
    /// registry does.
    pub fn to_wire(self) -> Option<String> {
        match self {
            SchemaType::Avro => None,
            other => Some(other.to_string()),
        }
    }

    /// Normalized form used for equality. Two schemas are the same registry
    /// content iff their type and canonical form match.
    pub fn canonicalize(self, schema: &str) -> Result<String, RegistryError> {
        match self {
            SchemaType::Avro => {
                apache_avro::Schema::parse_str(schema)
                    .map_err(|e| RegistryError::InvalidSchema(e.to_string()))?;
                // full JSON minus `doc`: defaults, aliases and order are significant
                let value = serde_json::from_str::<Value>(schema)
                    .map_err(|e| RegistryError::InvalidSchema(e.to_string()))?;
                Ok(sorted(strip_avro_docs(value)).to_string())
            }
            SchemaType::Json => serde_json::from_str::<Value>(schema)
                .map(|v| sorted(v).to_string())
                .map_err(|e| RegistryError::InvalidSchema(e.to_string())),
            SchemaType::Protobuf => {
                let normalized = schema.split_whitespace().collect::<Vec<_>>().join(" ");
                if normalized.is_empty() {
                    return Err(RegistryError::InvalidSchema(
                        "empty protobuf schema".to_string(),
                    ));
                }
                Ok(normalized)
            }
        }
    }
}

/// Rebuilds every object with its keys in sorted order.
fn sorted(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> =
                map.into_iter().map(|(k, v)| (k, sorted(v))).collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(entries.into_iter().collect::<Map<String, Value>>())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sorted).collect()),
        other => other,
    }
}

/// Removes `doc` from schema objects and writes `{"type": "int"}` as `"int"`.
/// Field defaults are data, not schema, and are left untouched.
fn strip_avro_docs(value: Value) -> Value {
    match value {
        Value::Object(mut map) => {
            map.remove("doc");
            if map.len() == 1 {
                if let Some(Value::String(primitive)) = map.get("type") {
                    return Value::String(primitive.clone());
                }
            }
            Value::Object(
                map.into_iter()
                    .map(|(k, v)| {
                        let v = if k == "default" { v } else { strip_avro_docs(v) };
                        (k, v)
                    })
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(strip_avro_docs).collect()),
        other => other,
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaType::Avro => write!(f, "AVRO"),
            SchemaType::Json => write!(f, "JSON"),
            SchemaType::Protobuf => write!(f, "PROTOBUF"),
        }
    }
}
