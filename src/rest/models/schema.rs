use crate::rest::models;
use serde::{Deserialize, Serialize};

/// Schema : Schema
#[derive(Clone, Default, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Schema {
    /// Schema type
    #[serde(rename = "schemaType", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    /// Schema definition string
    #[serde(rename = "schema")]
    pub schema: String,
}

impl Schema {
    /// Schema
    pub fn new(schema_type: Option<String>, schema: String) -> Schema {
        Schema {
            schema_type,
            schema,
        }
    }

    /// An Avro schema; the registry treats a missing type as Avro.
    pub fn avro(schema: impl Into<String>) -> Schema {
        Schema::new(None, schema.into())
    }

    pub fn to_registered_schema(
        &self,
        id: Option<i32>,
        subject: Option<String>,
        version: Option<i32>,
    ) -> models::RegisteredSchema {
        models::RegisteredSchema {
            id,
            subject,
            version,
            schema_type: self.schema_type.clone(),
            schema: Some(self.schema.clone()),
        }
    }
}
