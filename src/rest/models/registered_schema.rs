use crate::rest::models;
use serde::{Deserialize, Serialize};

/// RegisteredSchema : Registered schema
#[derive(Clone, Default, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct RegisteredSchema {
    /// Unique identifier of the schema
    #[serde(rename = "id", skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    /// Subject
    #[serde(rename = "subject", skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Version number
    #[serde(rename = "version", skip_serializing_if = "Option::is_none")]
    pub version: Option<i32>,
    /// Schema type
    #[serde(rename = "schemaType", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    /// Schema definition string
    #[serde(rename = "schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
}

impl RegisteredSchema {
    pub fn new(id: i32) -> RegisteredSchema {
        RegisteredSchema {
            id: Some(id),
            subject: None,
            version: None,
            schema_type: None,
            schema: None,
        }
    }

    pub fn to_schema(&self) -> models::Schema {
        models::Schema {
            schema_type: self.schema_type.clone(),
            schema: self.schema.clone().unwrap_or_default(),
        }
    }
}
