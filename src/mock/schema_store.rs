use crate::mock::error::RegistryError;
use crate::mock::schema_type::SchemaType;
use std::collections::HashMap;

/// A schema as registered: the text the caller sent plus its canonical form.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct StoredSchema {
    pub schema_type: SchemaType,
    pub text: String,
    pub canonical: String,
}

impl StoredSchema {
    pub fn parse(schema_type: SchemaType, text: &str) -> Result<StoredSchema, RegistryError> {
        let canonical = schema_type.canonicalize(text)?;
        Ok(StoredSchema {
            schema_type,
            text: text.to_string(),
            canonical,
        })
    }

    pub fn same_content(&self, other: &StoredSchema) -> bool {
        self.schema_type == other.schema_type && self.canonical == other.canonical
    }
}

/// Registry-wide id assignment. Ids start at 1, follow registration order and
/// are never reclaimed.
pub(crate) struct SchemaStore {
    schema_id_index: HashMap<i32, StoredSchema>,
    schema_index: HashMap<(SchemaType, String), i32>,
    next_id: i32,
}

impl SchemaStore {
    pub fn new() -> Self {
        SchemaStore {
            schema_id_index: HashMap::new(),
            schema_index: HashMap::new(),
            next_id: 1,
        }
    }

    pub fn register_schema(&mut self, schema: &StoredSchema) -> Result<i32, RegistryError> {
        let key = (schema.schema_type, schema.canonical.clone());
        if let Some(id) = self.schema_index.get(&key) {
            return Ok(*id);
        }
        let id = self.next_id;
        self.next_id = id.checked_add(1).ok_or(RegistryError::IdsExhausted)?;
        self.schema_index.insert(key, id);
        self.schema_id_index.insert(id, schema.clone());
        log::debug!("assigned id {} to new {} schema", id, schema.schema_type);
        Ok(id)
    }

    pub fn get_schema_by_id(&self, id: i32) -> Result<&StoredSchema, RegistryError> {
        self.schema_id_index
            .get(&id)
            .ok_or(RegistryError::IdNotFound(id))
    }
}
