use crate::mock::error::RegistryError;
use crate::mock::schema_store::{SchemaStore, StoredSchema};
use crate::mock::subjects::{SubjectStore, VersionEntry, key_subject, value_subject};
use std::sync::{Mutex, MutexGuard, PoisonError};

struct RegistryState {
    store: SchemaStore,
    subjects: SubjectStore,
}

/// The in-memory registry behind a mock instance. Every operation runs under
/// a single lock, so registrations and deletions are atomic.
pub struct MockRegistry {
    state: Mutex<RegistryState>,
}

impl Default for MockRegistry {
    fn default() -> Self {
        MockRegistry::new()
    }
}

impl MockRegistry {
    pub fn new() -> Self {
        MockRegistry {
            state: Mutex::new(RegistryState {
                store: SchemaStore::new(),
                subjects: SubjectStore::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        // every operation leaves the state consistent, so a panic elsewhere
        // cannot have left it half-written
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Global id for `schema`, assigning one if the content is new.
    pub fn register_schema(&self, schema: &StoredSchema) -> Result<i32, RegistryError> {
        self.lock().store.register_schema(schema)
    }

    pub fn get_schema_by_id(&self, id: i32) -> Result<StoredSchema, RegistryError> {
        self.lock().store.get_schema_by_id(id).cloned()
    }

    pub fn register_to_subject(
        &self,
        subject: &str,
        schema: &StoredSchema,
    ) -> Result<VersionEntry, RegistryError> {
        let mut state = self.lock();
        let id = state.store.register_schema(schema)?;
        let entry = state.subjects.register(subject, id, schema);
        log::debug!(
            "subject {} version {} holds schema id {}",
            subject,
            entry.version,
            entry.id
        );
        Ok(entry)
    }

    pub fn get_all_subjects(&self) -> Vec<String> {
        self.lock().subjects.subjects()
    }

    pub fn get_all_versions(&self, subject: &str) -> Result<Vec<i32>, RegistryError> {
        self.lock().subjects.versions(subject)
    }

    pub fn get_version_metadata(
        &self,
        subject: &str,
        version: i32,
    ) -> Result<VersionEntry, RegistryError> {
        self.lock().subjects.get_by_version(subject, version).cloned()
    }

    pub fn get_latest_version_metadata(&self, subject: &str) -> Result<VersionEntry, RegistryError> {
        self.lock().subjects.get_latest(subject).cloned()
    }

    /// Version and id of `schema` in `subject`.
    pub fn find(&self, subject: &str, schema: &StoredSchema) -> Result<VersionEntry, RegistryError> {
        self.lock().subjects.find_by_schema(subject, schema).cloned()
    }

    pub fn find_version(&self, subject: &str, schema: &StoredSchema) -> Result<i32, RegistryError> {
        self.find(subject, schema).map(|e| e.version)
    }

    pub fn find_id(&self, subject: &str, schema: &StoredSchema) -> Result<i32, RegistryError> {
        self.find(subject, schema).map(|e| e.id)
    }

    /// Removes `subject` and returns the versions it held. Ids stay resolvable.
    pub fn delete_subject(&self, subject: &str) -> Result<Vec<i32>, RegistryError> {
        let versions = self.lock().subjects.remove(subject)?;
        log::debug!("deleted subject {} with versions {:?}", subject, versions);
        Ok(versions)
    }

    pub fn register_key_schema(
        &self,
        topic: &str,
        schema: &StoredSchema,
    ) -> Result<i32, RegistryError> {
        self.register_to_subject(&key_subject(topic), schema)
            .map(|e| e.id)
    }

    pub fn register_value_schema(
        &self,
        topic: &str,
        schema: &StoredSchema,
    ) -> Result<i32, RegistryError> {
        self.register_to_subject(&value_subject(topic), schema)
            .map(|e| e.id)
    }

    pub fn delete_key_schema(&self, topic: &str) -> Result<Vec<i32>, RegistryError> {
        self.delete_subject(&key_subject(topic))
    }

    pub fn delete_value_schema(&self, topic: &str) -> Result<Vec<i32>, RegistryError> {
        self.delete_subject(&value_subject(topic))
    }
}
