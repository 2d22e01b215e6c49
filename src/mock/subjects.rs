use crate::mock::error::RegistryError;
use crate::mock::schema_store::StoredSchema;
use std::collections::HashMap;

/// Which half of a topic's records a subject describes.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum SubjectRole {
    Key,
    Value,
}

/// Subject name under the topic naming convention.
pub fn topic_subject(topic: &str, role: SubjectRole) -> String {
    match role {
        SubjectRole::Key => format!("{}-key", topic),
        SubjectRole::Value => format!("{}-value", topic),
    }
}

pub fn key_subject(topic: &str) -> String {
    topic_subject(topic, SubjectRole::Key)
}

pub fn value_subject(topic: &str) -> String {
    topic_subject(topic, SubjectRole::Value)
}

/// One registered version of a subject.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VersionEntry {
    pub subject: String,
    pub version: i32,
    pub id: i32,
    pub schema: StoredSchema,
}

/// Subjects and their version lists. A subject exists only while it has at
/// least one version; subjects are listed in creation order.
pub(crate) struct SubjectStore {
    subjects: HashMap<String, Vec<VersionEntry>>,
    order: Vec<String>,
}

impl SubjectStore {
    pub fn new() -> Self {
        SubjectStore {
            subjects: HashMap::new(),
            order: Vec::new(),
        }
    }

    fn entries(&self, subject: &str) -> Result<&Vec<VersionEntry>, RegistryError> {
        self.subjects
            .get(subject)
            .filter(|entries| !entries.is_empty())
            .ok_or_else(|| RegistryError::SubjectNotFound(subject.to_string()))
    }

    /// Appends `schema` under `subject` unless the subject already holds the
    /// same content, in which case the existing entry is returned.
    pub fn register(&mut self, subject: &str, id: i32, schema: &StoredSchema) -> VersionEntry {
        if let Ok(existing) = self.find_by_schema(subject, schema) {
            return existing.clone();
        }
        if !self.subjects.contains_key(subject) {
            self.order.push(subject.to_string());
        }
        let entries = self.subjects.entry(subject.to_string()).or_default();
        let version = entries.iter().map(|e| e.version).max().unwrap_or(0) + 1;
        let entry = VersionEntry {
            subject: subject.to_string(),
            version,
            id,
            schema: schema.clone(),
        };
        entries.push(entry.clone());
        entry
    }

    pub fn subjects(&self) -> Vec<String> {
        self.order.clone()
    }

    pub fn versions(&self, subject: &str) -> Result<Vec<i32>, RegistryError> {
        let mut versions: Vec<i32> = self.entries(subject)?.iter().map(|e| e.version).collect();
        versions.sort_unstable();
        Ok(versions)
    }

    pub fn get_by_version(&self, subject: &str, version: i32) -> Result<&VersionEntry, RegistryError> {
        self.entries(subject)?
            .iter()
            .find(|e| e.version == version)
            .ok_or_else(|| RegistryError::VersionNotFound {
                subject: subject.to_string(),
                version,
            })
    }

    pub fn get_latest(&self, subject: &str) -> Result<&VersionEntry, RegistryError> {
        self.entries(subject)?
            .iter()
            .max_by_key(|e| e.version)
            .ok_or_else(|| RegistryError::SubjectNotFound(subject.to_string()))
    }

    /// Lowest version in `subject` whose content equals `schema`.
    pub fn find_by_schema(
        &self,
        subject: &str,
        schema: &StoredSchema,
    ) -> Result<&VersionEntry, RegistryError> {
        self.entries(subject)?
            .iter()
            .filter(|e| e.schema.same_content(schema))
            .min_by_key(|e| e.version)
            .ok_or_else(|| RegistryError::SchemaNotFound(subject.to_string()))
    }

    pub fn remove(&mut self, subject: &str) -> Result<Vec<i32>, RegistryError> {
        let versions = self.versions(subject)?;
        self.subjects.remove(subject);
        self.order.retain(|s| s != subject);
        Ok(versions)
    }
}
