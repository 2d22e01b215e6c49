use crate::mock::error::RegistryError;
use crate::mock::registry::MockRegistry;
use crate::mock::schema_store::StoredSchema;
use crate::mock::schema_type::SchemaType;
use crate::mock::subjects::VersionEntry;
use crate::rest::apis::error_message::ErrorMessage;
use crate::rest::models::{RegisteredSchema, Schema};
use reqwest::StatusCode;
use serde_json::{Value, json};
use std::sync::Arc;

/// An HTTP-shaped answer: status plus JSON body.
#[derive(Clone, Debug, PartialEq)]
pub struct MockResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl MockResponse {
    pub fn ok(body: Value) -> Self {
        MockResponse {
            status: StatusCode::OK,
            body,
        }
    }

    pub fn error(err: &RegistryError) -> Self {
        MockResponse {
            status: err.status(),
            body: json!(ErrorMessage::new(err.error_code(), err.message())),
        }
    }

    /// Answer for requests no route matches.
    pub fn no_route() -> Self {
        MockResponse {
            status: StatusCode::NOT_FOUND,
            body: json!(ErrorMessage::new(404, "HTTP 404 Not Found")),
        }
    }

    fn from_result(result: Result<Value, RegistryError>) -> Self {
        match result {
            Ok(body) => MockResponse::ok(body),
            Err(err) => {
                match &err {
                    RegistryError::InvalidSchema(_)
                    | RegistryError::InvalidVersion(_)
                    | RegistryError::IdsExhausted => {
                        log::warn!("rejecting request: {}", err)
                    }
                    _ => log::debug!("{}", err),
                }
                MockResponse::error(&err)
            }
        }
    }
}

enum VersionSelector {
    Latest,
    Number(i32),
}

impl VersionSelector {
    fn parse(version: &str) -> Result<VersionSelector, RegistryError> {
        if version == "latest" {
            return Ok(VersionSelector::Latest);
        }
        match version.parse::<i32>() {
            Ok(-1) => Ok(VersionSelector::Latest),
            // 0 and other negatives are never assigned, so the lookup answers
            // 40401 or 40402 like any other missing version
            Ok(v) => Ok(VersionSelector::Number(v)),
            Err(_) => Err(RegistryError::InvalidVersion(version.to_string())),
        }
    }
}

fn parse_schema(body: &str) -> Result<StoredSchema, RegistryError> {
    let request: Schema =
        serde_json::from_str(body).map_err(|e| RegistryError::InvalidSchema(e.to_string()))?;
    let schema_type = SchemaType::from_wire(request.schema_type.as_deref())?;
    StoredSchema::parse(schema_type, &request.schema)
}

fn metadata(entry: &VersionEntry) -> Value {
    json!(RegisteredSchema {
        id: Some(entry.id),
        subject: Some(entry.subject.clone()),
        version: Some(entry.version),
        schema_type: entry.schema.schema_type.to_wire(),
        schema: Some(entry.schema.text.clone()),
    })
}

/// Maps the registry's REST operations onto [`MockRegistry`]. Path parameters
/// arrive already percent-decoded; bodies arrive as raw JSON text.
#[derive(Clone)]
pub struct RegistryHandler {
    registry: Arc<MockRegistry>,
}

impl RegistryHandler {
    pub fn new(registry: Arc<MockRegistry>) -> Self {
        RegistryHandler { registry }
    }

    pub fn registry(&self) -> &Arc<MockRegistry> {
        &self.registry
    }

    /// `POST /subjects/{subject}/versions`
    pub fn register(&self, subject: &str, body: &str) -> MockResponse {
        log::debug!("register schema under subject {}", subject);
        MockResponse::from_result(
            parse_schema(body)
                .and_then(|schema| self.registry.register_to_subject(subject, &schema))
                .map(|entry| json!(RegisteredSchema::new(entry.id))),
        )
    }

    /// `GET /schemas/ids/{id}`
    pub fn get_schema_by_id(&self, id: &str) -> MockResponse {
        log::debug!("get schema by id {}", id);
        let Ok(id) = id.parse::<i32>() else {
            // only numeric ids match the registry's route
            return MockResponse::no_route();
        };
        MockResponse::from_result(self.registry.get_schema_by_id(id).map(|schema| {
            json!(Schema::new(schema.schema_type.to_wire(), schema.text))
        }))
    }

    /// `GET /subjects`
    pub fn list_subjects(&self) -> MockResponse {
        MockResponse::ok(json!(self.registry.get_all_subjects()))
    }

    /// `GET /subjects/{subject}/versions`
    pub fn list_versions(&self, subject: &str) -> MockResponse {
        log::debug!("list versions of subject {}", subject);
        MockResponse::from_result(self.registry.get_all_versions(subject).map(|v| json!(v)))
    }

    fn resolve_version(&self, subject: &str, version: &str) -> Result<VersionEntry, RegistryError> {
        match VersionSelector::parse(version)? {
            VersionSelector::Latest => self.registry.get_latest_version_metadata(subject),
            VersionSelector::Number(v) => self.registry.get_version_metadata(subject, v),
        }
    }

    /// `GET /subjects/{subject}/versions/{version}`, where `version` may be
    /// `latest` or `-1`.
    pub fn get_version(&self, subject: &str, version: &str) -> MockResponse {
        log::debug!("get version {} of subject {}", version, subject);
        MockResponse::from_result(
            self.resolve_version(subject, version)
                .map(|entry| metadata(&entry)),
        )
    }

    /// `GET /subjects/{subject}/versions/{version}/schema`
    pub fn get_version_schema(&self, subject: &str, version: &str) -> MockResponse {
        log::debug!("get raw schema of version {} of subject {}", version, subject);
        MockResponse::from_result(self.resolve_version(subject, version).map(|entry| {
            serde_json::from_str(&entry.schema.text).unwrap_or(Value::String(entry.schema.text))
        }))
    }

    /// `POST /subjects/{subject}`: the version and id under which `subject`
    /// holds the schema in the body.
    pub fn lookup(&self, subject: &str, body: &str) -> MockResponse {
        log::debug!("look up schema in subject {}", subject);
        MockResponse::from_result(
            parse_schema(body)
                .and_then(|schema| self.registry.find(subject, &schema))
                .map(|entry| metadata(&entry)),
        )
    }

    /// `DELETE /subjects/{subject}`
    pub fn delete_subject(&self, subject: &str) -> MockResponse {
        log::debug!("delete subject {}", subject);
        MockResponse::from_result(self.registry.delete_subject(subject).map(|v| json!(v)))
    }
}
