use crate::mock::handler::{MockResponse, RegistryHandler};
use crate::mock::registry::MockRegistry;
use crate::rest::apis::{Error, ResponseContent};
use crate::rest::client_config;
use crate::rest::models::{RegisteredSchema, Schema};
use crate::rest::schema_registry_client::Client;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// A [`Client`] that calls the mock's request handlers directly instead of
/// going over HTTP. Responses still pass through the wire format, so errors
/// carry the same status and `error_code` as over the network.
#[derive(Clone)]
pub struct MockSchemaRegistryClient {
    handler: RegistryHandler,
    config: client_config::ClientConfig,
}

impl MockSchemaRegistryClient {
    pub fn from_registry(registry: Arc<MockRegistry>) -> Self {
        MockSchemaRegistryClient {
            handler: RegistryHandler::new(registry),
            config: client_config::ClientConfig::default(),
        }
    }

    pub fn registry(&self) -> &Arc<MockRegistry> {
        self.handler.registry()
    }
}

fn into_result<T: DeserializeOwned>(resp: MockResponse) -> Result<T, Error> {
    if resp.status.is_success() {
        Ok(serde_json::from_value(resp.body)?)
    } else {
        Err(Error::ResponseError(ResponseContent {
            status: resp.status,
            content: resp.body.to_string(),
            entity: serde_json::from_value(resp.body).ok(),
        }))
    }
}

impl Client for MockSchemaRegistryClient {
    fn new(config: client_config::ClientConfig) -> Self {
        MockSchemaRegistryClient {
            handler: RegistryHandler::new(Arc::new(MockRegistry::new())),
            config,
        }
    }

    fn config(&self) -> &client_config::ClientConfig {
        &self.config
    }

    async fn register_schema(
        &self,
        subject: &str,
        schema: &Schema,
    ) -> Result<RegisteredSchema, Error> {
        let body = serde_json::to_string(schema)?;
        let rs: RegisteredSchema = into_result(self.handler.register(subject, &body))?;
        Ok(schema.to_registered_schema(rs.id, Some(subject.to_string()), rs.version))
    }

    async fn get_by_id(&self, id: i32) -> Result<Schema, Error> {
        into_result(self.handler.get_schema_by_id(&id.to_string()))
    }

    async fn get_by_schema(
        &self,
        subject: &str,
        schema: &Schema,
    ) -> Result<RegisteredSchema, Error> {
        let body = serde_json::to_string(schema)?;
        into_result(self.handler.lookup(subject, &body))
    }

    async fn get_version(&self, subject: &str, version: i32) -> Result<RegisteredSchema, Error> {
        into_result(self.handler.get_version(subject, &version.to_string()))
    }

    async fn get_latest_version(&self, subject: &str) -> Result<RegisteredSchema, Error> {
        into_result(self.handler.get_version(subject, "latest"))
    }

    async fn get_all_versions(&self, subject: &str) -> Result<Vec<i32>, Error> {
        into_result(self.handler.list_versions(subject))
    }

    async fn get_all_subjects(&self) -> Result<Vec<String>, Error> {
        into_result(self.handler.list_subjects())
    }

    async fn delete_subject(&self, subject: &str) -> Result<Vec<i32>, Error> {
        into_result(self.handler.delete_subject(subject))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    fn schema(name: &str) -> Schema {
        Schema::avro(format!(
            r#"{{"type":"record","name":"{}","fields":[]}}"#,
            name
        ))
    }

    #[tokio::test]
    async fn test_get_subjects() {
        let config = client_config::ClientConfig::default();
        let client = MockSchemaRegistryClient::new(config);
        let subjects = client.get_all_subjects().await.unwrap();
        assert!(subjects.is_empty());
    }

    #[tokio::test]
    async fn test_register_and_lookup() {
        let client = MockSchemaRegistryClient::new(client_config::ClientConfig::default());
        let rs = client.register_schema("s-value", &schema("a")).await.unwrap();
        assert_eq!(rs.id, Some(1));
        assert_eq!(rs.subject.as_deref(), Some("s-value"));

        let found = client.get_by_schema("s-value", &schema("a")).await.unwrap();
        assert_eq!((found.id, found.version), (Some(1), Some(1)));
        assert_eq!(client.get_by_id(1).await.unwrap(), schema("a"));

        client.register_schema("s-value", &schema("b")).await.unwrap();
        let latest = client.get_latest_version("s-value").await.unwrap();
        assert_eq!(latest.version, Some(2));
        assert_eq!(client.get_version("s-value", 1).await.unwrap().id, Some(1));
    }

    #[tokio::test]
    async fn test_errors_keep_wire_shape() {
        let client = MockSchemaRegistryClient::new(client_config::ClientConfig::default());
        let err = client.get_all_versions("missing").await.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(err.error_code(), Some(40401));

        client.register_schema("s", &schema("a")).await.unwrap();
        let err = client.get_by_schema("s", &schema("b")).await.unwrap_err();
        assert_eq!(err.error_code(), Some(40403));
        let err = client.get_version("s", 7).await.unwrap_err();
        assert_eq!(err.error_code(), Some(40402));

        assert_eq!(client.delete_subject("s").await.unwrap(), vec![1]);
        assert_eq!(client.delete_subject("s").await.unwrap_err().error_code(), Some(40401));
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let client = MockSchemaRegistryClient::new(client_config::ClientConfig::default());
        let other = client.clone();
        client.register_schema("s", &schema("a")).await.unwrap();
        assert_eq!(other.get_all_subjects().await.unwrap(), vec!["s".to_string()]);
        assert_eq!(other.registry().get_all_versions("s").unwrap(), vec![1]);
    }
}
