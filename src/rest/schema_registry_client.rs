use crate::rest::apis::{Error, ResponseContent, urlencode};
use crate::rest::models::{RegisteredSchema, Schema};
use crate::rest::{client_config, rest_service};
use serde::de::DeserializeOwned;

#[trait_variant::make(Send)]
pub trait Client {
    fn new(config: client_config::ClientConfig) -> Self;
    fn config(&self) -> &client_config::ClientConfig;
    async fn register_schema(
        &self,
        subject: &str,
        schema: &Schema,
    ) -> Result<RegisteredSchema, Error>;
    async fn get_by_id(&self, id: i32) -> Result<Schema, Error>;
    /// Version and id under which `subject` holds `schema`.
    async fn get_by_schema(
        &self,
        subject: &str,
        schema: &Schema,
    ) -> Result<RegisteredSchema, Error>;
    async fn get_version(&self, subject: &str, version: i32) -> Result<RegisteredSchema, Error>;
    async fn get_latest_version(&self, subject: &str) -> Result<RegisteredSchema, Error>;
    async fn get_all_versions(&self, subject: &str) -> Result<Vec<i32>, Error>;
    async fn get_all_subjects(&self) -> Result<Vec<String>, Error>;
    async fn delete_subject(&self, subject: &str) -> Result<Vec<i32>, Error>;
}

/// Client for the registry's REST API. Every call goes to the server; nothing
/// is cached, so deletions are observed immediately.
#[derive(Clone, Debug)]
pub struct SchemaRegistryClient {
    rest_service: rest_service::RestService,
}

impl SchemaRegistryClient {
    async fn send<T: DeserializeOwned>(
        &self,
        url: &str,
        method: reqwest::Method,
        body: Option<&str>,
    ) -> Result<T, Error> {
        let resp = self
            .rest_service
            .send_request_urls(url, method, None, body)
            .await?;
        let status = resp.status();
        let content = resp.text().await?;
        if !status.is_client_error() && !status.is_server_error() {
            Ok(serde_json::from_str(&content)?)
        } else {
            let entity = serde_json::from_str(&content).ok();
            let error = ResponseContent {
                status,
                content,
                entity,
            };
            Err(Error::ResponseError(error))
        }
    }
}

impl Client for SchemaRegistryClient {
    fn new(config: client_config::ClientConfig) -> Self {
        SchemaRegistryClient {
            rest_service: rest_service::RestService::new(config),
        }
    }

    fn config(&self) -> &client_config::ClientConfig {
        self.rest_service.config()
    }

    async fn register_schema(
        &self,
        subject: &str,
        schema: &Schema,
    ) -> Result<RegisteredSchema, Error> {
        let url = format!("/subjects/{}/versions", urlencode(subject));
        let body = serde_json::to_string(schema)?;
        let rs: RegisteredSchema = self
            .send(&url, reqwest::Method::POST, Some(&body))
            .await?;
        // The registry answers with the id only
        Ok(schema.to_registered_schema(rs.id, Some(subject.to_string()), rs.version))
    }

    async fn get_by_id(&self, id: i32) -> Result<Schema, Error> {
        let url = format!("/schemas/ids/{}", id);
        self.send(&url, reqwest::Method::GET, None).await
    }

    async fn get_by_schema(
        &self,
        subject: &str,
        schema: &Schema,
    ) -> Result<RegisteredSchema, Error> {
        let url = format!("/subjects/{}", urlencode(subject));
        let body = serde_json::to_string(schema)?;
        self.send(&url, reqwest::Method::POST, Some(&body)).await
    }

    async fn get_version(&self, subject: &str, version: i32) -> Result<RegisteredSchema, Error> {
        let url = format!("/subjects/{}/versions/{}", urlencode(subject), version);
        self.send(&url, reqwest::Method::GET, None).await
    }

    async fn get_latest_version(&self, subject: &str) -> Result<RegisteredSchema, Error> {
        let url = format!("/subjects/{}/versions/latest", urlencode(subject));
        self.send(&url, reqwest::Method::GET, None).await
    }

    async fn get_all_versions(&self, subject: &str) -> Result<Vec<i32>, Error> {
        let url = format!("/subjects/{}/versions", urlencode(subject));
        self.send(&url, reqwest::Method::GET, None).await
    }

    async fn get_all_subjects(&self) -> Result<Vec<String>, Error> {
        self.send("/subjects", reqwest::Method::GET, None).await
    }

    async fn delete_subject(&self, subject: &str) -> Result<Vec<i32>, Error> {
        let url = format!("/subjects/{}", urlencode(subject));
        self.send(&url, reqwest::Method::DELETE, None).await
    }
}
