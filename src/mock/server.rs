use crate::mock::config::MockConfig;
use crate::mock::error::{MockError, RegistryError};
use crate::mock::handler::{MockResponse, RegistryHandler};
use crate::mock::registry::MockRegistry;
use crate::mock::schema_store::StoredSchema;
use crate::mock::schema_type::SchemaType;
use crate::rest::client_config::ClientConfig;
use crate::rest::mock_schema_registry_client::MockSchemaRegistryClient;
use crate::rest::models::Schema;
use crate::rest::schema_registry_client::{Client, SchemaRegistryClient};
use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

impl IntoResponse for MockResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

async fn register(
    State(h): State<RegistryHandler>,
    Path(subject): Path<String>,
    body: String,
) -> MockResponse {
    h.register(&subject, &body)
}

async fn get_schema_by_id(State(h): State<RegistryHandler>, Path(id): Path<String>) -> MockResponse {
    h.get_schema_by_id(&id)
}

async fn list_subjects(State(h): State<RegistryHandler>) -> MockResponse {
    h.list_subjects()
}

async fn list_versions(
    State(h): State<RegistryHandler>,
    Path(subject): Path<String>,
) -> MockResponse {
    h.list_versions(&subject)
}

async fn get_version(
    State(h): State<RegistryHandler>,
    Path((subject, version)): Path<(String, String)>,
) -> MockResponse {
    h.get_version(&subject, &version)
}

async fn get_version_schema(
    State(h): State<RegistryHandler>,
    Path((subject, version)): Path<(String, String)>,
) -> MockResponse {
    h.get_version_schema(&subject, &version)
}

async fn lookup(
    State(h): State<RegistryHandler>,
    Path(subject): Path<String>,
    body: String,
) -> MockResponse {
    h.lookup(&subject, &body)
}

async fn delete_subject(
    State(h): State<RegistryHandler>,
    Path(subject): Path<String>,
) -> MockResponse {
    h.delete_subject(&subject)
}

async fn no_route() -> MockResponse {
    MockResponse::no_route()
}

/// Route table of the stub server. Templates do not overlap: `latest` is
/// resolved by the single `{version}` route.
fn router(handler: RegistryHandler) -> Router {
    Router::new()
        .route("/subjects", get(list_subjects))
        .route("/subjects/:subject", post(lookup).delete(delete_subject))
        .route("/subjects/:subject/versions", get(list_versions).post(register))
        .route("/subjects/:subject/versions/:version", get(get_version))
        .route(
            "/subjects/:subject/versions/:version/schema",
            get(get_version_schema),
        )
        .route("/schemas/ids/:id", get(get_schema_by_id))
        .fallback(no_route)
        .with_state(handler)
}

struct RunningServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<std::io::Result<()>>,
}

impl Drop for RunningServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        self.task.abort();
    }
}

/// A schema registry served from memory on a local port.
///
/// The registry lives as long as this value: stopping and starting again keeps
/// registered schemas, a new instance starts empty. Dropping a running mock
/// shuts its server down.
pub struct SchemaRegistryMock {
    config: MockConfig,
    registry: Arc<MockRegistry>,
    running: Option<RunningServer>,
}

impl Default for SchemaRegistryMock {
    fn default() -> Self {
        SchemaRegistryMock::new()
    }
}

impl SchemaRegistryMock {
    pub fn new() -> Self {
        SchemaRegistryMock::with_config(MockConfig::default())
    }

    pub fn with_config(config: MockConfig) -> Self {
        SchemaRegistryMock {
            config,
            registry: Arc::new(MockRegistry::new()),
            running: None,
        }
    }

    pub async fn start(&mut self) -> Result<(), MockError> {
        if let Some(running) = &self.running {
            return Err(MockError::AlreadyStarted(running.addr));
        }
        let listener = TcpListener::bind((self.config.host.as_str(), self.config.port)).await?;
        let addr = listener.local_addr()?;
        let (tx, rx) = oneshot::channel::<()>();
        let app = router(RegistryHandler::new(self.registry.clone()));
        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = rx.await;
                })
                .await
        });
        log::info!("schema registry mock listening on {}", addr);
        self.running = Some(RunningServer {
            addr,
            shutdown: Some(tx),
            task,
        });
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<(), MockError> {
        let mut running = self.running.take().ok_or(MockError::NotStarted)?;
        if let Some(shutdown) = running.shutdown.take() {
            let _ = shutdown.send(());
        }
        match tokio::time::timeout(SHUTDOWN_TIMEOUT, &mut running.task).await {
            Ok(Ok(result)) => result?,
            Ok(Err(e)) if e.is_cancelled() => {}
            Ok(Err(e)) => return Err(std::io::Error::other(e).into()),
            Err(_) => log::warn!("schema registry mock on {} did not drain in time", running.addr),
        }
        log::info!("schema registry mock on {} stopped", running.addr);
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    pub fn addr(&self) -> Result<SocketAddr, MockError> {
        self.running
            .as_ref()
            .map(|r| r.addr)
            .ok_or(MockError::NotStarted)
    }

    /// Base URL to hand to registry clients and serdes.
    pub fn url(&self) -> Result<String, MockError> {
        self.addr().map(|addr| format!("http://{}", addr))
    }

    /// An HTTP client pointed at this mock.
    pub fn client(&self) -> Result<SchemaRegistryClient, MockError> {
        let config = ClientConfig::new(vec![self.url()?]);
        Ok(SchemaRegistryClient::new(config))
    }

    /// A client that talks to this mock's registry without going through HTTP.
    pub fn in_process_client(&self) -> MockSchemaRegistryClient {
        MockSchemaRegistryClient::from_registry(self.registry.clone())
    }

    pub fn registry(&self) -> &Arc<MockRegistry> {
        &self.registry
    }

    fn parse(schema: &Schema) -> Result<StoredSchema, RegistryError> {
        let schema_type = SchemaType::from_wire(schema.schema_type.as_deref())?;
        StoredSchema::parse(schema_type, &schema.schema)
    }

    /// Registers `schema` under `<topic>-key` and returns its id.
    pub fn register_key_schema(&self, topic: &str, schema: &Schema) -> Result<i32, RegistryError> {
        self.registry.register_key_schema(topic, &Self::parse(schema)?)
    }

    /// Registers `schema` under `<topic>-value` and returns its id.
    pub fn register_value_schema(&self, topic: &str, schema: &Schema) -> Result<i32, RegistryError> {
        self.registry.register_value_schema(topic, &Self::parse(schema)?)
    }

    pub fn delete_key_schema(&self, topic: &str) -> Result<Vec<i32>, RegistryError> {
        self.registry.delete_key_schema(topic)
    }

    pub fn delete_value_schema(&self, topic: &str) -> Result<Vec<i32>, RegistryError> {
        self.registry.delete_value_schema(topic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::apis::Error;
    use reqwest::StatusCode;
    use serde_json::json;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn create_schema(name: &str) -> Schema {
        Schema::avro(
            json!({"type": "record", "name": name, "doc": "no doc", "fields": []}).to_string(),
        )
    }

    fn create_schema_with_field(name: &str) -> Schema {
        Schema::avro(
            json!({
                "type": "record",
                "name": name,
                "doc": "no doc",
                "fields": [{"name": "f1", "type": "string", "doc": ""}]
            })
            .to_string(),
        )
    }

    fn avro(schema: &Schema) -> apache_avro::Schema {
        apache_avro::Schema::parse_str(&schema.schema).unwrap()
    }

    async fn started() -> SchemaRegistryMock {
        init_logger();
        let mut mock = SchemaRegistryMock::new();
        mock.start().await.unwrap();
        mock
    }

    fn assert_not_found(err: Error, error_code: i32) {
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(err.error_code(), Some(error_code));
    }

    #[tokio::test]
    async fn test_register_key_schema() {
        let mock = started().await;
        let key_schema = create_schema("key_schema");
        let id = mock.register_key_schema("test-topic", &key_schema).unwrap();

        let retrieved = mock.client().unwrap().get_by_id(id).await.unwrap();
        assert_eq!(avro(&retrieved), avro(&key_schema));
    }

    #[tokio::test]
    async fn test_register_value_schema_with_client() {
        let mock = started().await;
        let client = mock.client().unwrap();
        let value_schema = create_schema("value_schema");
        let rs = client
            .register_schema("test-topic-value", &value_schema)
            .await
            .unwrap();
        let id = rs.id.unwrap();

        let retrieved = client.get_by_id(id).await.unwrap();
        assert_eq!(avro(&retrieved), avro(&value_schema));
        assert_eq!(
            client.get_all_subjects().await.unwrap(),
            vec!["test-topic-value".to_string()]
        );
    }

    #[tokio::test]
    async fn test_unknown_id() {
        let mock = started().await;
        let err = mock.client().unwrap().get_by_id(42).await.unwrap_err();
        assert_not_found(err, 40400);
    }

    #[tokio::test]
    async fn test_schema_versions() {
        let mock = started().await;
        let client = mock.client().unwrap();
        let value_schema = create_schema("value_schema");
        let id = mock.register_value_schema("test-topic", &value_schema).unwrap();

        let versions = client.get_all_versions("test-topic-value").await.unwrap();
        assert_eq!(versions, vec![1]);

        let metadata = client.get_version("test-topic-value", versions[0]).await.unwrap();
        assert_eq!(metadata.id, Some(id));
        assert_eq!(avro(&metadata.to_schema()), avro(&value_schema));
    }

    #[tokio::test]
    async fn test_no_versions_for_unknown_subject() {
        let mock = started().await;
        let err = mock
            .client()
            .unwrap()
            .get_all_versions("does_not_exist")
            .await
            .unwrap_err();
        assert_not_found(err, 40401);
    }

    #[tokio::test]
    async fn test_no_version_metadata_for_unknown_subject() {
        let mock = started().await;
        let client = mock.client().unwrap();
        for version in [0, 1] {
            let err = client
                .get_version("does_not_exist", version)
                .await
                .unwrap_err();
            assert_not_found(err, 40401);
        }

        mock.register_value_schema("test-topic", &create_schema("value_schema"))
            .unwrap();
        let err = client.get_version("test-topic-value", 0).await.unwrap_err();
        assert_not_found(err, 40402);
    }

    #[tokio::test]
    async fn test_field_default_registers_new_version() {
        let mock = started().await;
        let client = mock.client().unwrap();
        let plain = Schema::avro(
            r#"{"type":"record","name":"r","fields":[{"name":"f","type":"int"}]}"#,
        );
        let with_default = Schema::avro(
            r#"{"type":"record","name":"r","fields":[{"name":"f","type":"int","default":0}]}"#,
        );
        let a = client.register_schema("t-value", &plain).await.unwrap();
        let b = client.register_schema("t-value", &with_default).await.unwrap();
        assert_eq!((a.id, b.id), (Some(1), Some(2)));
        assert_eq!(client.get_all_versions("t-value").await.unwrap(), vec![1, 2]);
        assert_eq!(client.get_by_id(2).await.unwrap().schema, with_default.schema);
    }

    #[tokio::test]
    async fn test_latest_schema_version() {
        let mock = started().await;
        let client = mock.client().unwrap();
        let v1 = create_schema("value_schema");
        let v2 = create_schema_with_field("value_schema");
        let id1 = mock.register_value_schema("test-topic", &v1).unwrap();
        let id2 = mock.register_value_schema("test-topic", &v2).unwrap();
        assert_eq!((id1, id2), (1, 2));

        let versions = client.get_all_versions("test-topic-value").await.unwrap();
        assert_eq!(versions, vec![1, 2]);

        let latest = client.get_latest_version("test-topic-value").await.unwrap();
        assert_eq!(latest.id, Some(id2));
        assert_eq!(latest.version, Some(2));
        assert_eq!(avro(&latest.to_schema()), avro(&v2));

        let err = client.get_latest_version("does_not_exist").await.unwrap_err();
        assert_not_found(err, 40401);
    }

    #[tokio::test]
    async fn test_all_subjects() {
        let mock = started().await;
        let client = mock.client().unwrap();
        assert!(client.get_all_subjects().await.unwrap().is_empty());

        mock.register_key_schema("test-topic", &create_schema("key_schema"))
            .unwrap();
        mock.register_value_schema("test-topic", &create_schema("value_schema"))
            .unwrap();
        assert_eq!(
            client.get_all_subjects().await.unwrap(),
            vec!["test-topic-key".to_string(), "test-topic-value".to_string()]
        );
    }

    #[tokio::test]
    async fn test_delete_schemas() {
        let mock = started().await;
        let client = mock.client().unwrap();
        mock.register_key_schema("test-topic", &create_schema("key_schema"))
            .unwrap();
        mock.register_value_schema("test-topic", &create_schema("value_schema"))
            .unwrap();

        assert_eq!(mock.delete_key_schema("test-topic").unwrap(), vec![1]);
        assert_eq!(
            client.get_all_subjects().await.unwrap(),
            vec!["test-topic-value".to_string()]
        );
        assert_eq!(client.delete_subject("test-topic-value").await.unwrap(), vec![1]);
        assert!(client.get_all_subjects().await.unwrap().is_empty());

        let err = client.delete_subject("does_not_exist").await.unwrap_err();
        assert_not_found(err, 40401);
    }

    #[tokio::test]
    async fn test_no_versions_for_deleted_subject() {
        let mock = started().await;
        let client = mock.client().unwrap();
        let id = mock
            .register_value_schema("test-topic", &create_schema("value_schema"))
            .unwrap();
        let metadata = client.get_version("test-topic-value", 1).await.unwrap();
        assert_eq!(metadata.id, Some(id));

        mock.delete_value_schema("test-topic").unwrap();
        assert_not_found(
            client.get_all_versions("test-topic-value").await.unwrap_err(),
            40401,
        );
        assert_not_found(
            client.get_version("test-topic-value", 1).await.unwrap_err(),
            40401,
        );
        assert_not_found(
            client.get_latest_version("test-topic-value").await.unwrap_err(),
            40401,
        );
        // the id outlives the subject
        assert!(client.get_by_id(id).await.is_ok());
    }

    #[tokio::test]
    async fn test_version_and_id_by_schema() {
        let mock = started().await;
        let client = mock.client().unwrap();
        let schema = create_schema("value_schema");

        let err = client
            .get_by_schema("test-topic-value", &schema)
            .await
            .unwrap_err();
        assert_not_found(err, 40401);
        assert_eq!(
            err_message(client.get_by_schema("test-topic-value", &schema).await),
            "Subject not found; error code: 40401"
        );

        mock.register_value_schema("test-topic", &schema).unwrap();
        let rs = client.get_by_schema("test-topic-value", &schema).await.unwrap();
        assert_eq!(rs.version, Some(1));
        assert_eq!(rs.id, Some(1));

        let err = client
            .get_by_schema("test-topic-value", &create_schema("other"))
            .await
            .unwrap_err();
        assert_not_found(err, 40403);
    }

    fn err_message<T: std::fmt::Debug>(result: Result<T, Error>) -> String {
        match result.unwrap_err() {
            Error::ResponseError(rc) => rc.to_string(),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_version_survives_deletion_of_other_subject() {
        let mock = started().await;
        let client = mock.client().unwrap();
        let schema = create_schema("value_schema");
        mock.register_key_schema("test-topic", &schema).unwrap();
        assert_eq!(
            client.get_by_schema("test-topic-key", &schema).await.unwrap().version,
            Some(1)
        );

        mock.register_value_schema("test-topic", &create_schema("x")).unwrap();
        mock.delete_value_schema("test-topic").unwrap();
        mock.register_value_schema("test-topic", &create_schema("new_schema"))
            .unwrap();

        assert_eq!(
            client.get_by_schema("test-topic-key", &schema).await.unwrap().version,
            Some(1)
        );
    }

    #[tokio::test]
    async fn test_no_id_for_deleted_schema() {
        let mock = started().await;
        let client = mock.client().unwrap();
        let schema = create_schema("value_schema");
        mock.register_key_schema("test-topic", &schema).unwrap();
        assert_eq!(
            client.get_by_schema("test-topic-key", &schema).await.unwrap().id,
            Some(1)
        );

        mock.delete_key_schema("test-topic").unwrap();
        let new_id = mock
            .register_key_schema("test-topic", &create_schema("new_schema"))
            .unwrap();
        assert_eq!(new_id, 2);

        let err = client
            .get_by_schema("test-topic-key", &schema)
            .await
            .unwrap_err();
        assert_not_found(err, 40403);
        assert_eq!(client.get_all_versions("test-topic-key").await.unwrap(), vec![1]);
    }

    #[tokio::test]
    async fn test_end_to_end_versioning() {
        let mock = started().await;
        let client = mock.client().unwrap();
        let a = create_schema("value_schema");
        let b = create_schema_with_field("value_schema");

        let rs = client.register_schema("test-topic-value", &a).await.unwrap();
        assert_eq!(rs.id, Some(1));
        let rs = client.register_schema("test-topic-value", &b).await.unwrap();
        assert_eq!(rs.id, Some(2));
        // same content again: no new version
        let rs = client.register_schema("test-topic-value", &a).await.unwrap();
        assert_eq!(rs.id, Some(1));
        assert_eq!(
            client.get_all_versions("test-topic-value").await.unwrap(),
            vec![1, 2]
        );

        let latest = client.get_latest_version("test-topic-value").await.unwrap();
        assert_eq!((latest.id, latest.version), (Some(2), Some(2)));
        assert_eq!(avro(&latest.to_schema()), avro(&b));

        assert_eq!(client.delete_subject("test-topic-value").await.unwrap(), vec![1, 2]);
        assert_not_found(
            client.get_all_versions("test-topic-value").await.unwrap_err(),
            40401,
        );

        let c = create_schema("another_schema");
        let rs = client.register_schema("test-topic-value", &c).await.unwrap();
        assert_eq!(rs.id, Some(3));
        let latest = client.get_latest_version("test-topic-value").await.unwrap();
        assert_eq!(latest.version, Some(1));
    }

    #[tokio::test]
    async fn test_invalid_schema_rejected() {
        let mock = started().await;
        let client = mock.client().unwrap();
        let err = client
            .register_schema("s", &Schema::avro("{not a schema"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::UNPROCESSABLE_ENTITY));
        assert_eq!(err.error_code(), Some(42201));
        assert!(mock.register_value_schema("t", &Schema::avro("nope")).is_err());
    }

    #[tokio::test]
    async fn test_subject_names_are_percent_decoded() {
        let mock = started().await;
        let client = mock.client().unwrap();
        let schema = create_schema("value_schema");
        client.register_schema("my topic/value", &schema).await.unwrap();
        assert_eq!(
            client.get_all_subjects().await.unwrap(),
            vec!["my topic/value".to_string()]
        );
        assert_eq!(client.get_all_versions("my topic/value").await.unwrap(), vec![1]);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let mock = started().await;
        let url = format!("{}/does/not/exist", mock.url().unwrap());
        let resp = reqwest::get(&url).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["error_code"], 404);
    }

    #[tokio::test]
    async fn test_raw_schema_endpoint() {
        let mock = started().await;
        mock.register_value_schema("test-topic", &create_schema("value_schema"))
            .unwrap();
        let url = format!(
            "{}/subjects/test-topic-value/versions/latest/schema",
            mock.url().unwrap()
        );
        let body: serde_json::Value = reqwest::get(&url).await.unwrap().json().await.unwrap();
        assert_eq!(body["name"], "value_schema");
    }

    #[tokio::test]
    async fn test_lifecycle() {
        init_logger();
        let mut mock = SchemaRegistryMock::new();
        assert!(!mock.is_running());
        assert!(matches!(mock.url(), Err(MockError::NotStarted)));
        assert!(matches!(mock.stop().await, Err(MockError::NotStarted)));

        mock.start().await.unwrap();
        assert!(matches!(
            mock.start().await,
            Err(MockError::AlreadyStarted(_))
        ));
        mock.register_value_schema("test-topic", &create_schema("value_schema"))
            .unwrap();
        let url = mock.url().unwrap();
        mock.stop().await.unwrap();
        assert!(!mock.is_running());
        assert!(reqwest::get(format!("{}/subjects", url)).await.is_err());

        // a restarted mock keeps its registry
        mock.start().await.unwrap();
        let subjects = mock.client().unwrap().get_all_subjects().await.unwrap();
        assert_eq!(subjects, vec!["test-topic-value".to_string()]);

        // a new instance does not share it
        let other = started().await;
        assert!(other.client().unwrap().get_all_subjects().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_in_process_client_shares_registry() {
        let mock = SchemaRegistryMock::new();
        let client = mock.in_process_client();
        let id = mock
            .register_value_schema("test-topic", &create_schema("value_schema"))
            .unwrap();
        assert_eq!(client.get_all_versions("test-topic-value").await.unwrap(), vec![1]);
        assert_eq!(client.get_by_id(id).await.unwrap().schema, create_schema("value_schema").schema);
    }
}
