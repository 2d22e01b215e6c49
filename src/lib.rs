//!An in-memory mock of the
//![Confluent Schema Registry](https://github.com/confluentinc/schema-registry) REST API for tests.
//!
//!## The library
//!
//!`schema-registry-mock` serves a registry from memory on a local port, so code under test can
//!register, fetch, version and delete schemas without a running registry service.
//!
//!### Features
//!
//!- Registry-wide schema ids and per-subject versions numbered like the real service
//!- The registry's status codes and `error_code`s (40401 subject not found, 40402 version not
//!  found, 40403 schema not found, 42201 invalid schema, ...)
//!- Avro, JSON Schema and Protobuf schemas, compared by canonical form
//!- Topic helpers for the `<topic>-key` / `<topic>-value` subject naming convention
//!- An async client for the REST API, and an in-process client that skips HTTP
//!
//!Compatibility rules are not enforced.
//!
//!## Usage
//!
//!```no_run
//!use schema_registry_mock::mock::SchemaRegistryMock;
//!use schema_registry_mock::rest::models::Schema;
//!use schema_registry_mock::rest::schema_registry_client::Client;
//!
//!# async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!let mut mock = SchemaRegistryMock::new();
//!mock.start().await?;
//!
//!let schema = Schema::avro(r#"{"type":"record","name":"value_schema","fields":[]}"#);
//!let id = mock.register_value_schema("test-topic", &schema)?;
//!
//!let client = mock.client()?;
//!assert_eq!(client.get_all_versions("test-topic-value").await?, vec![1]);
//!assert_eq!(client.get_by_id(id).await?.schema, schema.schema);
//!
//!mock.stop().await?;
//!# Ok(())
//!# }
//!```

pub mod mock;
pub mod rest;
