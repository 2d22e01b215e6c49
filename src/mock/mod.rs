pub mod config;
pub mod error;
pub mod handler;
pub mod registry;
pub mod schema_store;
pub mod schema_type;
pub mod server;
pub mod subjects;

pub use config::MockConfig;
pub use error::{MockError, RegistryError};
pub use handler::{MockResponse, RegistryHandler};
pub use registry::MockRegistry;
pub use server::SchemaRegistryMock;
