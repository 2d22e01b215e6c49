pub mod registered_schema;
pub use self::registered_schema::RegisteredSchema;
pub mod schema;
pub use self::schema::Schema;
