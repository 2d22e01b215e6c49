use reqwest::StatusCode;

/// Failures produced by the in-memory registry. Each one maps onto the
/// status code and `error_code` the real service answers with.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Subject '{0}' not found")]
    SubjectNotFound(String),
    #[error("Schema not found in subject '{0}'")]
    SchemaNotFound(String),
    #[error("Schema {0} not found")]
    IdNotFound(i32),
    #[error("Version {version} not found in subject '{subject}'")]
    VersionNotFound { subject: String, version: i32 },
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),
    #[error("Invalid version: {0}")]
    InvalidVersion(String),
    #[error("Schema ids exhausted")]
    IdsExhausted,
}

impl RegistryError {
    pub fn status(&self) -> StatusCode {
        match self {
            RegistryError::SubjectNotFound(_)
            | RegistryError::SchemaNotFound(_)
            | RegistryError::IdNotFound(_)
            | RegistryError::VersionNotFound { .. } => StatusCode::NOT_FOUND,
            RegistryError::InvalidSchema(_) | RegistryError::InvalidVersion(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            RegistryError::IdsExhausted => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> i32 {
        match self {
            RegistryError::SubjectNotFound(_) => 40401,
            RegistryError::VersionNotFound { .. } => 40402,
            RegistryError::SchemaNotFound(_) => 40403,
            RegistryError::IdNotFound(_) => 40400,
            RegistryError::InvalidSchema(_) => 42201,
            RegistryError::InvalidVersion(_) => 42202,
            RegistryError::IdsExhausted => 50001,
        }
    }

    /// The short message real clients render as `<message>; error code: <code>`.
    pub fn message(&self) -> &'static str {
        match self {
            RegistryError::SubjectNotFound(_) => "Subject not found",
            RegistryError::SchemaNotFound(_) | RegistryError::IdNotFound(_) => "Schema not found",
            RegistryError::VersionNotFound { .. } => "Version not found",
            RegistryError::InvalidSchema(_) => "Invalid schema",
            RegistryError::InvalidVersion(_) => "Invalid version",
            RegistryError::IdsExhausted => "Error in the backend data store",
        }
    }
}

/// Lifecycle failures of the stub server.
#[derive(Debug, thiserror::Error)]
pub enum MockError {
    #[error("error in IO: {0}")]
    Io(#[from] std::io::Error),
    #[error("schema registry mock is already running on {0}")]
    AlreadyStarted(std::net::SocketAddr),
    #[error("schema registry mock is not running")]
    NotStarted,
}
