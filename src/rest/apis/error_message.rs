use serde::{Deserialize, Serialize};

/// ErrorMessage : Error envelope the registry returns with every failure
#[derive(Clone, Default, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ErrorMessage {
    /// Error code, e.g. 40401 for an unknown subject
    #[serde(rename = "error_code", skip_serializing_if = "Option::is_none")]
    pub error_code: Option<i32>,
    /// Detailed error message
    #[serde(rename = "message", skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorMessage {
    pub fn new(error_code: i32, message: impl Into<String>) -> ErrorMessage {
        ErrorMessage {
            error_code: Some(error_code),
            message: Some(message.into()),
        }
    }
}
