use crate::rest::apis::error_message::ErrorMessage;
use std::fmt;

pub mod error_message;

/// A non-success response from the registry, with the parsed error envelope
/// when the body carried one.
#[derive(Debug, Clone)]
pub struct ResponseContent {
    pub status: reqwest::StatusCode,
    pub content: String,
    pub entity: Option<ErrorMessage>,
}

impl ResponseContent {
    pub fn error_code(&self) -> Option<i32> {
        self.entity.as_ref().and_then(|e| e.error_code)
    }
}

impl fmt::Display for ResponseContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.entity {
            Some(ErrorMessage {
                error_code: Some(code),
                message: Some(message),
            }) => write!(f, "{}; error code: {}", message, code),
            _ => write!(f, "status {}: {}", self.status, self.content),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("error in reqwest: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("error in serde: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("error in IO: {0}")]
    Io(#[from] std::io::Error),
    #[error("error in response: {0}")]
    ResponseError(ResponseContent),
}

impl Error {
    /// HTTP status of a registry error response.
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            Error::ResponseError(rc) => Some(rc.status),
            Error::Reqwest(e) => e.status(),
            _ => None,
        }
    }

    pub fn error_code(&self) -> Option<i32> {
        match self {
            Error::ResponseError(rc) => rc.error_code(),
            _ => None,
        }
    }
}

/// Percent-encodes a path segment. Spaces become `%20`, not `+`, since the
/// result goes into a path rather than a query string.
pub fn urlencode<T: AsRef<str>>(s: T) -> String {
    url::form_urlencoded::byte_serialize(s.as_ref().as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
