use serde::{Serialize, Deserialize};
use thiserror::Error;

/// User-facing text for every transport or decoding failure.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error occurred";

#[derive(Debug, Clone, Error, PartialEq)]
pub enum TransportError {
    #[error("request could not be sent: {0}")]
    Network(String),
    #[error("response body could not be read: {0}")]
    Body(String),
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ClientError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("malformed response: {0}")]
    Decode(String),
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

/// Failure body as the backend sends it: `{"success": false, "message": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
