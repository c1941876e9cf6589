use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StubError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to decode request: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Request must be a JSON object")]
    NotAnObject,

    #[error("Invalid field '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Failed to spawn process: {0}")]
    Spawn(String),
}

impl StubError {
    pub(crate) fn invalid_field(field: &'static str, reason: impl Into<String>) -> Self {
        StubError::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}
