//! Runner error handling

use thiserror::Error;

/// Errors that stop a request from being made or answered
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("Missing required configuration: {0}")]
    MissingConfig(&'static str),

    #[error("Invalid configuration {name}: {reason}")]
    InvalidConfig { name: &'static str, reason: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A failed check; the message is what the report shows
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct AssertionFailure(pub String);

impl AssertionFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// A required suite input that was not configured
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("Missing input: {0}")]
pub struct MissingInput(pub &'static str);

impl From<MissingInput> for AssertionFailure {
    fn from(err: MissingInput) -> Self {
        AssertionFailure(err.to_string())
    }
}
