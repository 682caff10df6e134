//! Error types for capability invocations.

use thiserror::Error;

/// Errors that can occur when invoking an external inference capability.
#[derive(Error, Debug)]
pub enum CapabilityError {
    /// The HTTP request to the inference service failed.
    #[error("Request error: {0}")]
    RequestError(String),

    /// The capability call timed out.
    #[error("Capability timed out: {0}")]
    Timeout(String),

    /// The response could not be decoded.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// The response was decodable but violated the capability contract.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl CapabilityError {
    /// Create a request error.
    pub fn request(msg: impl Into<String>) -> Self {
        Self::RequestError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create an invalid-response error.
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }
}

impl From<reqwest::Error> for CapabilityError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_decode() {
            Self::ParseError(err.to_string())
        } else {
            Self::RequestError(err.to_string())
        }
    }
}
