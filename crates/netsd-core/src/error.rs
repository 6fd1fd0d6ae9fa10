//! Error types for the discovery system
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for discovery operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the discovery system
#[derive(Error, Debug)]
pub enum Error {
    /// Inventory source errors (query failed, payload malformed)
    #[error("inventory error: {0}")]
    Inventory(String),

    /// Target sink errors (read or write of the destination failed)
    #[error("sink error: {0}")]
    Sink(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Region identifier did not match the required pattern
    #[error("region '{0}' is not a valid region")]
    InvalidRegion(String),

    /// Network-related errors
    #[error("network error: {0}")]
    Network(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP-level errors (unexpected status codes)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Authentication errors against the sink API
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Rate limiting errors
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Destination object not found
    #[error("not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an inventory source error
    pub fn inventory(msg: impl Into<String>) -> Self {
        Self::Inventory(msg.into())
    }

    /// Create a target sink error
    pub fn sink(msg: impl Into<String>) -> Self {
        Self::Sink(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
