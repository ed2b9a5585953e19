//! Unified error type for Restkit.
//!
//! Every failure category (bad arguments, configuration, transport, parsing)
//! is a variant of `RkError`, with conversions from the underlying library
//! errors.

use thiserror::Error;

/// Convenience type alias for Results using RkError.
pub type RkResult<T> = Result<T, RkError>;

/// Unified error type covering all error categories in Restkit.
#[derive(Error, Debug)]
pub enum RkError {
    /// A required argument was missing or malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    // -- Configuration errors --
    /// Failed to load or parse configuration.
    #[error("configuration error: {0}")]
    Config(String),

    // -- Network errors --
    /// HTTP request failed at the transport level.
    #[error("http error: {0}")]
    Http(String),

    /// HTTP request timed out.
    #[error("request timeout: {0}")]
    Timeout(String),

    // -- Data errors --
    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// File system operation failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    // -- Generic --
    /// An unexpected internal error.
    #[error("internal error: {0}")]
    Internal(String),

    /// Wrapping anyhow errors for interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RkError {
    /// Shorthand for building an `InvalidArgument` error.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        RkError::InvalidArgument(msg.into())
    }

    /// Whether this error was raised for a bad argument.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, RkError::InvalidArgument(_))
    }
}

impl From<serde_json::Error> for RkError {
    fn from(e: serde_json::Error) -> Self {
        RkError::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for RkError {
    fn from(e: toml::de::Error) -> Self {
        RkError::Config(e.to_string())
    }
}
