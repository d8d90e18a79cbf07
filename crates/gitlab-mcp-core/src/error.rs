//! Error types for gitlab-mcp.
//!
//! Two classes of failure flow through the crates: validation errors
//! ([`ParamError`], [`ToolsetError`]) caused by caller input and meant to
//! be shown to the agent as-is, and everything else (transport, upstream
//! API, serialization), which is an internal fault.

use thiserror::Error;

/// A tool argument failed extraction or validation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParamError {
    #[error("missing required parameter: {0}")]
    MissingParameter(String),

    #[error("parameter {name} is not of expected type {expected}, got {actual}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("parameter {0} cannot be empty or zero value")]
    EmptyValue(String),

    #[error("parameter '{name}' must be a whole number, got {value}")]
    NotWholeNumber { name: String, value: f64 },

    #[error("parameter '{name}' must be convertible to an integer, got {actual}")]
    NotConvertible { name: String, actual: &'static str },

    #[error("parameter '{name}' must be a valid integer string, got '{value}'")]
    InvalidInteger { name: String, value: String },

    #[error("parameter '{name}' must be a boolean or boolean string, got {actual}")]
    NotBoolean { name: String, actual: String },

    #[error("parameter '{name}' must be a valid ISO 8601 timestamp, got '{value}'")]
    InvalidTimestamp { name: String, value: String },

    #[error("invalid '{name}' parameter: {source}")]
    InvalidPagination {
        name: String,
        #[source]
        source: Box<ParamError>,
    },
}

/// Toolset registry failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolsetError {
    #[error("unknown toolset: {0}")]
    UnknownToolset(String),

    #[error("no toolsets specified to enable")]
    NoToolsetsSpecified,
}

/// Main error type for gitlab-mcp operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Tool argument validation failed
    #[error(transparent)]
    Param(#[from] ParamError),

    /// Toolset selection failed
    #[error(transparent)]
    Toolset(#[from] ToolsetError),

    /// HTTP request failed before a response arrived
    #[error("HTTP error: {0}")]
    Http(String),

    /// Upstream rejected the credentials (401/403)
    #[error("Authentication error: {0}")]
    Unauthorized(String),

    /// Upstream resource does not exist or is not visible (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other non-success upstream status
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Upstream payload could not be interpreted
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Map a non-success HTTP status from the upstream API.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => Error::Unauthorized(message),
            404 => Error::NotFound(message),
            _ => Error::Api { status, message },
        }
    }

    /// Whether this error was caused by caller input rather than a system fault.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Param(_) | Error::Toolset(_))
    }

    /// Upstream HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Unauthorized(_) => Some(401),
            Error::NotFound(_) => Some(404),
            Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for gitlab-mcp operations.
pub type Result<T> = std::result::Result<T, Error>;
