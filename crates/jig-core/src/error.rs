//! Error types for jig

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using JigError
pub type Result<T> = std::result::Result<T, JigError>;

/// Main error type for jig operations
#[derive(Debug, Error)]
pub enum JigError {
    /// Configuration-related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Repository or issue-tracker fetch errors
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Model document errors
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Version-related errors
    #[error(transparent)]
    Version(#[from] VersionError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found at {0}")]
    NotFound(PathBuf),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {message}")]
    InvalidValue { field: String, message: String },

    /// A configured regular expression does not compile
    #[error("Invalid pattern for {field} '{pattern}': {source}")]
    InvalidPattern {
        field: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Missing required field
    #[error("Missing required configuration field: {0}")]
    MissingField(String),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// IO error
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the repository and issue-tracker collaborators
#[derive(Debug, Error)]
pub enum FetchError {
    /// The remote API answered with a non-success status
    #[error("{collaborator} API error ({status}): {message}")]
    Api {
        collaborator: String,
        status: u16,
        message: String,
    },

    /// The request could not be sent or the connection failed
    #[error("{collaborator} request failed: {message}")]
    Transport {
        collaborator: String,
        message: String,
    },

    /// The response body did not have the expected shape
    #[error("{collaborator} returned an unexpected response: {message}")]
    Decode {
        collaborator: String,
        message: String,
    },
}

/// Errors raised while loading, merging or rendering the model document
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The document is not valid YAML
    #[error("Malformed YAML document: {0}")]
    Malformed(#[source] serde_yaml::Error),

    /// An overlay mapping was merged onto a node of another kind
    #[error("Cannot merge a {overlay} onto a {original} at '{path}'")]
    KindMismatch {
        path: String,
        original: &'static str,
        overlay: &'static str,
    },

    /// A value could not be serialized back to YAML
    #[error("Failed to render YAML: {0}")]
    Render(#[source] serde_yaml::Error),

    /// A YAML path expression is not supported
    #[error("Invalid YAML path '{path}': {message}")]
    InvalidPath { path: String, message: String },

    /// A YAML path expression selected nothing
    #[error("Path not found: {0}")]
    PathNotFound(String),
}

/// Version-related errors
#[derive(Debug, Error)]
pub enum VersionError {
    /// Failed to parse a version component
    #[error("Failed to parse version '{0}': {1}")]
    ParseFailed(String, String),

    /// Invalid version format
    #[error("Invalid version format: {0}")]
    InvalidFormat(String),

    /// A bumped component does not fit in 64 bits
    #[error("Version component overflow in '{0}'")]
    Overflow(String),
}

impl JigError {
    /// Create a new "other" error with a message
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Self::Other(msg.into())
    }
}
