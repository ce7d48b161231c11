//! Adapter error types

use thiserror::Error;

use jig_core::{FetchError, JigError};

/// Errors raised while talking to GitLab or Jira
#[derive(Debug, Error)]
pub enum ClientError {
    /// API error from the remote service
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Issue key the service cannot address
    #[error("Invalid issue key: {0}")]
    InvalidKey(String),

    /// Base URL that cannot be extended with path segments
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for adapter operations
pub type Result<T> = std::result::Result<T, ClientError>;

impl ClientError {
    /// Attribute the error to a collaborator
    pub fn into_fetch(self, collaborator: &str) -> FetchError {
        let collaborator = collaborator.to_string();
        match self {
            Self::ApiError { status, message } => FetchError::Api {
                collaborator,
                status,
                message,
            },
            Self::Http(e) if e.is_decode() => FetchError::Decode {
                collaborator,
                message: e.to_string(),
            },
            Self::Json(e) => FetchError::Decode {
                collaborator,
                message: e.to_string(),
            },
            other => FetchError::Transport {
                collaborator,
                message: other.to_string(),
            },
        }
    }

    /// Attribute the error to a collaborator, as a [`JigError`]
    pub fn into_jig(self, collaborator: &str) -> JigError {
        self.into_fetch(collaborator).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_keeps_status() {
        let err = ClientError::ApiError {
            status: 404,
            message: "not found".to_string(),
        }
        .into_fetch("gitlab");

        assert!(matches!(err, FetchError::Api { status: 404, .. }));
        assert_eq!(err.to_string(), "gitlab API error (404): not found");
    }

    #[test]
    fn test_json_error_is_decode() {
        let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ClientError::from(json).into_fetch("jira");
        assert!(matches!(err, FetchError::Decode { ref collaborator, .. } if collaborator == "jira"));
    }

    #[test]
    fn test_invalid_key_is_transport() {
        let err = ClientError::InvalidKey("AAA-1".to_string()).into_jig("gitlab");
        assert!(matches!(err, JigError::Fetch(FetchError::Transport { .. })));
    }
}
