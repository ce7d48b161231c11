//! Exit codes for the CLI

use jig_core::JigError;

/// General error
pub const ERROR: i32 = 1;

/// Configuration error
pub const CONFIG_ERROR: i32 = 2;

/// Repository or issue-tracker fetch error
pub const FETCH_ERROR: i32 = 3;

/// Model document error
pub const DOCUMENT_ERROR: i32 = 4;

/// Exit code for a failed command, from the first [`JigError`] in its chain
pub fn for_error(err: &anyhow::Error) -> i32 {
    match err.chain().find_map(|e| e.downcast_ref::<JigError>()) {
        Some(JigError::Config(_)) => CONFIG_ERROR,
        Some(JigError::Fetch(_)) => FETCH_ERROR,
        Some(JigError::Document(_)) => DOCUMENT_ERROR,
        _ => ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use jig_core::{ConfigError, DocumentError, FetchError};

    #[test]
    fn test_codes_follow_error_kind() {
        let config = anyhow::Error::from(JigError::from(ConfigError::MissingField("git.url".into())));
        assert_eq!(for_error(&config), CONFIG_ERROR);

        let fetch: anyhow::Result<()> = Err(JigError::from(FetchError::Transport {
            collaborator: "jira".into(),
            message: "refused".into(),
        }))
        .context("enriching model");
        assert_eq!(for_error(&fetch.unwrap_err()), FETCH_ERROR);

        let document = anyhow::Error::from(JigError::from(DocumentError::PathNotFound("$.x".into())));
        assert_eq!(for_error(&document), DOCUMENT_ERROR);

        assert_eq!(for_error(&anyhow::anyhow!("boom")), ERROR);
    }
}
