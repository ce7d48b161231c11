//! Request plumbing shared by the adapters

use reqwest::blocking::RequestBuilder;
use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{ClientError, Result};

/// Parse a service base URL and append `extra` path segments
pub(crate) fn base_url(url: &str, extra: &[&str]) -> Result<Url> {
    let mut base = Url::parse(url.trim_end_matches('/'))
        .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", url, e)))?;
    base.path_segments_mut()
        .map_err(|_| ClientError::InvalidUrl(url.to_string()))?
        .pop_if_empty()
        .extend(extra);
    Ok(base)
}

/// `base` with `segments` appended, each percent-encoded as a single segment
pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ClientError::InvalidUrl(base.to_string()))?
        .extend(segments);
    Ok(url)
}

/// Send the request and decode a JSON body, failing on non-success status
pub(crate) fn get_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
    let response = request.send()?;
    let status = response.status();
    debug!(url = %response.url(), status = status.as_u16(), "response received");

    if !status.is_success() {
        let message = response.text().unwrap_or_default();
        return Err(ClientError::ApiError {
            status: status.as_u16(),
            message,
        });
    }

    let body = response.text()?;
    Ok(serde_json::from_str(&body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_appends_segments() {
        let base = base_url("https://gitlab.example.com/", &["api", "v4"]).unwrap();
        assert_eq!(base.as_str(), "https://gitlab.example.com/api/v4");

        let base = base_url("https://example.com/gitlab", &["api", "v4"]).unwrap();
        assert_eq!(base.as_str(), "https://example.com/gitlab/api/v4");
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let base = base_url("https://gitlab.example.com", &["api", "v4"]).unwrap();
        let url = endpoint(&base, &["projects", "group/app", "releases", "v1.0.0"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://gitlab.example.com/api/v4/projects/group%2Fapp/releases/v1.0.0"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(base_url("not a url", &[]), Err(ClientError::InvalidUrl(_))));
        assert!(matches!(base_url("mailto:x@y", &[]), Err(ClientError::InvalidUrl(_))));
    }
}
