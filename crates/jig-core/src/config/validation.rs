//! Configuration validation

use regex::Regex;
use tracing::debug;

use crate::error::{ConfigError, Result};

use super::types::{Config, GitConfig, JiraConfig};

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    debug!("validating configuration");
    validate_issue_patterns(config)?;
    validate_custom_pattern(config)?;
    validate_filter("jira.closed_feature_filter", &config.jira.closed_feature_filter)?;
    validate_filter("jira.fixed_bug_filter", &config.jira.fixed_bug_filter)?;
    debug!("configuration validation passed");
    Ok(())
}

fn validate_issue_patterns(config: &Config) -> Result<()> {
    for (i, rule) in config.issue_patterns.iter().enumerate() {
        if rule.issue_tracker.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: format!("issue_patterns[{}].issue_tracker", i),
                message: "tracker label cannot be empty".to_string(),
            }
            .into());
        }

        if rule.pattern.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: format!("issue_patterns[{}].pattern", i),
                message: "pattern cannot be empty".to_string(),
            }
            .into());
        }

        Regex::new(&rule.pattern).map_err(|source| ConfigError::InvalidPattern {
            field: format!("issue_patterns[{}].pattern", i),
            pattern: rule.pattern.clone(),
            source,
        })?;
    }

    Ok(())
}

fn validate_custom_pattern(config: &Config) -> Result<()> {
    // An empty pattern disables the custom parser
    if config.custom_commit_pattern.is_empty() {
        return Ok(());
    }

    let re = Regex::new(&config.custom_commit_pattern).map_err(|source| {
        ConfigError::InvalidPattern {
            field: "custom_commit_pattern".to_string(),
            pattern: config.custom_commit_pattern.clone(),
            source,
        }
    })?;

    for group in ["scope", "subject"] {
        if !re.capture_names().flatten().any(|name| name == group) {
            return Err(ConfigError::InvalidValue {
                field: "custom_commit_pattern".to_string(),
                message: format!("must declare the named group '{}'", group),
            }
            .into());
        }
    }

    Ok(())
}

fn validate_filter(field: &str, filters: &[String]) -> Result<()> {
    for filter in filters {
        match filter.split_once(':') {
            Some((issue_type, status))
                if !issue_type.is_empty() && !status.is_empty() && !status.contains(':') => {}
            _ => {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    message: format!("'{}' is not a TYPE:STATUS pair", filter),
                }
                .into());
            }
        }
    }

    Ok(())
}

/// Ensure the git hosting credentials needed by repository commands are set
pub fn require_git_credentials(git: &GitConfig) -> Result<()> {
    if git.url.is_empty() {
        return Err(ConfigError::MissingField("git.url".to_string()).into());
    }
    if git.token.is_empty() {
        return Err(ConfigError::MissingField("git.token".to_string()).into());
    }
    Ok(())
}

/// Ensure the Jira credentials needed by tracker enrichment are set
pub fn require_jira_credentials(jira: &JiraConfig) -> Result<()> {
    for (field, value) in [
        ("jira.url", &jira.url),
        ("jira.username", &jira.username),
        ("jira.password", &jira.password),
    ] {
        if value.is_empty() {
            return Err(ConfigError::MissingField(field.to_string()).into());
        }
    }
    Ok(())
}
