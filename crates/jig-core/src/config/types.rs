//! Configuration types

use serde::{Deserialize, Serialize};

use super::defaults::{
    default_issue_patterns, DEFAULT_CLOSED_FEATURE_FILTER, DEFAULT_CUSTOM_COMMIT_PATTERN,
    DEFAULT_FIXED_BUG_FILTER, DEFAULT_KNOWN_ISSUES_JQL,
};

/// Main configuration for jig
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Ordered issue-key extraction rules; the first matching rule wins
    #[serde(alias = "issuePatterns")]
    pub issue_patterns: Vec<IssuePatternConfig>,

    /// Fallback title pattern with the named groups `scope` and `subject`
    #[serde(alias = "customCommitPattern")]
    pub custom_commit_pattern: String,

    /// Record conventional commits that have no scope
    #[serde(alias = "withCCWithoutScope")]
    pub keep_cc_without_scope: bool,

    /// Git hosting configuration
    pub git: GitConfig,

    /// Jira configuration
    pub jira: JiraConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            issue_patterns: default_issue_patterns(),
            custom_commit_pattern: DEFAULT_CUSTOM_COMMIT_PATTERN.to_string(),
            keep_cc_without_scope: false,
            git: GitConfig::default(),
            jira: JiraConfig::default(),
        }
    }
}

/// One `(tracker, regex)` issue-key rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuePatternConfig {
    /// Tracker label, case-insensitive (e.g. `jira`, `git`)
    #[serde(alias = "issueTracker")]
    pub issue_tracker: String,

    /// Regular expression; the last (or first participating named) group is the key
    pub pattern: String,
}

impl IssuePatternConfig {
    /// Create a new rule
    pub fn new(issue_tracker: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            issue_tracker: issue_tracker.into(),
            pattern: pattern.into(),
        }
    }
}

/// Git hosting (GitLab) configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    /// Base URL of the GitLab instance
    pub url: String,

    /// Token with read API permissions
    pub token: String,

    /// Merge-request target branch; merge requests are skipped when empty
    pub mr_branch: String,
}

impl GitConfig {
    /// Whether both URL and token are set
    pub fn has_credentials(&self) -> bool {
        !self.url.is_empty() && !self.token.is_empty()
    }
}

/// Jira configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JiraConfig {
    /// Base URL of the Jira instance
    pub url: String,

    /// Username with read API permissions
    pub username: String,

    /// Password or API token
    pub password: String,

    /// `TYPE:STATUS` pairs identifying closed features
    pub closed_feature_filter: Vec<String>,

    /// `TYPE:STATUS` pairs identifying fixed bugs
    pub fixed_bug_filter: Vec<String>,

    /// JQL selecting the open known issues of a project
    pub known_issues_jql: String,
}

impl Default for JiraConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            username: String::new(),
            password: String::new(),
            closed_feature_filter: DEFAULT_CLOSED_FEATURE_FILTER
                .iter()
                .map(|s| s.to_string())
                .collect(),
            fixed_bug_filter: DEFAULT_FIXED_BUG_FILTER
                .iter()
                .map(|s| s.to_string())
                .collect(),
            known_issues_jql: DEFAULT_KNOWN_ISSUES_JQL.to_string(),
        }
    }
}

impl JiraConfig {
    /// Whether URL, username and password are all set
    pub fn has_credentials(&self) -> bool {
        !self.url.is_empty() && !self.username.is_empty() && !self.password.is_empty()
    }
}
