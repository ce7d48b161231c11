//! Parser configuration types

use jig_core::config::{Config, IssuePatternConfig, DEFAULT_CUSTOM_COMMIT_PATTERN};
use jig_core::CommitCategory;

/// Resolved configuration for the record parser
#[derive(Debug, Clone, PartialEq)]
pub struct ParserConfig {
    /// Ordered issue-key extraction rules
    pub issue_patterns: Vec<IssuePatternConfig>,
    /// Fallback title pattern; empty disables the custom parser
    pub custom_pattern: String,
    /// Record conventional commits that have no scope
    pub keep_without_scope: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            issue_patterns: Vec::new(),
            custom_pattern: DEFAULT_CUSTOM_COMMIT_PATTERN.to_string(),
            keep_without_scope: false,
        }
    }
}

impl ParserConfig {
    /// Take the parser settings out of the loaded configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            issue_patterns: config.issue_patterns.clone(),
            custom_pattern: config.custom_commit_pattern.clone(),
            keep_without_scope: config.keep_cc_without_scope,
        }
    }

    /// Add an issue pattern
    pub fn issue_pattern(mut self, tracker: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.issue_patterns
            .push(IssuePatternConfig::new(tracker, pattern));
        self
    }

    /// Set the custom title pattern
    pub fn with_custom_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.custom_pattern = pattern.into();
        self
    }

    /// Set whether conventional commits without scope are recorded
    pub fn with_keep_without_scope(mut self, keep: bool) -> Self {
        self.keep_without_scope = keep;
        self
    }
}

/// Result of decomposing a title
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleMatch {
    /// Conventional commit type (`feat`, `fix`, ...); empty for custom matches
    pub commit_type: String,
    pub category: CommitCategory,
    /// Scope, usually holding the issue reference
    pub scope: String,
    pub subject: String,
    pub breaking: bool,
}
