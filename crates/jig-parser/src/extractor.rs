//! Issue-key extraction
//!
//! Maps a free-text reference (a conventional-commit scope, a closing
//! reference, ...) to an issue key and the label of the tracker owning it.

use regex::Regex;
use tracing::{debug, warn};

use jig_core::config::IssuePatternConfig;
use jig_core::{ConfigError, Result, UNTRACKED};

/// A compiled `(tracker, regex)` rule
#[derive(Debug, Clone)]
pub struct IssuePattern {
    tracker: String,
    regex: Regex,
}

impl IssuePattern {
    /// Compile a rule; the tracker label is upper-cased
    pub fn new(tracker: &str, pattern: &str) -> std::result::Result<Self, regex::Error> {
        Ok(Self {
            tracker: tracker.to_uppercase(),
            regex: Regex::new(pattern)?,
        })
    }

    /// Upper-cased tracker label
    pub fn tracker(&self) -> &str {
        &self.tracker
    }

    /// Source text of the regex
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    /// Key captured by the first match, if non-empty.
    ///
    /// Patterns with named groups yield the first named group that
    /// captured something (`jira_1`, `jira_2`, ... variants of one tracker);
    /// otherwise the last group, or the whole match without groups.
    fn capture<'t>(&self, text: &'t str) -> Option<&'t str> {
        let caps = self.regex.captures(text)?;

        let mut named = self.regex.capture_names().flatten().peekable();
        let key = if named.peek().is_some() {
            named
                .filter_map(|name| caps.name(name))
                .map(|m| m.as_str())
                .find(|s| !s.is_empty())
        } else {
            caps.get(caps.len() - 1).map(|m| m.as_str())
        };

        key.filter(|k| !k.is_empty())
    }
}

/// Result of an extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRef {
    pub key: String,
    /// Tracker label, or `NONE` when no rule matched
    pub tracker: String,
}

impl IssueRef {
    /// Sentinel for text no rule recognizes; the text is kept as the key
    pub fn untracked(text: &str) -> Self {
        Self {
            key: text.to_string(),
            tracker: UNTRACKED.to_string(),
        }
    }

    /// Whether no rule matched
    pub fn is_untracked(&self) -> bool {
        self.tracker == UNTRACKED
    }
}

/// Ordered set of issue rules; the first rule that matches wins
#[derive(Debug, Clone, Default)]
pub struct IssueExtractor {
    patterns: Vec<IssuePattern>,
}

impl IssueExtractor {
    /// Create an extractor without rules
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile the configured rules, skipping incomplete ones
    pub fn from_rules(rules: &[IssuePatternConfig]) -> Result<Self> {
        let mut extractor = Self::new();
        for (i, rule) in rules.iter().enumerate() {
            if rule.issue_tracker.is_empty() || rule.pattern.is_empty() {
                warn!(index = i, "skipping issue pattern without tracker or pattern");
                continue;
            }
            let pattern = IssuePattern::new(&rule.issue_tracker, &rule.pattern).map_err(|source| {
                ConfigError::InvalidPattern {
                    field: format!("issue_patterns[{}].pattern", i),
                    pattern: rule.pattern.clone(),
                    source,
                }
            })?;
            extractor.patterns.push(pattern);
        }
        debug!(count = extractor.patterns.len(), "issue patterns compiled");
        Ok(extractor)
    }

    /// Append a compiled rule
    pub fn push(&mut self, pattern: IssuePattern) {
        self.patterns.push(pattern);
    }

    /// The rules in priority order
    pub fn patterns(&self) -> &[IssuePattern] {
        &self.patterns
    }

    /// Find the issue key and tracker referenced by `text`
    pub fn extract(&self, text: &str) -> IssueRef {
        if text.is_empty() {
            return IssueRef::untracked(text);
        }

        self.patterns
            .iter()
            .find_map(|pattern| {
                pattern.capture(text).map(|key| IssueRef {
                    key: key.to_string(),
                    tracker: pattern.tracker.clone(),
                })
            })
            .unwrap_or_else(|| IssueRef::untracked(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor(rules: &[(&str, &str)]) -> IssueExtractor {
        let rules: Vec<_> = rules
            .iter()
            .map(|(tracker, pattern)| IssuePatternConfig::new(*tracker, *pattern))
            .collect();
        IssueExtractor::from_rules(&rules).unwrap()
    }

    #[test]
    fn test_extract_last_group() {
        let ex = extractor(&[("jira", r"j_(.+)")]);
        let found = ex.extract("j_JIRA-123");
        assert_eq!(found.key, "JIRA-123");
        assert_eq!(found.tracker, "JIRA");
    }

    #[test]
    fn test_extract_whole_match_without_groups() {
        let ex = extractor(&[("jira", r"JIRA-\d+")]);
        assert_eq!(ex.extract("see JIRA-42 now").key, "JIRA-42");
    }

    #[test]
    fn test_extract_git_number() {
        let ex = extractor(&[("git", r"#([A-Z0-9]+)")]);
        let found = ex.extract("#123");
        assert_eq!(found.key, "123");
        assert_eq!(found.tracker, "GIT");
    }

    #[test]
    fn test_no_match_keeps_text() {
        let ex = extractor(&[("jira", r"JIRA-\d+")]);
        let found = ex.extract("core");
        assert_eq!(found.key, "core");
        assert_eq!(found.tracker, "NONE");
        assert!(found.is_untracked());
    }

    #[test]
    fn test_empty_text_is_untracked() {
        let ex = extractor(&[("jira", r".*")]);
        let found = ex.extract("");
        assert_eq!(found, IssueRef::untracked(""));
    }

    #[test]
    fn test_first_matching_pattern_wins() {
        let ex = extractor(&[("silk", r"SILK-\d+"), ("jira", r"[A-Z]+-\d+"), ("git", r"#(\d+)")]);
        assert_eq!(ex.extract("SILK-7").tracker, "SILK");
        assert_eq!(ex.extract("ABC-7").tracker, "JIRA");
        assert_eq!(ex.extract("#7 ABC-8").tracker, "JIRA");
    }

    #[test]
    fn test_empty_capture_falls_through() {
        let ex = extractor(&[("jira", r"x(\d*)"), ("git", r"#(\d+)")]);
        let found = ex.extract("x #5");
        assert_eq!(found.key, "5");
        assert_eq!(found.tracker, "GIT");
    }

    #[test]
    fn test_named_group_variants() {
        let ex = extractor(&[("jira", r"j_(?P<jira_1>[A-Z]+-\d+)|jira/(?P<jira_2>[A-Z]+-\d+)")]);
        assert_eq!(ex.extract("j_AAA-1").key, "AAA-1");
        assert_eq!(ex.extract("jira/BBB-2").key, "BBB-2");
    }

    #[test]
    fn test_incomplete_rules_are_skipped() {
        let ex = extractor(&[("", r"#(\d+)"), ("jira", ""), ("git", r"#(\d+)")]);
        assert_eq!(ex.patterns().len(), 1);
    }

    #[test]
    fn test_invalid_rule_is_config_error() {
        let rules = vec![IssuePatternConfig::new("jira", "(")];
        assert!(IssueExtractor::from_rules(&rules).is_err());
    }
}
