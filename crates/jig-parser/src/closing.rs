//! Closing-pattern scanner
//!
//! Finds phrases like `Closes #12, Fixes JIRA-34 and JIRA-56` anywhere in a
//! commit or merge-request message. References are recognized with the same
//! issue patterns the [`IssueExtractor`](crate::IssueExtractor) uses, plus a
//! built-in `ABC-123` form.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use jig_core::CommitCategory;

/// Strips capture-group names so several patterns can share one regex
static NAMED_GROUP_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\?P?<[A-Za-z_][A-Za-z0-9_]*>").expect("Invalid regex"));

/// Separators between references: commas and/or a standalone "and"
static SEPARATOR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*,\s*(?:and\b\s*)?|\s+and\b\s*").expect("Invalid regex")
});

static ISSUE_PREFIX_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^issues?\s+").expect("Invalid regex"));

const VERBS: &str = r"(?:[Cc]los(?:e[sd]?|ing)|\b[Ff]ix(?:e[sd]|ing)?|\b[Rr]esolv(?:e[sd]?|ing)|\b[Ii]mplement(?:s|ed|ing)?)";

const BUILTIN_REFERENCE: &str = r"[A-Z][A-Z0-9_]+-\d+";

/// Verb family of a closing phrase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClosingVerb {
    Close,
    Fix,
    Resolve,
    Implement,
}

impl ClosingVerb {
    /// Recognize the verb family from a word such as `Closes` or `fixing:`
    pub fn from_word(word: &str) -> Option<Self> {
        let word = word.to_lowercase();
        if word.starts_with("clos") {
            Some(Self::Close)
        } else if word.starts_with("fix") {
            Some(Self::Fix)
        } else if word.starts_with("resolv") {
            Some(Self::Resolve)
        } else if word.starts_with("implement") {
            Some(Self::Implement)
        } else {
            None
        }
    }

    /// Category implied by the verb
    pub fn category(&self) -> CommitCategory {
        match self {
            Self::Close | Self::Implement => CommitCategory::Feature,
            Self::Fix | Self::Resolve => CommitCategory::BugFix,
        }
    }

    /// Base form written as the parsed type
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Close => "close",
            Self::Fix => "fix",
            Self::Resolve => "resolve",
            Self::Implement => "implement",
        }
    }
}

impl fmt::Display for ClosingVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One issue reference found after a closing verb
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosingReference {
    /// Raw reference text, e.g. `#12` or `JIRA-34`
    pub key: String,
    pub verb: ClosingVerb,
}

impl ClosingReference {
    /// Category implied by the verb
    pub fn category(&self) -> CommitCategory {
        self.verb.category()
    }
}

/// Scanner for verb + issue reference phrases
#[derive(Debug, Clone)]
pub struct ClosingPatternParser {
    regex: Regex,
}

impl ClosingPatternParser {
    /// Build the scanner from the configured issue patterns
    pub fn new<'a, I>(issue_patterns: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let references: Vec<String> = issue_patterns
            .into_iter()
            .filter(|p| !p.is_empty())
            .map(|p| NAMED_GROUP_REGEX.replace_all(p, "(").into_owned())
            .collect();

        let reference = if references.is_empty() {
            BUILTIN_REFERENCE.to_string()
        } else {
            format!("(?:{})|(?:{})", references.join("|"), BUILTIN_REFERENCE)
        };

        let regex = Regex::new(&format!(
            r"(?m)\b{verbs}(:?) +(?:(?:issues? +)?(?:{reference})(?: *,? +and +| *,? *)?)+",
            verbs = VERBS,
            reference = reference,
        ))?;

        Ok(Self { regex })
    }

    /// All references found in `message`, in order of appearance
    pub fn parse(&self, message: &str) -> Vec<ClosingReference> {
        let mut references = Vec::new();

        for found in self.regex.find_iter(message) {
            let text = found.as_str();
            let Some(word) = text.split_whitespace().next() else {
                continue;
            };
            let Some(verb) = ClosingVerb::from_word(word) else {
                continue;
            };

            let rest = text[word.len()..].trim();
            for part in SEPARATOR_REGEX.split(rest) {
                let key = ISSUE_PREFIX_REGEX.replace(part.trim(), "");
                if key.is_empty() {
                    continue;
                }
                trace!(verb = %verb, key = %key, "closing reference found");
                references.push(ClosingReference {
                    key: key.into_owned(),
                    verb,
                });
            }
        }

        references
    }
}
