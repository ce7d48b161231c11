//! Conventional Commits parser
//!
//! Parses titles following the Conventional Commits specification:
//! https://www.conventionalcommits.org/
//!
//! The type is taken verbatim; only `feat` and `fix` carry a category.

use regex::Regex;
use std::sync::LazyLock;

use jig_core::{CommitCategory, ParserKind};

use super::{TitleMatch, TitleParser};

/// Regex for parsing conventional commit titles
static CONVENTIONAL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<type>[^(:!]+)(?:\((?P<scope>[^)]+)\))?(?P<breaking>!)?: (?P<subject>.*)")
        .expect("Invalid regex")
});

/// Footer tokens announcing a breaking change anywhere in the message
const BREAKING_FOOTERS: [&str; 2] = ["BREAKING CHANGE: ", "BREAKING-CHANGE: "];

/// Parser for Conventional Commits titles
#[derive(Debug, Default, Clone, Copy)]
pub struct ConventionalParser;

impl ConventionalParser {
    /// Create a new parser
    pub fn new() -> Self {
        Self
    }

    /// Map a commit type to its category
    pub fn category_of(commit_type: &str) -> CommitCategory {
        match commit_type {
            "feat" => CommitCategory::Feature,
            "fix" => CommitCategory::BugFix,
            _ => CommitCategory::Unknown,
        }
    }
}

impl TitleParser for ConventionalParser {
    fn kind(&self) -> ParserKind {
        ParserKind::ConventionalParser
    }

    fn parse(&self, title: &str, message: &str) -> Option<TitleMatch> {
        let caps = CONVENTIONAL_REGEX.captures(title)?;

        let commit_type = caps.name("type")?.as_str().to_string();
        let scope = caps
            .name("scope")
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        let subject = caps
            .name("subject")
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        let breaking_marker = caps.name("breaking").is_some();
        let breaking_in_footer = BREAKING_FOOTERS
            .iter()
            .any(|footer| message.contains(footer));

        Some(TitleMatch {
            category: Self::category_of(&commit_type),
            commit_type,
            scope,
            subject,
            breaking: breaking_marker || breaking_in_footer,
        })
    }
}
