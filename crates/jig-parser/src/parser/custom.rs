//! Custom title parser
//!
//! Applies a user supplied regex with the named groups `scope` and
//! `subject`, e.g. `\[(?P<scope>[^\]]*)\](?P<subject>.*)` for titles like
//! `[AAA-123] add export`.

use regex::Regex;

use jig_core::{CommitCategory, ParserKind};

use super::{TitleMatch, TitleParser};

/// Parser for titles in a configured, non-conventional format
#[derive(Debug, Clone)]
pub struct CustomParser {
    regex: Regex,
}

impl CustomParser {
    /// Compile the parser; returns `Ok(None)` for an empty pattern
    pub fn new(pattern: &str) -> Result<Option<Self>, regex::Error> {
        if pattern.is_empty() {
            return Ok(None);
        }
        Ok(Some(Self {
            regex: Regex::new(pattern)?,
        }))
    }

    /// The pattern this parser applies
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }
}

impl TitleParser for CustomParser {
    fn kind(&self) -> ParserKind {
        ParserKind::CustomParser
    }

    fn parse(&self, title: &str, _message: &str) -> Option<TitleMatch> {
        let caps = self.regex.captures(title)?;

        let scope = caps
            .name("scope")
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        let subject = caps
            .name("subject")
            .map(|m| m.as_str().trim_start().to_string())
            .unwrap_or_default();

        Some(TitleMatch {
            commit_type: String::new(),
            category: CommitCategory::Unknown,
            scope,
            subject,
            breaking: false,
        })
    }
}
