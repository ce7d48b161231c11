//! Record parser
//!
//! Turns repository records into parsed records. For every record the title
//! parser chain runs first (conventional, then custom); its result is kept
//! when it names a scope, or when scope-less conventional commits are
//! enabled and the commit has a known category and a subject. The closing
//! pattern scanner then runs over the full message, independently.

use std::collections::HashSet;

use tracing::{debug, instrument};

use jig_core::{ConfigError, ParsedRecord, ParserKind, RepoRecord, Result};

use crate::closing::ClosingPatternParser;
use crate::extractor::IssueExtractor;
use crate::parser::{CustomParser, ParserConfig, TitleParserChain};

/// Parser producing [`ParsedRecord`]s from [`RepoRecord`]s
pub struct RecordParser {
    extractor: IssueExtractor,
    titles: TitleParserChain,
    closing: ClosingPatternParser,
    keep_without_scope: bool,
}

impl RecordParser {
    /// Compile every pattern of the configuration
    pub fn new(config: &ParserConfig) -> Result<Self> {
        let extractor = IssueExtractor::from_rules(&config.issue_patterns)?;

        let mut titles = TitleParserChain::new();
        let custom = CustomParser::new(&config.custom_pattern).map_err(|source| {
            ConfigError::InvalidPattern {
                field: "custom_commit_pattern".to_string(),
                pattern: config.custom_pattern.clone(),
                source,
            }
        })?;
        if let Some(custom) = custom {
            titles.register(custom);
        }

        let closing = ClosingPatternParser::new(extractor.patterns().iter().map(|p| p.pattern()))
            .map_err(|e| ConfigError::ParseError(format!("closing pattern: {}", e)))?;

        Ok(Self {
            extractor,
            titles,
            closing,
            keep_without_scope: config.keep_without_scope,
        })
    }

    /// The issue extractor shared by all parsers
    pub fn extractor(&self) -> &IssueExtractor {
        &self.extractor
    }

    /// Parse a batch of records.
    ///
    /// Title results are deduplicated by issue key within the batch, first
    /// seen wins; results with an empty key and closing references are
    /// always kept. Output follows input order, title result first.
    #[instrument(skip_all, fields(records = records.len()))]
    pub fn parse(&self, records: &[RepoRecord]) -> Vec<ParsedRecord> {
        let mut found: HashSet<String> = HashSet::new();
        let mut parsed = Vec::new();

        for record in records {
            if let Some(entry) = self.parse_title(record) {
                if entry.parsed_key.is_empty() || found.insert(entry.parsed_key.clone()) {
                    parsed.push(entry);
                } else {
                    debug!(key = %entry.parsed_key, record = %record, "duplicate issue key skipped");
                }
            }

            parsed.extend(self.parse_closing(record));
        }

        debug!(parsed = parsed.len(), "records parsed");
        parsed
    }

    fn parse_title(&self, record: &RepoRecord) -> Option<ParsedRecord> {
        let title = if record.title.is_empty() {
            record.message.lines().next().unwrap_or_default()
        } else {
            record.title.as_str()
        };

        let (kind, title_match) = self.titles.parse(title, &record.message)?;

        let keep = !title_match.scope.is_empty()
            || (self.keep_without_scope
                && !title_match.category.is_unknown()
                && !title_match.subject.is_empty());
        if !keep {
            return None;
        }

        let issue = self.extractor.extract(&title_match.scope);
        Some(ParsedRecord {
            record: record.clone(),
            parsed_summary: title_match.subject,
            parsed_category: title_match.category,
            parsed_key: issue.key,
            parsed_issue_tracker: issue.tracker,
            parser: kind,
            parsed_type: title_match.commit_type,
            is_breaking_change: title_match.breaking,
        })
    }

    fn parse_closing(&self, record: &RepoRecord) -> Vec<ParsedRecord> {
        self.closing
            .parse(&record.message)
            .into_iter()
            .map(|reference| {
                let issue = self.extractor.extract(&reference.key);
                ParsedRecord {
                    record: record.clone(),
                    parsed_summary: String::new(),
                    parsed_category: reference.category(),
                    parsed_key: issue.key,
                    parsed_issue_tracker: issue.tracker,
                    parser: ParserKind::ClosingPattern,
                    parsed_type: reference.verb.to_string(),
                    is_breaking_change: false,
                }
            })
            .collect()
    }
}
