//! Ordered title parser chain

use std::sync::Arc;

use tracing::trace;

use super::{ConventionalParser, TitleMatch, TitleParser};
use jig_core::ParserKind;

/// Title parsers tried in registration order until one succeeds
pub struct TitleParserChain {
    parsers: Vec<Arc<dyn TitleParser>>,
}

impl TitleParserChain {
    /// Create a chain holding only the conventional parser
    pub fn new() -> Self {
        Self {
            parsers: vec![Arc::new(ConventionalParser::new())],
        }
    }

    /// Create an empty chain
    pub fn empty() -> Self {
        Self {
            parsers: Vec::new(),
        }
    }

    /// Append a parser to the end of the chain
    pub fn register<P: TitleParser + 'static>(&mut self, parser: P) {
        self.parsers.push(Arc::new(parser));
    }

    /// Get all registered parsers
    pub fn all(&self) -> &[Arc<dyn TitleParser>] {
        &self.parsers
    }

    /// First successful parse, with the kind of parser that produced it
    pub fn parse(&self, title: &str, message: &str) -> Option<(ParserKind, TitleMatch)> {
        self.parsers.iter().find_map(|parser| {
            let parsed = parser.parse(title, message)?;
            trace!(parser = %parser.kind(), title, "title parsed");
            Some((parser.kind(), parsed))
        })
    }
}

impl Default for TitleParserChain {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::CustomParser;
    use jig_core::config::DEFAULT_CUSTOM_COMMIT_PATTERN;

    fn full_chain() -> TitleParserChain {
        let mut chain = TitleParserChain::new();
        chain.register(
            CustomParser::new(DEFAULT_CUSTOM_COMMIT_PATTERN)
                .unwrap()
                .unwrap(),
        );
        chain
    }

    #[test]
    fn test_chain_creation() {
        assert_eq!(TitleParserChain::new().all().len(), 1);
        assert!(TitleParserChain::empty().all().is_empty());
    }

    #[test]
    fn test_conventional_wins_over_custom() {
        let (kind, parsed) = full_chain()
            .parse("feat(AAA-1): [BBB-2] both", "")
            .unwrap();
        assert_eq!(kind, ParserKind::ConventionalParser);
        assert_eq!(parsed.scope, "AAA-1");
    }

    #[test]
    fn test_falls_back_to_custom() {
        let (kind, parsed) = full_chain().parse("[BBB-2] custom only", "").unwrap();
        assert_eq!(kind, ParserKind::CustomParser);
        assert_eq!(parsed.scope, "BBB-2");
    }

    #[test]
    fn test_nothing_matches() {
        assert!(full_chain().parse("plain", "").is_none());
        assert!(TitleParserChain::empty().parse("feat: x", "").is_none());
    }
}
