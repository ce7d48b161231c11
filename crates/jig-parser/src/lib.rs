//! Jig Parser - turns commit and merge-request text into issue references
//!
//! Each repository record goes through the title parsers (conventional
//! commits first, then the configured custom pattern) and, independently,
//! through the closing-pattern scanner. Every reference found is mapped to
//! an issue tracker by the [`IssueExtractor`].

pub mod closing;
pub mod extractor;
pub mod parser;
pub mod record;

pub use closing::{ClosingPatternParser, ClosingReference, ClosingVerb};
pub use extractor::{IssueExtractor, IssuePattern, IssueRef};
pub use parser::{
    ConventionalParser, CustomParser, ParserConfig, TitleMatch, TitleParser, TitleParserChain,
};
pub use record::RecordParser;
