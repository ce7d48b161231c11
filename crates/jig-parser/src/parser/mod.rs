//! Title parsing

mod conventional;
mod custom;
mod registry;
mod types;

pub use conventional::ConventionalParser;
pub use custom::CustomParser;
pub use registry::TitleParserChain;
pub use types::*;

use jig_core::ParserKind;

/// Trait for commit and merge-request title parsers
pub trait TitleParser: Send + Sync {
    /// Which parser this is, as recorded on parsed records
    fn kind(&self) -> ParserKind;

    /// Decompose a title; `message` is the full text the title belongs to
    fn parse(&self, title: &str, message: &str) -> Option<TitleMatch>;
}
