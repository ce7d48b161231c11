//! Jig Core - shared foundation of the jig release-notes tool
//!
//! This crate provides the release model entities, the collaborator traits
//! implemented by the repository and issue-tracker adapters, error handling
//! and configuration loading.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use error::{ConfigError, DocumentError, FetchError, JigError, Result, VersionError};
pub use traits::{IssueTracker, RepoClient, RepoService};
pub use types::{
    CommitCategory, EnrichedRepo, ExtractedIssue, GeneratedValues, Issue, IssueCategory,
    ParsedRecord, ParserKind, RecordOrigin, Repo, RepoRecord, UNTRACKED,
};
