//! Jig Model - the release model file and its enrichment
//!
//! This crate loads the model document, collects parsed records for every
//! component through a [`RepoService`](jig_core::RepoService), joins them
//! with issue-tracker metadata and writes the result back under
//! `generatedValues` without disturbing the rest of the file.

pub mod document;
pub mod enrich;
pub mod model;
pub mod registry;
pub mod repo_service;
pub mod version;

#[cfg(test)]
mod testing;

pub use document::{Document, YamlPath};
pub use enrich::Enricher;
pub use model::{Model, GENERATED_VALUES_KEY};
pub use registry::{TrackerEntry, TrackerRegistry};
pub use repo_service::ParsingRepoService;
pub use version::{suggest_version, BumpType, VersionComponents};
