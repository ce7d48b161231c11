//! Collaborator adapters for jig
//!
//! Blocking HTTP clients for the services a release model is enriched from:
//!
//! - **GitLab**: commits, merge requests and URLs of a project, and the
//!   `GIT` issue tracker
//! - **Jira**: the `JIRA` issue tracker, including known issues
//!
//! ## Usage
//!
//! ```ignore
//! use jig_clients::{GitLab, Jira};
//!
//! let gitlab = GitLab::from_config(&config.git)?;
//! let jira = Jira::from_config(&config.jira)?;
//! let issues = jira.get_issues(&repo, &keys)?;
//! ```

pub mod error;
pub mod gitlab;
mod http;
pub mod jira;

pub use error::ClientError;
pub use gitlab::GitLab;
pub use jira::Jira;
