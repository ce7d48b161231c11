//! Collaborator traits implemented by the repository and issue-tracker adapters
//!
//! Every call is synchronous and issued strictly in sequence by the
//! pipeline; failures propagate to the caller without retries.

use crate::error::Result;
use crate::types::{Issue, ParsedRecord, Repo, RepoRecord};

/// Raw access to a repository host
pub trait RepoClient: Send + Sync {
    /// Commits between two tags, oldest first
    fn get_commits(&self, repo_id: &str, from: &str, to: &str) -> Result<Vec<RepoRecord>>;

    /// Merge requests merged into `target_branch` whose merge commit is one of `commits`
    fn get_merge_requests(
        &self,
        repo_id: &str,
        target_branch: &str,
        commits: &[RepoRecord],
    ) -> Result<Vec<RepoRecord>>;

    /// URL of the release page for a tag
    fn get_release_url(&self, repo_id: &str, tag: &str) -> Result<String>;

    /// URL of the repository home page
    fn get_repo_url(&self, repo_id: &str) -> Result<String>;
}

/// Repository access that yields parsed records
pub trait RepoService: Send + Sync {
    /// Parsed commits, followed by parsed merge requests when a target branch applies
    fn get_parsed_records(
        &self,
        repo_id: &str,
        from: &str,
        to: &str,
        mr_target_branch: &str,
    ) -> Result<Vec<ParsedRecord>>;

    /// URL of the release page for a tag
    fn get_release_url(&self, repo_id: &str, tag: &str) -> Result<String>;

    /// URL of the repository home page
    fn get_repo_url(&self, repo_id: &str) -> Result<String>;
}

/// An issue tracker able to resolve issue keys into metadata
pub trait IssueTracker: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Metadata for the given keys; unknown keys are simply absent
    fn get_issues(&self, repo: &Repo, keys: &[String]) -> Result<Vec<Issue>>;

    /// Open issues associated with the component but not referenced by any record
    fn get_known_issues(&self, repo: &Repo) -> Result<Vec<Issue>>;
}
