//! GitLab integration
//!
//! Serves both as the repository client (commits, merge requests, project
//! and release URLs) and as the `GIT` issue tracker.
//!
//! ## Authentication
//!
//! Every request carries the configured token in the `PRIVATE-TOKEN` header.

use std::collections::HashSet;

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, info, instrument};

use jig_core::config::GitConfig;
use jig_core::{
    ConfigError, Issue, IssueCategory, IssueTracker, RecordOrigin, Repo, RepoClient, RepoRecord,
    Result,
};

use crate::error::ClientError;
use crate::http::{base_url, endpoint, get_json};

const COLLABORATOR: &str = "gitlab";
const TOKEN_HEADER: &str = "PRIVATE-TOKEN";

#[derive(Debug, Deserialize)]
struct CompareResponse {
    #[serde(default)]
    commits: Vec<CommitResponse>,
}

#[derive(Debug, Deserialize)]
struct CommitResponse {
    id: String,
    #[serde(default)]
    short_id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    message: String,
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    web_url: String,
}

impl From<CommitResponse> for RepoRecord {
    fn from(commit: CommitResponse) -> Self {
        RepoRecord {
            id: commit.id,
            short_id: commit.short_id,
            title: commit.title,
            message: commit.message,
            created_at: commit.created_at,
            web_url: commit.web_url,
            origin: RecordOrigin::Commit,
        }
    }
}

#[derive(Debug, Deserialize)]
struct MergeRequestResponse {
    id: u64,
    iid: u64,
    #[serde(default)]
    title: String,
    description: Option<String>,
    sha: Option<String>,
    merged_at: Option<DateTime<Utc>>,
    #[serde(default)]
    web_url: String,
}

impl From<MergeRequestResponse> for RepoRecord {
    fn from(mr: MergeRequestResponse) -> Self {
        RepoRecord {
            id: mr.id.to_string(),
            short_id: mr.iid.to_string(),
            title: mr.title,
            message: mr.description.unwrap_or_default(),
            created_at: mr.merged_at,
            web_url: mr.web_url,
            origin: RecordOrigin::MergeRequest,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProjectResponse {
    web_url: String,
}

#[derive(Debug, Deserialize)]
struct ReleaseResponse {
    #[serde(rename = "_links")]
    links: ReleaseLinks,
}

#[derive(Debug, Deserialize)]
struct ReleaseLinks {
    #[serde(rename = "self")]
    self_url: String,
}

#[derive(Debug, Deserialize)]
struct IssueResponse {
    iid: u64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    state: String,
    issue_type: Option<String>,
    #[serde(default)]
    labels: Vec<String>,
    #[serde(default)]
    web_url: String,
}

/// GitLab REST API (v4) adapter
#[derive(Debug, Clone)]
pub struct GitLab {
    client: Client,
    base: Url,
    token: String,
    feature_labels: Vec<String>,
    bug_labels: Vec<String>,
}

impl GitLab {
    /// Create an adapter for the instance at `url`
    pub fn new(url: &str, token: impl Into<String>) -> Result<Self> {
        let base = base_url(url, &["api", "v4"]).map_err(|e| ConfigError::InvalidValue {
            field: "git.url".to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            client: Client::new(),
            base,
            token: token.into(),
            feature_labels: vec!["feature".to_string()],
            bug_labels: vec!["bug".to_string()],
        })
    }

    /// Create an adapter from the `git` configuration section
    pub fn from_config(config: &GitConfig) -> Result<Self> {
        Self::new(&config.url, config.token.clone())
    }

    /// Base API URL
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn get(&self, segments: &[&str]) -> std::result::Result<RequestBuilder, ClientError> {
        let url = endpoint(&self.base, segments)?;
        debug!(url = %url, "GitLab request");
        Ok(self.client.get(url).header(TOKEN_HEADER, &self.token))
    }

    /// Category of an issue from its labels; unlabeled issues count as features
    fn issue_category(&self, labels: &[String]) -> IssueCategory {
        let has = |wanted: &[String]| {
            wanted
                .iter()
                .any(|w| labels.iter().any(|l| l.eq_ignore_ascii_case(w)))
        };
        if has(&self.feature_labels) {
            IssueCategory::ClosedFeature
        } else if has(&self.bug_labels) {
            IssueCategory::FixedBug
        } else {
            IssueCategory::ClosedFeature
        }
    }

    fn fetch_commits(&self, id: &str, from: &str, to: &str) -> std::result::Result<Vec<RepoRecord>, ClientError> {
        let request = self
            .get(&["projects", id, "repository", "compare"])?
            .query(&[("from", from), ("to", to)]);
        let compare: CompareResponse = get_json(request)?;
        Ok(compare.commits.into_iter().map(RepoRecord::from).collect())
    }

    fn fetch_merge_requests(
        &self,
        id: &str,
        target_branch: &str,
        commits: &[RepoRecord],
    ) -> std::result::Result<Vec<RepoRecord>, ClientError> {
        let mut query = vec![
            ("state", "merged".to_string()),
            ("target_branch", target_branch.to_string()),
        ];
        if let Some(created_at) = commits.first().and_then(|c| c.created_at) {
            query.push((
                "updated_after",
                created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            ));
        }

        let request = self.get(&["projects", id, "merge_requests"])?.query(&query);
        let merge_requests: Vec<MergeRequestResponse> = get_json(request)?;

        let wanted: HashSet<&str> = commits.iter().map(|c| c.id.as_str()).collect();
        Ok(merge_requests
            .into_iter()
            .filter(|mr| mr.sha.as_deref().is_some_and(|sha| wanted.contains(sha)))
            .map(RepoRecord::from)
            .collect())
    }

    fn fetch_issues(&self, id: &str, keys: &[String]) -> std::result::Result<Vec<Issue>, ClientError> {
        let mut query = Vec::with_capacity(keys.len());
        for key in keys {
            let iid: u64 = key
                .parse()
                .map_err(|_| ClientError::InvalidKey(key.clone()))?;
            query.push(("iids[]", iid));
        }

        let request = self.get(&["projects", id, "issues"])?.query(&query);
        let issues: Vec<IssueResponse> = get_json(request)?;

        Ok(issues
            .into_iter()
            .map(|issue| {
                let category = self.issue_category(&issue.labels);
                Issue::new(issue.iid.to_string(), category)
                    .with_summary(issue.title)
                    .with_type_and_status(issue.issue_type.unwrap_or_default(), issue.state)
                    .with_web_url(issue.web_url)
            })
            .collect())
    }
}

impl RepoClient for GitLab {
    #[instrument(skip(self))]
    fn get_commits(&self, repo_id: &str, from: &str, to: &str) -> Result<Vec<RepoRecord>> {
        let commits = self
            .fetch_commits(repo_id, from, to)
            .map_err(|e| e.into_jig(COLLABORATOR))?;
        info!(count = commits.len(), "commits retrieved");
        Ok(commits)
    }

    #[instrument(skip(self, commits), fields(commits = commits.len()))]
    fn get_merge_requests(
        &self,
        repo_id: &str,
        target_branch: &str,
        commits: &[RepoRecord],
    ) -> Result<Vec<RepoRecord>> {
        if commits.is_empty() {
            return Ok(Vec::new());
        }
        let merge_requests = self
            .fetch_merge_requests(repo_id, target_branch, commits)
            .map_err(|e| e.into_jig(COLLABORATOR))?;
        info!(count = merge_requests.len(), "merge requests retrieved");
        Ok(merge_requests)
    }

    fn get_release_url(&self, repo_id: &str, tag: &str) -> Result<String> {
        let release: ReleaseResponse = self
            .get(&["projects", repo_id, "releases", tag])
            .and_then(get_json::<ReleaseResponse>)
            .map_err(|e| e.into_jig(COLLABORATOR))?;
        Ok(release.links.self_url)
    }

    fn get_repo_url(&self, repo_id: &str) -> Result<String> {
        let project: ProjectResponse = self
            .get(&["projects", repo_id])
            .and_then(get_json::<ProjectResponse>)
            .map_err(|e| e.into_jig(COLLABORATOR))?;
        Ok(project.web_url)
    }
}

impl IssueTracker for GitLab {
    fn name(&self) -> &str {
        COLLABORATOR
    }

    #[instrument(skip(self, repo), fields(repo = %repo.label))]
    fn get_issues(&self, repo: &Repo, keys: &[String]) -> Result<Vec<Issue>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        self.fetch_issues(&repo.git_repo_id, keys)
            .map_err(|e| e.into_jig(COLLABORATOR))
    }

    fn get_known_issues(&self, repo: &Repo) -> Result<Vec<Issue>> {
        debug!(repo = %repo.label, "known issues are not tracked on GitLab");
        Ok(Vec::new())
    }
}
