//! In-memory collaborators for tests

use std::sync::{Arc, Mutex};

use jig_core::{
    CommitCategory, FetchError, Issue, IssueTracker, ParsedRecord, ParserKind, Repo, RepoClient,
    RepoRecord, Result,
};

/// Parsed record with the given key, tracker and category
pub(crate) fn parsed(key: &str, tracker: &str, category: CommitCategory) -> ParsedRecord {
    ParsedRecord {
        record: RepoRecord::commit(format!("sha-{}", key), format!("title {}", key), ""),
        parsed_summary: format!("summary {}", key),
        parsed_category: category,
        parsed_key: key.to_string(),
        parsed_issue_tracker: tracker.to_string(),
        parser: ParserKind::ConventionalParser,
        parsed_type: "feat".to_string(),
        is_breaking_change: false,
    }
}

pub(crate) type CallLog = Arc<Mutex<Vec<Vec<String>>>>;

/// Tracker answering from a fixed issue list
pub(crate) struct MockTracker {
    name: String,
    issues: Vec<Issue>,
    known: Vec<Issue>,
    failing: bool,
    calls: CallLog,
}

impl MockTracker {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            issues: Vec::new(),
            known: Vec::new(),
            failing: false,
            calls: CallLog::default(),
        }
    }

    pub fn with_issue(mut self, issue: Issue) -> Self {
        self.issues.push(issue);
        self
    }

    pub fn with_known(mut self, issue: Issue) -> Self {
        self.known.push(issue);
        self
    }

    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    /// Keys of every `get_issues` call, shared with the tracker
    pub fn calls(&self) -> CallLog {
        Arc::clone(&self.calls)
    }
}

impl IssueTracker for MockTracker {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_issues(&self, _repo: &Repo, keys: &[String]) -> Result<Vec<Issue>> {
        self.calls.lock().unwrap().push(keys.to_vec());
        if self.failing {
            return Err(FetchError::Api {
                collaborator: self.name.clone(),
                status: 500,
                message: "boom".to_string(),
            }
            .into());
        }
        Ok(self
            .issues
            .iter()
            .filter(|issue| keys.contains(&issue.issue_key))
            .cloned()
            .collect())
    }

    fn get_known_issues(&self, _repo: &Repo) -> Result<Vec<Issue>> {
        Ok(self.known.clone())
    }
}

/// Repository answering from fixed commit and merge request lists
#[derive(Default)]
pub(crate) struct MockRepoClient {
    pub commits: Vec<RepoRecord>,
    pub merge_requests: Vec<RepoRecord>,
    pub branches: Mutex<Vec<String>>,
}

impl RepoClient for MockRepoClient {
    fn get_commits(&self, _repo_id: &str, _from: &str, _to: &str) -> Result<Vec<RepoRecord>> {
        Ok(self.commits.clone())
    }

    fn get_merge_requests(
        &self,
        _repo_id: &str,
        target_branch: &str,
        _commits: &[RepoRecord],
    ) -> Result<Vec<RepoRecord>> {
        self.branches.lock().unwrap().push(target_branch.to_string());
        Ok(self.merge_requests.clone())
    }

    fn get_release_url(&self, repo_id: &str, tag: &str) -> Result<String> {
        Ok(format!("https://git.example.com/{}/-/releases/{}", repo_id, tag))
    }

    fn get_repo_url(&self, repo_id: &str) -> Result<String> {
        Ok(format!("https://git.example.com/{}", repo_id))
    }
}
