//! Repository service backed by a [`RepoClient`] and a [`RecordParser`]

use tracing::{debug, instrument};

use jig_core::{ParsedRecord, RepoClient, RepoService, Result};
use jig_parser::{ParserConfig, RecordParser};

/// Fetches commits (and merge requests) and parses them into records
pub struct ParsingRepoService<C> {
    client: C,
    parser: RecordParser,
    default_mr_branch: String,
}

impl<C: RepoClient> ParsingRepoService<C> {
    /// Compile the parser configuration around `client`
    pub fn new(client: C, config: &ParserConfig) -> Result<Self> {
        Ok(Self {
            client,
            parser: RecordParser::new(config)?,
            default_mr_branch: String::new(),
        })
    }

    /// Merge-request target branch used when a call names none
    pub fn with_default_mr_branch(mut self, branch: impl Into<String>) -> Self {
        self.default_mr_branch = branch.into();
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }
}

impl<C: RepoClient> RepoService for ParsingRepoService<C> {
    /// Commits between `from` and `to`, then the merge requests merged into
    /// the target branch for them. Merge requests are only fetched when a
    /// target branch is known, and are parsed as their own batch.
    #[instrument(skip(self))]
    fn get_parsed_records(
        &self,
        repo_id: &str,
        from: &str,
        to: &str,
        mr_target_branch: &str,
    ) -> Result<Vec<ParsedRecord>> {
        let commits = self.client.get_commits(repo_id, from, to)?;
        let mut records = self.parser.parse(&commits);

        let branch = if mr_target_branch.is_empty() {
            self.default_mr_branch.as_str()
        } else {
            mr_target_branch
        };
        if branch.is_empty() {
            debug!("no merge request branch, commits only");
            return Ok(records);
        }

        let merge_requests = self.client.get_merge_requests(repo_id, branch, &commits)?;
        records.extend(self.parser.parse(&merge_requests));
        Ok(records)
    }

    fn get_release_url(&self, repo_id: &str, tag: &str) -> Result<String> {
        self.client.get_release_url(repo_id, tag)
    }

    fn get_repo_url(&self, repo_id: &str) -> Result<String> {
        self.client.get_repo_url(repo_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockRepoClient;
    use jig_core::{ParserKind, RecordOrigin, RepoRecord};

    fn client() -> MockRepoClient {
        MockRepoClient {
            commits: vec![
                RepoRecord::commit("c1", "feat(AAA-1): export", "feat(AAA-1): export"),
                RepoRecord::commit("c2", "chore: tidy", "chore: tidy"),
            ],
            merge_requests: vec![RepoRecord {
                id: "m1".to_string(),
                title: "feat(AAA-1): export from MR".to_string(),
                message: "Closes AAA-2".to_string(),
                origin: RecordOrigin::MergeRequest,
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn config() -> ParserConfig {
        ParserConfig::default().issue_pattern("jira", r"[A-Z]+-\d+")
    }

    #[test]
    fn test_commits_only_without_branch() {
        let service = ParsingRepoService::new(client(), &config()).unwrap();
        let records = service.get_parsed_records("1", "v1", "v2", "").unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].parsed_key, "AAA-1");
        assert!(service.client().branches.lock().unwrap().is_empty());
    }

    #[test]
    fn test_merge_requests_parsed_separately() {
        let service = ParsingRepoService::new(client(), &config())
            .unwrap()
            .with_default_mr_branch("main");
        let records = service.get_parsed_records("1", "v1", "v2", "").unwrap();

        // the MR title repeats AAA-1 but is its own batch, so it is kept
        let summary: Vec<_> = records
            .iter()
            .map(|r| (r.parsed_key.as_str(), r.record.origin, r.parser))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("AAA-1", RecordOrigin::Commit, ParserKind::ConventionalParser),
                ("AAA-1", RecordOrigin::MergeRequest, ParserKind::ConventionalParser),
                ("AAA-2", RecordOrigin::MergeRequest, ParserKind::ClosingPattern),
            ]
        );
        assert_eq!(*service.client().branches.lock().unwrap(), vec!["main"]);
    }

    #[test]
    fn test_explicit_branch_wins() {
        let service = ParsingRepoService::new(client(), &config())
            .unwrap()
            .with_default_mr_branch("main");
        service.get_parsed_records("1", "v1", "v2", "release").unwrap();
        assert_eq!(*service.client().branches.lock().unwrap(), vec!["release"]);
    }

    #[test]
    fn test_urls_delegate_to_client() {
        let service = ParsingRepoService::new(client(), &config()).unwrap();
        assert_eq!(service.get_repo_url("42").unwrap(), "https://git.example.com/42");
        assert_eq!(
            service.get_release_url("42", "v1.0.0").unwrap(),
            "https://git.example.com/42/-/releases/v1.0.0"
        );
    }
}
