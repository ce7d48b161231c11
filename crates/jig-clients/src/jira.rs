//! Jira integration
//!
//! Resolves issue keys through the JQL search endpoint and categorizes
//! issues with `TYPE:STATUS` filters.

use reqwest::blocking::Client;
use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, info, instrument};

use jig_core::config::JiraConfig;
use jig_core::{ConfigError, Issue, IssueCategory, IssueTracker, Repo, Result};

use crate::error::ClientError;
use crate::http::{base_url, endpoint, get_json};

const COLLABORATOR: &str = "jira";
const MAX_RESULTS: &str = "1000";
const SEARCH_FIELDS: &str = "summary,issuetype,status,parent";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    issues: Vec<IssueResponse>,
}

#[derive(Debug, Deserialize)]
struct IssueResponse {
    key: String,
    #[serde(default)]
    fields: IssueFields,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct IssueFields {
    summary: String,
    #[serde(rename = "issuetype")]
    issue_type: Option<IssueType>,
    status: Option<Named>,
    parent: Option<ParentRef>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct IssueType {
    name: String,
    subtask: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Named {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ParentRef {
    key: String,
}

/// One `TYPE:STATUS` pair, upper-cased
#[derive(Debug, Clone, PartialEq, Eq)]
struct Filter {
    issue_type: String,
    status: String,
}

impl Filter {
    fn parse(field: &str, raw: &str) -> Result<Self> {
        match raw.split_once(':') {
            Some((issue_type, status)) if !issue_type.is_empty() && !status.is_empty() => Ok(Self {
                issue_type: issue_type.to_uppercase(),
                status: status.to_uppercase(),
            }),
            _ => Err(ConfigError::InvalidValue {
                field: field.to_string(),
                message: format!("'{}' is not a TYPE:STATUS pair", raw),
            }
            .into()),
        }
    }

    fn matches(&self, issue_type: &str, status: &str) -> bool {
        self.issue_type == issue_type && self.status == status
    }
}

/// Jira REST API (v3) adapter
#[derive(Debug, Clone)]
pub struct Jira {
    client: Client,
    base: Url,
    browse: Url,
    username: String,
    password: String,
    closed_feature_filters: Vec<Filter>,
    fixed_bug_filters: Vec<Filter>,
    known_issues_jql: String,
}

impl Jira {
    /// Create an adapter for the instance at `url`, without category filters
    pub fn new(url: &str, username: impl Into<String>, password: impl Into<String>) -> Result<Self> {
        let invalid = |e: ClientError| ConfigError::InvalidValue {
            field: "jira.url".to_string(),
            message: e.to_string(),
        };
        let base = base_url(url, &["rest", "api", "3"]).map_err(invalid)?;
        let browse = base_url(url, &["browse"]).map_err(invalid)?;

        Ok(Self {
            client: Client::new(),
            base,
            browse,
            username: username.into(),
            password: password.into(),
            closed_feature_filters: Vec::new(),
            fixed_bug_filters: Vec::new(),
            known_issues_jql: String::new(),
        })
    }

    /// Create an adapter from the `jira` configuration section
    pub fn from_config(config: &JiraConfig) -> Result<Self> {
        let mut jira = Self::new(&config.url, config.username.clone(), config.password.clone())?
            .with_known_issues_jql(config.known_issues_jql.clone());
        for raw in &config.closed_feature_filter {
            jira.closed_feature_filters
                .push(Filter::parse("jira.closed_feature_filter", raw)?);
        }
        for raw in &config.fixed_bug_filter {
            jira.fixed_bug_filters
                .push(Filter::parse("jira.fixed_bug_filter", raw)?);
        }
        Ok(jira)
    }

    /// Add a `TYPE:STATUS` pair identifying closed features
    pub fn with_closed_feature_filter(mut self, issue_type: &str, status: &str) -> Self {
        self.closed_feature_filters.push(Filter {
            issue_type: issue_type.to_uppercase(),
            status: status.to_uppercase(),
        });
        self
    }

    /// Add a `TYPE:STATUS` pair identifying fixed bugs
    pub fn with_fixed_bug_filter(mut self, issue_type: &str, status: &str) -> Self {
        self.fixed_bug_filters.push(Filter {
            issue_type: issue_type.to_uppercase(),
            status: status.to_uppercase(),
        });
        self
    }

    /// Set the JQL selecting open known issues
    pub fn with_known_issues_jql(mut self, jql: impl Into<String>) -> Self {
        self.known_issues_jql = jql.into();
        self
    }

    fn web_url(&self, key: &str) -> String {
        let mut url = self.browse.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(key);
        }
        url.to_string()
    }

    fn category(&self, fields: &IssueFields) -> IssueCategory {
        let issue_type = fields.issue_type.as_ref();
        if issue_type.is_some_and(|t| t.subtask) {
            return IssueCategory::SubTask;
        }

        let type_name = issue_type.map(|t| t.name.to_uppercase()).unwrap_or_default();
        let status = fields
            .status
            .as_ref()
            .map(|s| s.name.to_uppercase())
            .unwrap_or_default();

        if self
            .closed_feature_filters
            .iter()
            .any(|f| f.matches(&type_name, &status))
        {
            IssueCategory::ClosedFeature
        } else if self
            .fixed_bug_filters
            .iter()
            .any(|f| f.matches(&type_name, &status))
        {
            IssueCategory::FixedBug
        } else {
            IssueCategory::Other
        }
    }

    fn to_issue(&self, response: IssueResponse) -> Issue {
        let category = self.category(&response.fields);
        let web_url = self.web_url(&response.key);
        let fields = response.fields;

        let mut issue = Issue::new(response.key, category)
            .with_summary(fields.summary)
            .with_type_and_status(
                fields.issue_type.map(|t| t.name).unwrap_or_default(),
                fields.status.map(|s| s.name).unwrap_or_default(),
            )
            .with_web_url(web_url);
        if category == IssueCategory::SubTask {
            if let Some(parent) = fields.parent {
                issue = issue.with_parent(parent.key);
            }
        }
        issue
    }

    fn search(&self, jql: &str) -> std::result::Result<Vec<Issue>, ClientError> {
        let url = endpoint(&self.base, &["search", "jql"])?;
        debug!(url = %url, jql = %jql, "Jira search");

        let request = self
            .client
            .get(url)
            .basic_auth(&self.username, Some(&self.password))
            .query(&[
                ("jql", jql),
                ("maxResults", MAX_RESULTS),
                ("fields", SEARCH_FIELDS),
            ]);
        let response: SearchResponse = get_json(request)?;

        Ok(response
            .issues
            .into_iter()
            .map(|issue| self.to_issue(issue))
            .collect())
    }
}

/// JQL for the open issues of a project, optionally narrowed to a component
fn known_issues_jql(base: &str, project: &str, component: &str) -> String {
    let mut clauses = Vec::new();
    if !base.is_empty() {
        clauses.push(base.to_string());
    }
    clauses.push(format!("project = \"{}\"", project));
    if !component.is_empty() {
        clauses.push(format!("component = \"{}\"", component));
    }
    clauses.join(" and ")
}

impl IssueTracker for Jira {
    fn name(&self) -> &str {
        COLLABORATOR
    }

    #[instrument(skip(self, repo), fields(repo = %repo.label))]
    fn get_issues(&self, repo: &Repo, keys: &[String]) -> Result<Vec<Issue>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let jql = format!("issue in ({})", keys.join(","));
        let issues = self.search(&jql).map_err(|e| e.into_jig(COLLABORATOR))?;
        info!(requested = keys.len(), found = issues.len(), "issues retrieved");
        Ok(issues)
    }

    #[instrument(skip(self, repo), fields(repo = %repo.label))]
    fn get_known_issues(&self, repo: &Repo) -> Result<Vec<Issue>> {
        if repo.jira_project.is_empty() {
            debug!("no Jira project, skipping known issues");
            return Ok(Vec::new());
        }

        let jql = known_issues_jql(&self.known_issues_jql, &repo.jira_project, &repo.jira_component);
        let issues = self.search(&jql).map_err(|e| e.into_jig(COLLABORATOR))?;
        info!(found = issues.len(), "known issues retrieved");
        Ok(issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jig_core::{FetchError, JigError};
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn blocking<T: Send + 'static>(f: impl FnOnce() -> T + Send + 'static) -> T {
        tokio::task::spawn_blocking(f).await.unwrap()
    }

    fn jira(uri: &str) -> Jira {
        Jira::new(uri, "bot", "pw")
            .unwrap()
            .with_closed_feature_filter("Story", "GoLive")
            .with_fixed_bug_filter("Bug", "Fixed")
            .with_known_issues_jql("status != Done")
    }

    fn fields(issue_type: &str, subtask: bool, status: &str) -> IssueFields {
        IssueFields {
            summary: String::new(),
            issue_type: Some(IssueType {
                name: issue_type.to_string(),
                subtask,
            }),
            status: Some(Named {
                name: status.to_string(),
            }),
            parent: None,
        }
    }

    #[test]
    fn test_category_filters_ignore_case() {
        let jira = jira("https://jira.example.com");

        assert_eq!(jira.category(&fields("story", false, "GOLIVE")), IssueCategory::ClosedFeature);
        assert_eq!(jira.category(&fields("BUG", false, "fixed")), IssueCategory::FixedBug);
        assert_eq!(jira.category(&fields("Bug", false, "Open")), IssueCategory::Other);
        assert_eq!(jira.category(&fields("Sub-task", true, "GOLIVE")), IssueCategory::SubTask);
        assert_eq!(jira.category(&IssueFields::default()), IssueCategory::Other);
    }

    #[test]
    fn test_from_config() {
        let config = JiraConfig {
            url: "https://jira.example.com".to_string(),
            username: "bot".to_string(),
            password: "pw".to_string(),
            ..Default::default()
        };
        let jira = Jira::from_config(&config).unwrap();

        assert_eq!(jira.closed_feature_filters.len(), 2);
        assert_eq!(jira.closed_feature_filters[1].issue_type, "TECH TASK");
        assert_eq!(jira.fixed_bug_filters[0].status, "FIXED");
        assert_eq!(jira.web_url("AAA-1"), "https://jira.example.com/browse/AAA-1");
    }

    #[test]
    fn test_from_config_rejects_bad_filter() {
        let config = JiraConfig {
            url: "https://jira.example.com".to_string(),
            fixed_bug_filter: vec!["BUG".to_string()],
            ..Default::default()
        };
        let err = Jira::from_config(&config).unwrap_err();
        assert!(matches!(err, JigError::Config(ConfigError::InvalidValue { ref field, .. }) if field == "jira.fixed_bug_filter"));
    }

    #[test]
    fn test_known_issues_jql() {
        assert_eq!(
            known_issues_jql("status != Done", "APP", "billing"),
            r#"status != Done and project = "APP" and component = "billing""#
        );
        assert_eq!(known_issues_jql("", "APP", ""), r#"project = "APP""#);
    }

    #[tokio::test]
    async fn test_get_issues() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/api/3/search/jql"))
            .and(query_param("jql", "issue in (AAA-1,AAA-2)"))
            .and(query_param("maxResults", "1000"))
            .and(query_param("fields", "summary,issuetype,status,parent"))
            .and(header("Authorization", "Basic Ym90OnB3"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"issues": [
                    {"key": "AAA-1", "fields": {"summary": "Export", "issuetype": {"name": "Story", "subtask": false},
                     "status": {"name": "GoLive"}}},
                    {"key": "AAA-2", "fields": {"summary": "Wire button", "issuetype": {"name": "Sub-task", "subtask": true},
                     "status": {"name": "Done"}, "parent": {"key": "AAA-9"}}}
                ]}"#,
            ))
            .mount(&server)
            .await;

        let uri = server.uri();
        let repo = Repo::new("svc", "42", "1.0.0", "1.1.0");
        let issues = blocking(move || {
            jira(&uri).get_issues(&repo, &["AAA-1".to_string(), "AAA-2".to_string()])
        })
        .await
        .unwrap();

        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].category, IssueCategory::ClosedFeature);
        assert_eq!(issues[0].issue_summary, "Export");
        assert_eq!(issues[0].issue_status, "GoLive");
        assert_eq!(issues[0].web_url, format!("{}/browse/AAA-1", server.uri()));
        assert_eq!(issues[0].parent_key, "");
        assert_eq!(issues[1].category, IssueCategory::SubTask);
        assert_eq!(issues[1].parent_key, "AAA-9");
    }

    #[tokio::test]
    async fn test_get_issues_without_keys_skips_request() {
        let server = MockServer::start().await;
        let uri = server.uri();
        let repo = Repo::new("svc", "42", "1.0.0", "1.1.0");

        let issues = blocking(move || jira(&uri).get_issues(&repo, &[])).await.unwrap();

        assert!(issues.is_empty());
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_known_issues() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/api/3/search/jql"))
            .and(query_param("jql", r#"status != Done and project = "APP""#))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"issues": [{"key": "APP-3", "fields": {"summary": "Slow login",
                   "issuetype": {"name": "Bug"}, "status": {"name": "Open"}}}]}"#,
            ))
            .mount(&server)
            .await;

        let uri = server.uri();
        let mut repo = Repo::new("svc", "42", "1.0.0", "1.1.0");
        repo.jira_project = "APP".to_string();
        let issues = blocking(move || jira(&uri).get_known_issues(&repo)).await.unwrap();

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].issue_key, "APP-3");
        assert_eq!(issues[0].category, IssueCategory::Other);
    }

    #[tokio::test]
    async fn test_known_issues_need_project() {
        let server = MockServer::start().await;
        let uri = server.uri();
        let mut repo = Repo::new("svc", "42", "1.0.0", "1.1.0");
        repo.jira_component = "billing".to_string();

        let issues = blocking(move || jira(&uri).get_known_issues(&repo)).await.unwrap();

        assert!(issues.is_empty());
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/api/3/search/jql"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
            .mount(&server)
            .await;

        let uri = server.uri();
        let repo = Repo::new("svc", "42", "1.0.0", "1.1.0");
        let err = blocking(move || jira(&uri).get_issues(&repo, &["AAA-1".to_string()]))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            JigError::Fetch(FetchError::Api { status: 401, ref collaborator, .. }) if collaborator == "jira"
        ));
    }
}
