//! Release model entities
//!
//! Field names mirror the keys of the model document, which downstream
//! release-note templates read directly.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Tracker label assigned to references no issue pattern recognizes
pub const UNTRACKED: &str = "NONE";

fn is_false(value: &bool) -> bool {
    !*value
}

/// Category inferred from a commit or merge request title
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommitCategory {
    /// No category could be inferred
    #[default]
    Unknown,
    /// A new feature (`feat`, `closes`, `implements`)
    Feature,
    /// A bug fix (`fix`, `fixes`, `resolves`)
    BugFix,
}

impl CommitCategory {
    /// Whether this is the `UNKNOWN` category
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Returns the string representation used in the model document
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Feature => "FEATURE",
            Self::BugFix => "BUG_FIX",
        }
    }
}

impl fmt::Display for CommitCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category assigned to an issue by its tracker
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCategory {
    ClosedFeature,
    FixedBug,
    /// Child of another issue; never emitted directly
    SubTask,
    #[default]
    Other,
}

impl IssueCategory {
    /// Returns the string representation used in the model document
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClosedFeature => "CLOSED_FEATURE",
            Self::FixedBug => "FIXED_BUG",
            Self::SubTask => "SUB_TASK",
            Self::Other => "OTHER",
        }
    }
}

impl fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a repository record came from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordOrigin {
    #[default]
    Commit,
    MergeRequest,
}

/// Which parser produced a parsed record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParserKind {
    #[default]
    ConventionalParser,
    CustomParser,
    ClosingPattern,
}

impl ParserKind {
    /// Returns the parser name written into the model document
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConventionalParser => "conventionalParser",
            Self::CustomParser => "customParser",
            Self::ClosingPattern => "closingPattern",
        }
    }
}

impl fmt::Display for ParserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One commit or merge request as returned by the repository host
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RepoRecord {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub short_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "webURL", skip_serializing_if = "String::is_empty")]
    pub web_url: String,
    pub origin: RecordOrigin,
}

impl RepoRecord {
    /// Create a commit record with the given id, title and full message
    pub fn commit(id: impl Into<String>, title: impl Into<String>, message: impl Into<String>) -> Self {
        let id = id.into();
        let short_id = id.chars().take(8).collect();
        Self {
            id,
            short_id,
            title: title.into(),
            message: message.into(),
            ..Default::default()
        }
    }

    /// Set the record origin
    pub fn with_origin(mut self, origin: RecordOrigin) -> Self {
        self.origin = origin;
        self
    }

    /// Set the short identifier
    pub fn with_short_id(mut self, short_id: impl Into<String>) -> Self {
        self.short_id = short_id.into();
        self
    }

    /// Set the creation time
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Set the web URL
    pub fn with_web_url(mut self, web_url: impl Into<String>) -> Self {
        self.web_url = web_url.into();
        self
    }
}

impl fmt::Display for RepoRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let origin = match self.origin {
            RecordOrigin::Commit => "commit",
            RecordOrigin::MergeRequest => "merge_request",
        };
        write!(f, "{} ({}): {}", origin, self.short_id, self.title)
    }
}

/// A repository record annotated with what the parsers extracted from it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParsedRecord {
    #[serde(flatten)]
    pub record: RepoRecord,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub parsed_summary: String,
    #[serde(skip_serializing_if = "CommitCategory::is_unknown")]
    pub parsed_category: CommitCategory,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub parsed_key: String,
    pub parsed_issue_tracker: String,
    pub parser: ParserKind,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub parsed_type: String,
    #[serde(skip_serializing_if = "is_false")]
    pub is_breaking_change: bool,
}

impl fmt::Display for ParsedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} issue {} ({}) with {} on {}",
            self.parsed_issue_tracker, self.parsed_key, self.parsed_type, self.parser, self.record
        )
    }
}

/// Issue metadata as reported by an issue tracker
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Issue {
    pub category: IssueCategory,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub issue_key: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub issue_summary: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub issue_type: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub issue_status: String,
    #[serde(rename = "webURL", skip_serializing_if = "String::is_empty")]
    pub web_url: String,
    /// Key of the parent issue, set for sub-tasks
    #[serde(skip_serializing_if = "String::is_empty")]
    pub parent_key: String,
}

impl Issue {
    /// Create an issue with a key and category
    pub fn new(key: impl Into<String>, category: IssueCategory) -> Self {
        Self {
            category,
            issue_key: key.into(),
            ..Default::default()
        }
    }

    /// Set the summary
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.issue_summary = summary.into();
        self
    }

    /// Set the tracker-side type and status
    pub fn with_type_and_status(mut self, issue_type: impl Into<String>, status: impl Into<String>) -> Self {
        self.issue_type = issue_type.into();
        self.issue_status = status.into();
        self
    }

    /// Set the parent key
    pub fn with_parent(mut self, parent_key: impl Into<String>) -> Self {
        self.parent_key = parent_key.into();
        self
    }

    /// Set the web URL
    pub fn with_web_url(mut self, web_url: impl Into<String>) -> Self {
        self.web_url = web_url.into();
        self
    }
}

/// The join of tracker metadata with the record that referenced it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExtractedIssue {
    pub issue_tracker: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub issue_key: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub issue_summary: String,
    pub issue_category: IssueCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_detail: Option<Issue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_detail: Option<ParsedRecord>,
}

impl fmt::Display for ExtractedIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} issue {} ({})", self.issue_tracker, self.issue_key, self.issue_category)
    }
}

/// One component under release, as declared in the model document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Repo {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub label: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub service_name: String,
    #[serde(rename = "gitRepoID", deserialize_with = "scalar_string", skip_serializing_if = "String::is_empty")]
    pub git_repo_id: String,
    #[serde(deserialize_with = "scalar_string", skip_serializing_if = "String::is_empty")]
    pub previous_version: String,
    #[serde(deserialize_with = "scalar_string", skip_serializing_if = "String::is_empty")]
    pub version: String,
    /// `@<file>:<yaml-path>` locating the current version
    #[serde(skip_serializing_if = "String::is_empty")]
    pub check_version: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub jira_project: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub jira_component: String,
    #[serde(rename = "gitRepoURL", skip_serializing_if = "String::is_empty")]
    pub git_repo_url: String,
    #[serde(rename = "gitReleaseURL", skip_serializing_if = "String::is_empty")]
    pub git_release_url: String,
    #[serde(skip_serializing_if = "serde_yaml::Mapping::is_empty")]
    pub custom_attributes: serde_yaml::Mapping,
}

impl Repo {
    /// Create a component with a label, repository id and version range
    pub fn new(
        label: impl Into<String>,
        git_repo_id: impl Into<String>,
        previous_version: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            git_repo_id: git_repo_id.into(),
            previous_version: previous_version.into(),
            version: version.into(),
            ..Default::default()
        }
    }
}

impl fmt::Display for Repo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "repo {} from {} to {} (id: {})",
            self.label, self.previous_version, self.version, self.git_repo_id
        )
    }
}

/// A component together with everything extracted for it
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedRepo {
    #[serde(flatten)]
    pub repo: Repo,
    #[serde(rename = "extractedKeys", skip_serializing_if = "Vec::is_empty")]
    pub parsed_records: Vec<ParsedRecord>,
    #[serde(skip_serializing_if = "is_false")]
    pub has_breaking: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub has_new_feature: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub has_bug_fixed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_version: Option<String>,
}

impl EnrichedRepo {
    /// Wrap a component with its parsed records
    pub fn new(repo: Repo, parsed_records: Vec<ParsedRecord>) -> Self {
        Self {
            repo,
            parsed_records,
            ..Default::default()
        }
    }
}

/// The computed release model written under `generatedValues`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedValues {
    pub features: BTreeMap<String, Vec<ExtractedIssue>>,
    pub bugs: BTreeMap<String, Vec<ExtractedIssue>>,
    pub known_issues: BTreeMap<String, Vec<ExtractedIssue>>,
    pub breaking_change: BTreeMap<String, Vec<ExtractedIssue>>,
    pub git_repos: Vec<EnrichedRepo>,
}

/// Accept any YAML scalar for fields that are conceptually strings.
///
/// Model files routinely write `gitRepoID: 1234` or `version: 1.10`.
fn scalar_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct ScalarVisitor;

    impl serde::de::Visitor<'_> for ScalarVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a string or number")
        }

        fn visit_str<E: serde::de::Error>(self, v: &str) -> std::result::Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_string<E: serde::de::Error>(self, v: String) -> std::result::Result<String, E> {
            Ok(v)
        }

        fn visit_i64<E: serde::de::Error>(self, v: i64) -> std::result::Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_u64<E: serde::de::Error>(self, v: u64) -> std::result::Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_f64<E: serde::de::Error>(self, v: f64) -> std::result::Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_bool<E: serde::de::Error>(self, v: bool) -> std::result::Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_unit<E: serde::de::Error>(self) -> std::result::Result<String, E> {
            Ok(String::new())
        }
    }

    deserializer.deserialize_str(ScalarVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_serialize_upper_case() {
        let yaml = serde_yaml::to_string(&CommitCategory::BugFix).unwrap();
        assert_eq!(yaml.trim(), "BUG_FIX");
        let yaml = serde_yaml::to_string(&IssueCategory::ClosedFeature).unwrap();
        assert_eq!(yaml.trim(), "CLOSED_FEATURE");
    }

    #[test]
    fn test_parsed_record_field_names() {
        let record = ParsedRecord {
            record: RepoRecord::commit("abcdef0123", "feat(AAA-1): add", "feat(AAA-1): add")
                .with_web_url("https://git/x"),
            parsed_summary: "add".to_string(),
            parsed_category: CommitCategory::Feature,
            parsed_key: "AAA-1".to_string(),
            parsed_issue_tracker: "JIRA".to_string(),
            parser: ParserKind::ConventionalParser,
            parsed_type: "feat".to_string(),
            is_breaking_change: true,
        };

        let value = serde_yaml::to_value(&record).unwrap();
        assert_eq!(value["id"], "abcdef0123");
        assert_eq!(value["shortId"], "abcdef01");
        assert_eq!(value["webURL"], "https://git/x");
        assert_eq!(value["origin"], "commit");
        assert_eq!(value["parsedCategory"], "FEATURE");
        assert_eq!(value["parser"], "conventionalParser");
        assert_eq!(value["isBreakingChange"], true);
    }

    #[test]
    fn test_parsed_record_omits_unknown_and_false() {
        let record = ParsedRecord {
            parsed_issue_tracker: UNTRACKED.to_string(),
            ..Default::default()
        };

        let value = serde_yaml::to_value(&record).unwrap();
        assert!(value.get("parsedCategory").is_none());
        assert!(value.get("isBreakingChange").is_none());
        assert_eq!(value["parsedIssueTracker"], "NONE");
    }

    #[test]
    fn test_repo_accepts_numeric_scalars() {
        let yaml = "label: svc\ngitRepoID: 1234\npreviousVersion: 1.0.0\nversion: \"1.1.0\"\n";
        let repo: Repo = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(repo.git_repo_id, "1234");
        assert_eq!(repo.previous_version, "1.0.0");
        assert_eq!(repo.version, "1.1.0");
    }

    #[test]
    fn test_enriched_repo_inlines_component() {
        let mut enriched = EnrichedRepo::new(Repo::new("svc", "42", "1.0.0", "1.1.0"), Vec::new());
        enriched.has_new_feature = true;

        let value = serde_yaml::to_value(&enriched).unwrap();
        assert_eq!(value["label"], "svc");
        assert_eq!(value["gitRepoID"], "42");
        assert_eq!(value["hasNewFeature"], true);
        assert!(value.get("hasBreaking").is_none());
        assert!(value.get("extractedKeys").is_none());
    }
}
