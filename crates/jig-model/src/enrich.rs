//! Enrichment engine
//!
//! Joins each component's parsed records with issue-tracker metadata and
//! sorts the results into the `features`, `bugs`, `knownIssues` and
//! `breakingChange` buckets of [`GeneratedValues`].
//!
//! For every registered tracker label, in registration order:
//!
//! - without an implementation, records are reported from their own
//!   details (summary, category, breaking flag);
//! - with one, the distinct keys are looked up; sub-tasks are replaced by
//!   their parent (one level, one extra query), each issue is joined to
//!   the first record naming it and routed by its tracker category. The
//!   breaking-change bucket is filled independently of the other two.
//!
//! Labels seen on records but never registered fall back to record
//! details as well, in the order they were first seen.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::{debug, info, instrument, warn};

use jig_core::{
    CommitCategory, EnrichedRepo, ExtractedIssue, GeneratedValues, Issue, IssueCategory,
    IssueTracker, ParsedRecord, Result,
};

use crate::registry::TrackerRegistry;
use crate::version::suggest_version;

#[derive(Debug, Clone, Copy)]
enum Bucket {
    Features,
    Bugs,
    KnownIssues,
    BreakingChange,
}

/// Output buckets, keyed by component label
#[derive(Debug, Default)]
struct Buckets {
    features: BTreeMap<String, Vec<ExtractedIssue>>,
    bugs: BTreeMap<String, Vec<ExtractedIssue>>,
    known_issues: BTreeMap<String, Vec<ExtractedIssue>>,
    breaking_change: BTreeMap<String, Vec<ExtractedIssue>>,
}

impl Buckets {
    fn push(&mut self, bucket: Bucket, label: &str, issue: ExtractedIssue) {
        let map = match bucket {
            Bucket::Features => &mut self.features,
            Bucket::Bugs => &mut self.bugs,
            Bucket::KnownIssues => &mut self.known_issues,
            Bucket::BreakingChange => &mut self.breaking_change,
        };
        debug!(component = label, bucket = ?bucket, issue = %issue, "issue added");
        map.entry(label.to_string()).or_default().push(issue);
    }
}

/// Runs the enrichment over [`GeneratedValues`]
pub struct Enricher<'a> {
    registry: &'a TrackerRegistry,
}

impl<'a> Enricher<'a> {
    pub fn new(registry: &'a TrackerRegistry) -> Self {
        Self { registry }
    }

    /// Rebuild the four buckets from `values.git_repos`.
    ///
    /// Buckets and per-component flags are reset first. A tracker error
    /// aborts the run.
    #[instrument(skip_all, fields(components = values.git_repos.len()))]
    pub fn enrich(&self, values: &mut GeneratedValues) -> Result<()> {
        let mut buckets = Buckets::default();

        for repo in &mut values.git_repos {
            self.enrich_repo(repo, &mut buckets)?;
        }

        values.features = buckets.features;
        values.bugs = buckets.bugs;
        values.known_issues = buckets.known_issues;
        values.breaking_change = buckets.breaking_change;
        Ok(())
    }

    fn enrich_repo(&self, repo: &mut EnrichedRepo, buckets: &mut Buckets) -> Result<()> {
        repo.has_breaking = false;
        repo.has_new_feature = false;
        repo.has_bug_fixed = false;

        let label = repo.repo.label.clone();
        let mut enrichment = RepoEnrichment {
            label: &label,
            buckets,
            has_breaking: false,
            has_new_feature: false,
            has_bug_fixed: false,
        };

        for entry in self.registry.all() {
            let records = records_for(&repo.parsed_records, entry.label());
            match entry.tracker() {
                None => {
                    info!(
                        component = %label,
                        tracker = entry.label(),
                        "no tracker implementation, using commit details"
                    );
                    enrichment.add_records(&records);
                }
                Some(tracker) => {
                    enrichment.add_tracked(tracker, entry.label(), repo, &records)?;
                    if !repo.repo.jira_project.is_empty() || !repo.repo.jira_component.is_empty() {
                        enrichment.add_known_issues(tracker, entry.label(), repo)?;
                    }
                }
            }
        }

        let mut unregistered: Vec<&str> = Vec::new();
        for record in &repo.parsed_records {
            let tracker = record.parsed_issue_tracker.as_str();
            if !self.registry.contains(tracker) && !unregistered.contains(&tracker) {
                unregistered.push(tracker);
            }
        }
        for tracker in unregistered {
            debug!(component = %label, tracker, "unregistered tracker, using commit details");
            enrichment.add_records(&records_for(&repo.parsed_records, tracker));
        }

        repo.has_breaking = enrichment.has_breaking;
        repo.has_new_feature = enrichment.has_new_feature;
        repo.has_bug_fixed = enrichment.has_bug_fixed;

        repo.suggested_version = match suggest_version(
            &repo.repo.previous_version,
            repo.has_breaking,
            repo.has_new_feature,
            repo.has_bug_fixed,
        ) {
            Ok(version) => {
                info!(
                    component = %label,
                    current = %repo.repo.previous_version,
                    suggested = %version,
                    "suggested version"
                );
                Some(version)
            }
            Err(e) => {
                warn!(component = %label, error = %e, "cannot suggest a version");
                None
            }
        };

        Ok(())
    }
}

fn records_for<'r>(records: &'r [ParsedRecord], tracker: &str) -> Vec<&'r ParsedRecord> {
    records
        .iter()
        .filter(|r| r.parsed_issue_tracker == tracker)
        .collect()
}

/// Accumulates one component's contribution to the buckets
struct RepoEnrichment<'e> {
    label: &'e str,
    buckets: &'e mut Buckets,
    has_breaking: bool,
    has_new_feature: bool,
    has_bug_fixed: bool,
}

impl RepoEnrichment<'_> {
    /// Report records from their own details; keys are deduplicated, first
    /// seen wins, but every keyless record is kept
    fn add_records(&mut self, records: &[&ParsedRecord]) {
        let mut seen: HashSet<&str> = HashSet::new();

        for &record in records {
            if !record.parsed_key.is_empty() && !seen.insert(record.parsed_key.as_str()) {
                continue;
            }

            let summary = if record.parsed_summary.is_empty() {
                record.record.title.clone()
            } else {
                record.parsed_summary.clone()
            };
            let mut issue = ExtractedIssue {
                issue_tracker: record.parsed_issue_tracker.clone(),
                issue_key: record.parsed_key.clone(),
                issue_summary: summary,
                repo_detail: Some(record.clone()),
                ..Default::default()
            };

            match record.parsed_category {
                CommitCategory::Feature => {
                    issue.issue_category = IssueCategory::ClosedFeature;
                    self.buckets.push(Bucket::Features, self.label, issue.clone());
                    self.has_new_feature = true;
                }
                CommitCategory::BugFix => {
                    issue.issue_category = IssueCategory::FixedBug;
                    self.buckets.push(Bucket::Bugs, self.label, issue.clone());
                    self.has_bug_fixed = true;
                }
                CommitCategory::Unknown => {}
            }

            if record.is_breaking_change {
                self.buckets.push(Bucket::BreakingChange, self.label, issue);
                self.has_breaking = true;
            }
        }
    }

    fn add_tracked(
        &mut self,
        tracker: &dyn IssueTracker,
        tracker_label: &str,
        repo: &EnrichedRepo,
        records: &[&ParsedRecord],
    ) -> Result<()> {
        let mut keys: Vec<String> = Vec::new();
        let mut origins: HashMap<&str, &ParsedRecord> = HashMap::new();
        for &record in records {
            let key = record.parsed_key.as_str();
            if !key.is_empty() && !origins.contains_key(key) {
                origins.insert(key, record);
                keys.push(key.to_string());
            }
        }

        if keys.is_empty() {
            return Ok(());
        }

        info!(component = self.label, tracker = tracker_label, keys = keys.len(), "retrieving issues");
        let issues = tracker.get_issues(&repo.repo, &keys)?;

        let mut emitted: HashSet<String> = HashSet::new();
        let mut parents: Vec<String> = Vec::new();
        let mut parent_origins: HashMap<String, &ParsedRecord> = HashMap::new();

        for issue in issues {
            if !emitted.insert(issue.issue_key.clone()) {
                continue;
            }
            let origin = origins.get(issue.issue_key.as_str()).copied();

            if issue.category == IssueCategory::SubTask {
                debug!(issue = %issue.issue_key, parent = %issue.parent_key, "sub-task replaced by parent");
                let parent = issue.parent_key.as_str();
                if !parent.is_empty()
                    && !origins.contains_key(parent)
                    && !parents.iter().any(|p| p == parent)
                {
                    if let Some(origin) = origin {
                        parent_origins.insert(parent.to_string(), origin);
                    }
                    parents.push(parent.to_string());
                }
                continue;
            }

            self.add_issue(tracker_label, issue, origin);
        }

        if parents.is_empty() {
            return Ok(());
        }

        debug!(component = self.label, parents = parents.len(), "retrieving sub-task parents");
        for issue in tracker.get_issues(&repo.repo, &parents)? {
            if !parents.contains(&issue.issue_key) || !emitted.insert(issue.issue_key.clone()) {
                continue;
            }
            if issue.category == IssueCategory::SubTask {
                debug!(issue = %issue.issue_key, "parent is itself a sub-task, not resolved further");
                continue;
            }
            let origin = parent_origins.get(&issue.issue_key).copied();
            self.add_issue(tracker_label, issue, origin);
        }

        Ok(())
    }

    fn add_issue(&mut self, tracker_label: &str, issue: Issue, origin: Option<&ParsedRecord>) {
        let category = issue.category;
        let breaking = origin.is_some_and(|r| r.is_breaking_change);
        let extracted = ExtractedIssue {
            issue_tracker: tracker_label.to_string(),
            issue_key: issue.issue_key.clone(),
            issue_summary: issue.issue_summary.clone(),
            issue_category: category,
            issue_detail: Some(issue),
            repo_detail: origin.cloned(),
        };

        if breaking {
            self.buckets.push(Bucket::BreakingChange, self.label, extracted.clone());
            self.has_breaking = true;
        }

        match category {
            IssueCategory::ClosedFeature => {
                self.buckets.push(Bucket::Features, self.label, extracted);
                self.has_new_feature = true;
            }
            IssueCategory::FixedBug => {
                self.buckets.push(Bucket::Bugs, self.label, extracted);
                self.has_bug_fixed = true;
            }
            _ => debug!(issue = %extracted, "issue not classified"),
        }
    }

    fn add_known_issues(
        &mut self,
        tracker: &dyn IssueTracker,
        tracker_label: &str,
        repo: &EnrichedRepo,
    ) -> Result<()> {
        let known = tracker.get_known_issues(&repo.repo)?;
        if known.is_empty() {
            debug!(component = self.label, tracker = tracker_label, "no known issues");
        }

        for issue in known {
            let extracted = ExtractedIssue {
                issue_tracker: tracker_label.to_string(),
                issue_key: issue.issue_key.clone(),
                issue_summary: issue.issue_summary.clone(),
                issue_category: issue.category,
                issue_detail: Some(issue),
                repo_detail: None,
            };
            self.buckets.push(Bucket::KnownIssues, self.label, extracted);
        }
        Ok(())
    }
}
