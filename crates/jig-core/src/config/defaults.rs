//! Default configuration values

use super::types::IssuePatternConfig;

/// Default configuration file name (YAML)
pub const DEFAULT_CONFIG_YAML: &str = "jig.yaml";

/// Default configuration file name (TOML)
pub const DEFAULT_CONFIG_TOML: &str = "jig.toml";

/// Alternative configuration file name
pub const ALT_CONFIG_FILE: &str = ".jig.yaml";

/// Per-user configuration file, looked up in the home directory
pub const HOME_CONFIG_FILE: &str = ".jig.yaml";

/// Prefix of the environment variables overriding configuration values
pub const ENV_PREFIX: &str = "JIG_";

/// Default title pattern for non-conventional commits, e.g. `[AAA-1] summary`
pub const DEFAULT_CUSTOM_COMMIT_PATTERN: &str = r"\[(?P<scope>[^\]]*)\](?P<subject>.*)";

/// Default Jira `TYPE:STATUS` filters for closed features
pub const DEFAULT_CLOSED_FEATURE_FILTER: &[&str] = &["Story:GOLIVE", "TECH TASK:Completata"];

/// Default Jira `TYPE:STATUS` filters for fixed bugs
pub const DEFAULT_FIXED_BUG_FILTER: &[&str] = &["BUG:FIXED", "BUG:RELEASED"];

/// Default JQL for known issues
pub const DEFAULT_KNOWN_ISSUES_JQL: &str =
    r#"status not in (Done, RELEASED, Fixed, GOLIVE, Cancelled) AND issuetype in (Bug, "TECH DEBT")"#;

/// Get list of config file names to search for
pub fn config_file_names() -> Vec<&'static str> {
    vec![
        DEFAULT_CONFIG_YAML,
        DEFAULT_CONFIG_TOML,
        ALT_CONFIG_FILE,
        ".jig.toml",
    ]
}

/// Issue patterns used when the configuration declares none
pub fn default_issue_patterns() -> Vec<IssuePatternConfig> {
    vec![
        IssuePatternConfig::new("jira", r"[A-Z]+-\d+"),
        IssuePatternConfig::new("jira", r"j_(.+)"),
        IssuePatternConfig::new("git", r"#(\d+)"),
    ]
}

/// Default configuration template
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# jig configuration

issue_patterns:
  - issue_tracker: jira
    pattern: '[A-Z]+-\d+'
  - issue_tracker: jira
    pattern: 'j_(.+)'
  - issue_tracker: git
    pattern: '#(\d+)'

custom_commit_pattern: '\[(?P<scope>[^\]]*)\](?P<subject>.*)'
keep_cc_without_scope: false

git:
  url: https://gitlab.example.com
  token: ""
  mr_branch: ""

jira:
  url: https://jira.example.com
  username: ""
  password: ""
  closed_feature_filter: ["Story:GOLIVE", "TECH TASK:Completata"]
  fixed_bug_filter: ["BUG:FIXED", "BUG:RELEASED"]
"#;
