//! Parse command

use clap::Args;
use console::style;
use tracing::info;

use jig_core::{ParsedRecord, RepoRecord};
use jig_parser::{ParserConfig, RecordParser};

use crate::cli::output::{self, key_style, key_value};
use crate::cli::{Cli, OutputFormat};

/// Parse a commit title offline and show the extracted references
#[derive(Debug, Args)]
pub struct ParseCommand {
    /// Commit or merge-request title
    pub title: String,

    /// Full message; closing references are looked up here
    #[arg(short, long)]
    pub message: Option<String>,
}

impl ParseCommand {
    /// Execute the parse command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(title = %self.title, "executing parse command");
        let config = cli.load_config()?;
        let parser = RecordParser::new(&ParserConfig::from_config(&config))?;

        let message = self.message.clone().unwrap_or_else(|| self.title.clone());
        let record = RepoRecord::commit("local", self.title.clone(), message);
        let parsed = parser.parse(std::slice::from_ref(&record));

        match cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&parsed)?);
            }
            OutputFormat::Text => print_text(&parsed),
        }
        Ok(())
    }
}

fn print_text(parsed: &[ParsedRecord]) {
    if parsed.is_empty() {
        output::warning("No issue reference found");
        return;
    }

    for entry in parsed {
        let key = if entry.parsed_key.is_empty() {
            "-".to_string()
        } else {
            key_style().apply_to(&entry.parsed_key).to_string()
        };
        println!("{} {}", style(&entry.parsed_issue_tracker).bold(), key);
        println!("{}", key_value("parser", entry.parser.as_str()));
        if !entry.parsed_type.is_empty() {
            println!("{}", key_value("type", &entry.parsed_type));
        }
        println!("{}", key_value("category", entry.parsed_category.as_str()));
        println!("{}", key_value("summary", &entry.parsed_summary));
        if entry.is_breaking_change {
            println!("{}", key_value("breaking", "yes"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_record_from_title() {
        let parser = RecordParser::new(
            &ParserConfig::default().issue_pattern("jira", r"[A-Z]+-\d+"),
        )
        .unwrap();
        let record = RepoRecord::commit("local", "fix(AAA-7)!: drop v1 API", "fix(AAA-7)!: drop v1 API");
        let parsed = parser.parse(std::slice::from_ref(&record));

        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].parsed_key, "AAA-7");
        assert!(parsed[0].is_breaking_change);
    }
}
