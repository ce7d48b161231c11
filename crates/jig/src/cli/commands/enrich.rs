//! Enrich command

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use console::style;
use serde::Serialize;
use tracing::info;

use jig_clients::{GitLab, Jira};
use jig_core::config::{require_git_credentials, require_jira_credentials};
use jig_model::{Model, ParsingRepoService, TrackerRegistry};
use jig_parser::ParserConfig;

use crate::cli::output::{self, header, key_value, version_style};
use crate::cli::{Cli, OutputFormat};

use super::write_model;

/// Enrich a model file with commits, merge requests and issues
#[derive(Debug, Args)]
pub struct EnrichCommand {
    /// Model file to enrich
    pub model: PathBuf,

    /// Merge-request target branch (overrides git.mr_branch)
    #[arg(long)]
    pub mr_branch: Option<String>,

    /// Print the enriched model instead of writing it
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Serialize)]
struct ComponentSummary<'a> {
    label: &'a str,
    previous_version: &'a str,
    version: &'a str,
    records: usize,
    suggested_version: Option<&'a str>,
}

impl EnrichCommand {
    /// Execute the enrich command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(model = %self.model.display(), mr_branch = ?self.mr_branch, dry_run = self.dry_run, "executing enrich command");
        let config = cli.load_config()?;
        require_git_credentials(&config.git)?;
        require_jira_credentials(&config.jira)?;

        let gitlab = GitLab::from_config(&config.git)?;
        let mut registry = TrackerRegistry::new();
        registry.register("JIRA", Jira::from_config(&config.jira)?);
        registry.register("GIT", gitlab.clone());

        let mr_branch = self
            .mr_branch
            .clone()
            .unwrap_or_else(|| config.git.mr_branch.clone());
        let service = ParsingRepoService::new(gitlab, &ParserConfig::from_config(&config))?;

        let mut model = Model::load_file(&self.model)
            .with_context(|| format!("cannot load model {}", self.model.display()))?;
        model.update_repo_infos(&service)?;
        model.enrich_with_repos(&service, &mr_branch)?;
        model.enrich_with_trackers(&registry)?;

        let yaml = model.to_yaml()?;
        write_model(&self.model, &yaml, self.dry_run, cli.quiet || self.dry_run)?;

        if !self.dry_run {
            self.report(&model, cli)?;
        }
        Ok(())
    }

    fn report(&self, model: &Model, cli: &Cli) -> anyhow::Result<()> {
        let Some(generated) = model.generated_values() else {
            return Ok(());
        };
        let summary: Vec<_> = generated
            .git_repos
            .iter()
            .map(|enriched| ComponentSummary {
                label: &enriched.repo.label,
                previous_version: &enriched.repo.previous_version,
                version: &enriched.repo.version,
                records: enriched.parsed_records.len(),
                suggested_version: enriched.suggested_version.as_deref(),
            })
            .collect();

        match cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            }
            OutputFormat::Text if !cli.quiet => {
                println!("{}", header("Components"));
                for component in &summary {
                    println!();
                    println!("{}", style(component.label).bold());
                    println!(
                        "{}",
                        key_value(
                            "versions",
                            &format!("{} → {}", component.previous_version, component.version)
                        )
                    );
                    println!("{}", key_value("records", &component.records.to_string()));
                    if let Some(suggested) = component.suggested_version {
                        println!(
                            "{}",
                            key_value("suggested", &version_style().apply_to(suggested).to_string())
                        );
                    }
                }
                if summary.is_empty() {
                    output::warning("No component changed");
                }
            }
            OutputFormat::Text => {}
        }
        Ok(())
    }
}
