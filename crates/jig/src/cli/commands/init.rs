//! Init command

use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use jig_core::config::defaults::{DEFAULT_CONFIG_TEMPLATE, DEFAULT_CONFIG_YAML};

use crate::cli::output::path_style;
use crate::cli::Cli;

/// Initialize a new jig configuration
#[derive(Debug, Args)]
pub struct InitCommand {
    /// Force overwrite existing configuration
    #[arg(short, long)]
    pub force: bool,

    /// Output file path
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl InitCommand {
    /// Execute the init command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(force = self.force, "executing init command");
        let cwd = std::env::current_dir()?;
        let config_path = self
            .output
            .clone()
            .unwrap_or_else(|| cwd.join(DEFAULT_CONFIG_YAML));

        if config_path.exists() && !self.force {
            anyhow::bail!(
                "Configuration file already exists at {}. Use --force to overwrite.",
                config_path.display()
            );
        }

        std::fs::write(&config_path, DEFAULT_CONFIG_TEMPLATE)?;

        if !cli.quiet {
            println!(
                "{} Created configuration at {}",
                style("✓").green().bold(),
                path_style().apply_to(config_path.display())
            );
            println!();
            println!("Next steps:");
            println!("  1. Set the GitLab and Jira endpoints in {}", config_path.display());
            println!(
                "  2. Export {} and {} (or fill them in)",
                style("JIG_GIT_TOKEN").cyan(),
                style("JIG_JIRA_PASSWORD").cyan()
            );
            println!("  3. Run {} on your release model", style("jig enrich model.yaml").cyan());
        }

        Ok(())
    }
}
