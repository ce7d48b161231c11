//! CLI definition and command handling

pub mod commands;
pub mod output;

use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use tracing::debug;

use jig_core::config::{resolve_config, Config};

use commands::{EnrichCommand, InitCommand, ParseCommand, SetVersionsCommand};

/// jig - enrich release models with commits and issue-tracker data
#[derive(Debug, Parser)]
#[command(name = "jig")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Working directory
    #[arg(short = 'C', long, global = true)]
    pub directory: Option<PathBuf>,

    /// Configuration file (default: nearest jig.yaml or jig.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Enrich a model file with commits, merge requests and issues
    Enrich(EnrichCommand),

    /// Refresh component versions from their checkVersion references
    SetVersions(SetVersionsCommand),

    /// Initialize a new jig configuration
    Init(InitCommand),

    /// Parse a commit title offline and show the extracted references
    Parse(ParseCommand),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> anyhow::Result<()> {
        // Change to specified directory if provided
        if let Some(dir) = &self.directory {
            std::env::set_current_dir(dir)
                .with_context(|| format!("cannot enter directory {}", dir.display()))?;
        }

        match self.command {
            Commands::Enrich(ref cmd) => cmd.execute(&self),
            Commands::SetVersions(ref cmd) => cmd.execute(&self),
            Commands::Init(ref cmd) => cmd.execute(&self),
            Commands::Parse(ref cmd) => cmd.execute(&self),
        }
    }

    /// Resolve the configuration from `--config` or the working directory
    pub fn load_config(&self) -> anyhow::Result<Config> {
        let cwd = std::env::current_dir()?;
        let (config, path) = resolve_config(self.config.as_deref(), &cwd)?;
        match path {
            Some(path) => debug!(path = %path.display(), "using configuration file"),
            None => debug!("using default configuration"),
        }
        Ok(config)
    }
}
