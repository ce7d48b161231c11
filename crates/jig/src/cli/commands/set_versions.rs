//! Set-versions command

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tracing::info;

use jig_model::Model;

use crate::cli::{Cli, OutputFormat};

use super::{model_dir, write_model};

/// Refresh component versions from their checkVersion references.
///
/// `checkVersion: '@<file>:<yaml-path>'` names the file and path holding
/// the current version; a changed value moves the old version to
/// `previousVersion`.
#[derive(Debug, Args)]
pub struct SetVersionsCommand {
    /// Model file to update
    pub model: PathBuf,

    /// Print the updated model instead of writing it
    #[arg(long)]
    pub dry_run: bool,
}

impl SetVersionsCommand {
    /// Execute the set-versions command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(model = %self.model.display(), dry_run = self.dry_run, "executing set-versions command");
        let mut model = Model::load_file(&self.model)
            .with_context(|| format!("cannot load model {}", self.model.display()))?;

        let updated = model.update_versions(model_dir(&self.model))?;
        let yaml = model.to_yaml()?;
        write_model(&self.model, &yaml, self.dry_run, cli.quiet || self.dry_run)?;

        if matches!(cli.format, OutputFormat::Json) && !self.dry_run {
            let versions: Vec<_> = model
                .services()
                .iter()
                .map(|repo| {
                    serde_json::json!({
                        "label": repo.label,
                        "previousVersion": repo.previous_version,
                        "version": repo.version,
                    })
                })
                .collect();
            let output = serde_json::json!({ "updated": updated, "services": versions });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else if !cli.quiet && !self.dry_run {
            println!("{} component(s) updated", updated);
        }
        Ok(())
    }
}
