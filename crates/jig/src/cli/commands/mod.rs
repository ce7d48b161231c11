//! CLI commands

mod enrich;
mod init;
mod parse;
mod set_versions;

pub use enrich::EnrichCommand;
pub use init::InitCommand;
pub use parse::ParseCommand;
pub use set_versions::SetVersionsCommand;

use std::path::Path;

use anyhow::Context;

use crate::cli::output::{self, path_style};

/// Write a rendered model back, or print it when `dry_run` is set
fn write_model(path: &Path, yaml: &str, dry_run: bool, quiet: bool) -> anyhow::Result<()> {
    if dry_run {
        print!("{}", yaml);
        return Ok(());
    }

    std::fs::write(path, yaml).with_context(|| format!("cannot write {}", path.display()))?;
    if !quiet {
        output::success(&format!(
            "Updated {}",
            path_style().apply_to(path.display())
        ));
    }
    Ok(())
}

/// Directory holding the model file, for resolving relative references
fn model_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
