//! Configuration loading

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{ConfigError, Result};

use super::defaults::{config_file_names, ENV_PREFIX, HOME_CONFIG_FILE};
use super::types::Config;
use super::validation::validate_config;

/// Load configuration from a file
pub fn load_config(path: &Path) -> Result<Config> {
    let format = if path.extension().is_some_and(|e| e == "toml") {
        "TOML"
    } else {
        "YAML"
    };
    info!(path = %path.display(), format, "loading config");

    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()).into());
    }
    let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

    let mut config: Config = if content.trim().is_empty() {
        Config::default()
    } else if format == "TOML" {
        toml::from_str(&content).map_err(ConfigError::TomlError)?
    } else {
        serde_yaml::from_str(&content).map_err(ConfigError::YamlError)?
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config)?;
    debug!(path = %path.display(), "config loaded and validated");
    Ok(config)
}

/// Find configuration file in directory or parent directories.
///
/// At each directory level the search checks:
///   1. `<dir>/<name>`          (e.g. `jig.yaml`)
///   2. `<dir>/.github/<name>`  (e.g. `.github/jig.yaml`)
///
/// The first match wins. Parents are walked until the filesystem root.
pub fn find_config(start_dir: &Path) -> Option<PathBuf> {
    debug!(start_dir = %start_dir.display(), "searching for config file");
    let mut current = start_dir.to_path_buf();

    loop {
        for name in config_file_names() {
            let config_path = current.join(name);
            if config_path.exists() {
                info!(path = %config_path.display(), "found config file");
                return Some(config_path);
            }

            let github_path = current.join(".github").join(name);
            if github_path.exists() {
                info!(path = %github_path.display(), "found config file in .github/");
                return Some(github_path);
            }
        }

        if !current.pop() {
            break;
        }
    }

    debug!("no config file found");
    None
}

/// Resolve the configuration for a run.
///
/// An explicit path must exist. Otherwise the nearest project file is used,
/// then `~/.jig.yaml`, then the built-in defaults. Errors in a file that was
/// found are reported, never silently replaced by defaults.
pub fn resolve_config(explicit: Option<&Path>, dir: &Path) -> Result<(Config, Option<PathBuf>)> {
    if let Some(path) = explicit {
        let config = load_config(path)?;
        return Ok((config, Some(path.to_path_buf())));
    }

    let candidate = find_config(dir).or_else(|| {
        dirs::home_dir()
            .map(|home| home.join(HOME_CONFIG_FILE))
            .filter(|path| path.exists())
    });

    match candidate {
        Some(path) => {
            let config = load_config(&path)?;
            Ok((config, Some(path)))
        }
        None => {
            info!(dir = %dir.display(), "no config found, using defaults");
            let mut config = Config::default();
            apply_env_overrides(&mut config, |key| std::env::var(key).ok());
            validate_config(&config)?;
            Ok((config, None))
        }
    }
}

/// Override credentials and endpoints from `JIG_*` variables.
///
/// `lookup` resolves a variable name; empty values are ignored.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let targets: [(&str, &mut String); 6] = [
        ("GIT_URL", &mut config.git.url),
        ("GIT_TOKEN", &mut config.git.token),
        ("GIT_MR_BRANCH", &mut config.git.mr_branch),
        ("JIRA_URL", &mut config.jira.url),
        ("JIRA_USERNAME", &mut config.jira.username),
        ("JIRA_PASSWORD", &mut config.jira.password),
    ];

    for (suffix, target) in targets {
        let key = format!("{}{}", ENV_PREFIX, suffix);
        if let Some(value) = lookup(&key).filter(|v| !v.is_empty()) {
            debug!(variable = %key, "configuration overridden from environment");
            *target = value;
        }
    }
}
