//! Release model file
//!
//! The model file lists the components under release (`services`) and
//! receives the computed `generatedValues`. Only `services` is read into
//! typed values; everything else in the file is carried through the
//! [`Document`] untouched.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use tracing::{debug, info, instrument};

use jig_core::{DocumentError, EnrichedRepo, GeneratedValues, Repo, RepoService, Result};

use crate::document::{Document, YamlPath};
use crate::enrich::Enricher;
use crate::registry::TrackerRegistry;

/// Top-level key holding the computed values
pub const GENERATED_VALUES_KEY: &str = "generatedValues";

#[derive(Debug, Default, Deserialize)]
struct ModelFile {
    #[serde(default)]
    services: Option<Vec<Value>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Overlay<'a> {
    services: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generated_values: Option<&'a GeneratedValues>,
}

/// A loaded model file
#[derive(Debug, Clone)]
pub struct Model {
    services: Vec<Repo>,
    /// Components as read, with the node each was read from
    loaded: Vec<(Repo, Value)>,
    generated: Option<GeneratedValues>,
    document: Document,
}

impl Model {
    /// Parse a model file; any previous `generatedValues` is dropped
    #[instrument(skip_all)]
    pub fn load(text: &str) -> Result<Self> {
        let mut document = Document::parse(text)?;

        let file = if document.is_empty() {
            ModelFile::default()
        } else {
            serde_yaml::from_str::<ModelFile>(text).map_err(DocumentError::Malformed)?
        };
        let loaded = file
            .services
            .unwrap_or_default()
            .into_iter()
            .map(|node| -> Result<(Repo, Value)> {
                let repo = serde_yaml::from_value::<Repo>(node.clone()).map_err(DocumentError::Malformed)?;
                Ok((repo, node))
            })
            .collect::<Result<Vec<_>>>()?;
        let services: Vec<Repo> = loaded.iter().map(|(repo, _)| repo.clone()).collect();

        if document.remove(GENERATED_VALUES_KEY) {
            debug!("previous generated values removed");
        }
        debug!(services = services.len(), "model loaded");

        Ok(Self {
            services,
            loaded,
            generated: None,
            document,
        })
    }

    /// Read and parse a model file from disk
    pub fn load_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| with_path(e, path))?;
        Self::load(&text)
    }

    pub fn services(&self) -> &[Repo] {
        &self.services
    }

    pub fn services_mut(&mut self) -> &mut Vec<Repo> {
        &mut self.services
    }

    /// Values computed by the enrichment steps, if they ran
    pub fn generated_values(&self) -> Option<&GeneratedValues> {
        self.generated.as_ref()
    }

    /// Refresh component versions from their `checkVersion` references.
    ///
    /// A reference reads `@<file>:<yaml-path>`; relative files starting
    /// with `.` are resolved against `root`. When the value found differs
    /// from `version`, the old version becomes `previousVersion`. Returns
    /// how many components changed.
    #[instrument(skip(self))]
    pub fn update_versions(&mut self, root: &Path) -> Result<usize> {
        let mut updated = 0;

        for repo in &mut self.services {
            let Some(reference) = repo.check_version.strip_prefix('@') else {
                continue;
            };
            let Some((file, path)) = reference.split_once(':') else {
                debug!(component = %repo.label, check_version = %repo.check_version, "no yaml path, skipped");
                continue;
            };

            let file = if file.starts_with('.') {
                root.join(file)
            } else {
                PathBuf::from(file)
            };
            let text = fs::read_to_string(&file).map_err(|e| with_path(e, &file))?;
            let values: Value = serde_yaml::from_str(&text).map_err(DocumentError::Malformed)?;
            let wanted = path.parse::<YamlPath>()?.find_scalar(&values)?;

            if wanted == repo.version {
                debug!(component = %repo.label, version = %wanted, "version unchanged");
                continue;
            }

            info!(
                component = %repo.label,
                from = %repo.version,
                to = %wanted,
                file = %file.display(),
                "version updated"
            );
            repo.previous_version = std::mem::replace(&mut repo.version, wanted);
            updated += 1;
        }

        Ok(updated)
    }

    /// Fill repository and release URLs for every component
    #[instrument(skip_all)]
    pub fn update_repo_infos(&mut self, service: &dyn RepoService) -> Result<()> {
        for repo in &mut self.services {
            repo.git_repo_url = service.get_repo_url(&repo.git_repo_id)?;
            repo.git_release_url = service.get_release_url(&repo.git_repo_id, &repo.version)?;
            debug!(component = %repo.label, url = %repo.git_repo_url, "repository info updated");
        }
        Ok(())
    }

    /// Collect the parsed records of every component.
    ///
    /// Components whose previous and target versions are the same are
    /// skipped.
    #[instrument(skip(self, service))]
    pub fn enrich_with_repos(&mut self, service: &dyn RepoService, mr_branch: &str) -> Result<()> {
        let mut generated = GeneratedValues::default();

        if self.services.is_empty() {
            info!("no components to process");
        }

        for repo in &self.services {
            if !repo.previous_version.is_empty() && repo.previous_version == repo.version {
                info!(
                    component = %repo.label,
                    version = %repo.version,
                    "same previous and target version, nothing changed"
                );
                continue;
            }

            info!(component = %repo, "processing component");
            let records = service.get_parsed_records(
                &repo.git_repo_id,
                &repo.previous_version,
                &repo.version,
                mr_branch,
            )?;
            debug!(component = %repo.label, records = records.len(), "records parsed");
            generated.git_repos.push(EnrichedRepo::new(repo.clone(), records));
        }

        self.generated = Some(generated);
        Ok(())
    }

    /// Join the parsed records with tracker metadata
    pub fn enrich_with_trackers(&mut self, registry: &TrackerRegistry) -> Result<()> {
        let generated = self.generated.get_or_insert_with(GeneratedValues::default);
        Enricher::new(registry).enrich(generated)
    }

    /// Render the model, merged over the original document.
    ///
    /// Components equal to what was loaded are written from their original
    /// node, so an unchanged `services` list keeps its text.
    pub fn to_yaml(&self) -> Result<String> {
        let services = self
            .services
            .iter()
            .enumerate()
            .map(|(index, repo)| match self.loaded.get(index) {
                Some((loaded, node)) if loaded == repo => Ok(node.clone()),
                _ => serde_yaml::to_value(repo).map_err(DocumentError::Render),
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let overlay = serde_yaml::to_value(Overlay {
            services,
            generated_values: self.generated.as_ref(),
        })
        .map_err(DocumentError::Render)?;

        let mut document = self.document.clone();
        document.merge(overlay)?;
        Ok(document.render()?)
    }
}

fn with_path(error: io::Error, path: &Path) -> io::Error {
    io::Error::new(error.kind(), format!("{}: {}", path.display(), error))
}
