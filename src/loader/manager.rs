//! Component instance loading.
//!
//! Discovers app configuration files in one directory and drives the
//! binder once per top-level entry. Failures are isolated per file: a bad
//! entry aborts the rest of its file (no partial set from a failing file)
//! while sibling files still load, and everything that went wrong is
//! collected into the returned report.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::binder::{bind_component, BindError, ComponentInstance, CLASS_KEY};
use crate::config::document::{parse_document, ConfigNode, ConfigParseError};
use crate::config::secrets::{SecretsStore, SECRETS_FILE};
use crate::registry::ComponentTypeRegistry;

/// One file-scoped failure from a load pass.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{}: {source}", .file.display())]
    Io {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {source}", .file.display())]
    Parse {
        file: PathBuf,
        #[source]
        source: ConfigParseError,
    },

    /// Binder failure wrapped with the entry's id and file path.
    #[error("{}: error instancing component `{}`: {source}", .file.display(), .id)]
    Instantiation {
        file: PathBuf,
        id: String,
        #[source]
        source: BindError,
    },
}

/// Aggregate outcome of one load pass over the configuration directory.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub instances: Vec<ComponentInstance>,
    pub errors: Vec<LoadError>,
}

impl LoadReport {
    pub fn count(&self) -> usize {
        self.instances.len()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Discovers configuration files and aggregates the bound instance set.
pub struct ComponentInstanceManager {
    config_dir: PathBuf,
    secrets: SecretsStore,
}

impl ComponentInstanceManager {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            secrets: SecretsStore::new(),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// One full load pass. An empty directory is a warning, not an error;
    /// the daemon keeps running with zero components.
    pub fn load_all(&mut self, registry: &ComponentTypeRegistry) -> LoadReport {
        let mut report = LoadReport::default();

        // The secrets cache is scoped to one pass: each generation binds
        // against freshly read tables.
        self.secrets.clear();

        let files = discover_config_files(&self.config_dir);
        if files.is_empty() {
            tracing::warn!(
                dir = %self.config_dir.display(),
                "No YAML configuration files found, running with zero components"
            );
            return report;
        }

        for file in files {
            match self.load_file(&file, registry) {
                Ok(instances) => report.instances.extend(instances),
                Err(error) => {
                    tracing::error!(file = %file.display(), error = %error, "Skipping configuration file");
                    report.errors.push(error);
                }
            }
        }

        tracing::info!(
            count = report.count(),
            failed_files = report.errors.len(),
            "Component load pass finished"
        );
        report
    }

    /// Load every entry of one file, fail-fast within the file.
    fn load_file(
        &mut self,
        file: &Path,
        registry: &ComponentTypeRegistry,
    ) -> Result<Vec<ComponentInstance>, LoadError> {
        let text = std::fs::read_to_string(file).map_err(|source| LoadError::Io {
            file: file.to_path_buf(),
            source,
        })?;
        let doc = parse_document(&text).map_err(|source| LoadError::Parse {
            file: file.to_path_buf(),
            source,
        })?;

        let dir = file.parent().unwrap_or(Path::new("."));
        let secrets = self.secrets.table_for(dir).map_err(|source| LoadError::Parse {
            file: dir.join(SECRETS_FILE),
            source,
        })?;

        let ConfigNode::Mapping(entries) = &doc else {
            unreachable!("parse_document only returns mapping roots");
        };

        let mut instances = Vec::new();
        for (id, body) in entries {
            let ConfigNode::Mapping(body) = body else {
                tracing::debug!(id = %id, "Entry body is not a mapping, skipping");
                continue;
            };

            let Some(class_name) = class_of(body) else {
                tracing::warn!(
                    file = %file.display(),
                    id = %id,
                    "Entry has no `class` key, skipping"
                );
                continue;
            };

            // An unregistered class produces no instance and no error,
            // only a diagnostic, so a misspelled name stays visible.
            let Some(schema) = registry.resolve(class_name) else {
                tracing::warn!(
                    file = %file.display(),
                    id = %id,
                    class = %class_name,
                    "Class is not registered, skipping entry"
                );
                continue;
            };

            let instance =
                bind_component(id, body, schema, &secrets).map_err(|source| {
                    LoadError::Instantiation {
                        file: file.to_path_buf(),
                        id: id.clone(),
                        source,
                    }
                })?;
            tracing::debug!(id = %instance.id, class = %instance.class_name, "Component bound");
            instances.push(instance);
        }
        Ok(instances)
    }
}

/// The `class` scalar of an entry body, matched case-insensitively.
fn class_of(body: &[(String, ConfigNode)]) -> Option<&str> {
    body.iter().find_map(|(key, value)| {
        if !key.eq_ignore_ascii_case(CLASS_KEY) {
            return None;
        }
        match value {
            ConfigNode::Scalar { value, .. } => Some(value.as_str()),
            _ => None,
        }
    })
}

/// YAML files in discovery order (sorted for determinism; order carries no
/// semantics). The secrets file itself is not an app configuration.
fn discover_config_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            let is_yaml = matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("yaml") | Some("yml")
            );
            let is_secrets = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n == SECRETS_FILE);
            is_yaml && !is_secrets
        })
        .collect();
    files.sort();
    files
}
