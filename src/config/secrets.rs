//! Secret indirection.
//!
//! A `!secret` tagged scalar is replaced at bind time by a lookup in
//! `secrets.yaml` from the directory containing the referencing file.
//! Tables are loaded lazily, once per directory and load pass, and are
//! read-only.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::document::{parse_document, ConfigNode, ConfigParseError};

pub const SECRETS_FILE: &str = "secrets.yaml";

/// Name to literal value, scoped to one directory.
#[derive(Debug, Default, Clone)]
pub struct SecretsTable {
    values: HashMap<String, String>,
}

impl SecretsTable {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, String)> for SecretsTable {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Lazy per-directory cache of secrets tables.
#[derive(Debug, Default)]
pub struct SecretsStore {
    cache: HashMap<PathBuf, Arc<SecretsTable>>,
}

impl SecretsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every cached table so the next lookup re-reads from disk.
    /// Called between load passes; rotated secrets apply on the next one.
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    /// Table for the given directory. A missing `secrets.yaml` yields an
    /// empty table; a malformed one fails, since every secret reference in
    /// that directory would otherwise silently break.
    pub fn table_for(&mut self, dir: &Path) -> Result<Arc<SecretsTable>, ConfigParseError> {
        if let Some(table) = self.cache.get(dir) {
            return Ok(Arc::clone(table));
        }

        let path = dir.join(SECRETS_FILE);
        let table = match std::fs::read_to_string(&path) {
            Ok(text) => {
                let table = parse_table(&text)?;
                tracing::debug!(path = %path.display(), entries = table.len(), "Loaded secrets file");
                table
            }
            Err(_) => SecretsTable::default(),
        };

        let table = Arc::new(table);
        self.cache.insert(dir.to_path_buf(), Arc::clone(&table));
        Ok(table)
    }
}

fn parse_table(text: &str) -> Result<SecretsTable, ConfigParseError> {
    let doc = parse_document(text)?;
    let ConfigNode::Mapping(entries) = doc else {
        return Err(ConfigParseError::RootNotMapping);
    };

    let mut values = HashMap::with_capacity(entries.len());
    for (name, node) in entries {
        match node {
            ConfigNode::Scalar { value, .. } => {
                values.insert(name, value);
            }
            other => {
                tracing::warn!(
                    name = %name,
                    kind = other.kind(),
                    "Ignoring non-scalar secret value"
                );
            }
        }
    }
    Ok(SecretsTable { values })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SecretsStore::new();
        let table = store.table_for(dir.path()).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn values_resolve_by_name() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SECRETS_FILE), "api_token: abc123\nport: 8123\n").unwrap();

        let mut store = SecretsStore::new();
        let table = store.table_for(dir.path()).unwrap();
        assert_eq!(table.get("api_token"), Some("abc123"));
        assert_eq!(table.get("port"), Some("8123"));
        assert_eq!(table.get("absent"), None);
    }

    #[test]
    fn table_is_cached_per_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SECRETS_FILE), "a: one\n").unwrap();

        let mut store = SecretsStore::new();
        let first = store.table_for(dir.path()).unwrap();

        // Rewriting the file must not be observed through the cache.
        std::fs::write(dir.path().join(SECRETS_FILE), "a: two\n").unwrap();
        let second = store.table_for(dir.path()).unwrap();
        assert_eq!(first.get("a"), second.get("a"));
    }
}
