//! Process-level host settings.
//!
//! Sourced from a TOML file when present, overridden by environment
//! variables, optionally overlaid by a supervisor add-on `options.json`.
//! Validation separates semantic checks from serde's syntactic ones.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Root settings for the daemon process.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct HostSettings {
    /// Generate convenience extension code on first connect.
    pub generate_entities: bool,

    /// Folder holding automation sources; app configs live in `<it>/apps`.
    pub source_folder: Option<PathBuf>,

    /// Project folder for generated code.
    pub project_folder: Option<PathBuf>,

    /// Event source endpoint.
    pub event_source: EventSourceSettings,

    /// Supervisor timing knobs.
    pub supervisor: SupervisorSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EventSourceSettings {
    pub host: String,
    pub port: u16,
    pub ssl: bool,
    pub token: Option<String>,
}

impl Default for EventSourceSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8123,
            ssl: false,
            token: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SupervisorSettings {
    /// Fixed wait between reconnect attempts, in seconds.
    pub reconnect_interval_secs: u64,

    /// Wait between readiness probes, in milliseconds.
    pub ready_poll_interval_ms: u64,

    /// Bounded number of readiness probes per connect attempt.
    pub ready_poll_attempts: u32,
}

impl Default for SupervisorSettings {
    fn default() -> Self {
        Self {
            reconnect_interval_secs: 40,
            ready_poll_interval_ms: 1000,
            ready_poll_attempts: 6,
        }
    }
}

impl SupervisorSettings {
    pub fn reconnect_interval(&self) -> Duration {
        Duration::from_secs(self.reconnect_interval_secs)
    }

    pub fn ready_poll_interval(&self) -> Duration {
        Duration::from_millis(self.ready_poll_interval_ms)
    }
}

impl HostSettings {
    /// Directory the app configuration files are discovered in.
    pub fn apps_folder(&self) -> PathBuf {
        self.source_folder
            .clone()
            .unwrap_or_else(default_source_folder)
            .join("apps")
    }
}

fn default_source_folder() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".automationd")
}

/// Error type for settings loading.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse error in {}: {}", .path.display(), .message)]
    Parse { path: PathBuf, message: String },
    #[error("invalid settings: {0}")]
    Validation(String),
}

/// Load settings: file (if any), then environment, then validation.
pub fn load_settings(path: Option<&Path>) -> Result<HostSettings, SettingsError> {
    let mut settings = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            toml::from_str(&text).map_err(|e| SettingsError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
        }
        None => HostSettings::default(),
    };

    apply_env_overrides(&mut settings);
    validate_settings(&settings)?;
    Ok(settings)
}

/// Environment overrides, `AUTOMATIOND__` prefixed like the settings tree.
fn apply_env_overrides(settings: &mut HostSettings) {
    if let Some(v) = env_string("AUTOMATIOND__SOURCE_FOLDER") {
        settings.source_folder = Some(PathBuf::from(v));
    }
    if let Some(v) = env_string("AUTOMATIOND__PROJECT_FOLDER") {
        settings.project_folder = Some(PathBuf::from(v));
    }
    if let Some(v) = env_string("AUTOMATIOND__GENERATE_ENTITIES") {
        settings.generate_entities = matches!(v.to_ascii_lowercase().as_str(), "true" | "1");
    }
    if let Some(v) = env_string("AUTOMATIOND__EVENT_SOURCE__HOST") {
        settings.event_source.host = v;
    }
    if let Some(v) = env_string("AUTOMATIOND__EVENT_SOURCE__PORT") {
        if let Ok(port) = v.parse() {
            settings.event_source.port = port;
        } else {
            tracing::warn!(value = %v, "Ignoring non-numeric event source port override");
        }
    }
    if let Some(v) = env_string("AUTOMATIOND__EVENT_SOURCE__TOKEN") {
        settings.event_source.token = Some(v);
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn validate_settings(settings: &HostSettings) -> Result<(), SettingsError> {
    if settings.supervisor.reconnect_interval_secs == 0 {
        return Err(SettingsError::Validation(
            "supervisor.reconnect_interval_secs must be > 0".to_string(),
        ));
    }
    if settings.supervisor.ready_poll_interval_ms == 0 {
        return Err(SettingsError::Validation(
            "supervisor.ready_poll_interval_ms must be > 0".to_string(),
        ));
    }
    if settings.supervisor.ready_poll_attempts == 0 {
        return Err(SettingsError::Validation(
            "supervisor.ready_poll_attempts must be > 0".to_string(),
        ));
    }
    if settings.event_source.host.is_empty() {
        return Err(SettingsError::Validation(
            "event_source.host must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Add-on options overlay, read from the managing supervisor's JSON file.
#[derive(Debug, Deserialize)]
pub struct AddonOptions {
    pub log_level: Option<String>,
    pub generate_entities: Option<bool>,
    pub project_folder: Option<PathBuf>,
}

/// Overlay add-on options onto settings when the file exists.
pub fn apply_addon_options(settings: &mut HostSettings, path: &Path) -> Result<(), SettingsError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(_) => return Ok(()),
    };
    let options: AddonOptions = serde_json::from_str(&text).map_err(|e| SettingsError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    if let Some(generate) = options.generate_entities {
        settings.generate_entities = generate;
    }
    if let Some(folder) = options.project_folder {
        settings.project_folder = Some(folder);
    }
    if let Some(level) = options.log_level {
        tracing::info!(level = %level, "Add-on options request a log level (set RUST_LOG to apply)");
    }
    Ok(())
}
