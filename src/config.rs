//! Engine configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration file.
    #[error("Invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// Serialization failure.
    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Host-level engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory scanned for plugin manifests.
    pub plugins_dir: PathBuf,

    /// Directory holding persisted workflow state records.
    pub state_dir: PathBuf,

    /// Timeout hosts should apply around plugin-supplied handlers, in
    /// seconds. Handlers are trusted but unsandboxed; the engine itself
    /// never enforces this.
    pub handler_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            plugins_dir: PathBuf::from("plugins"),
            state_dir: PathBuf::from("state"),
            handler_timeout_secs: 30,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
