//! Plugin manifests and manifest discovery.
//!
//! A manifest declares a plugin's contributions: hooks, tools, and steering
//! documents. Hook and tool entries name a handler key that the plugin
//! manager resolves to actual code through a [`HandlerResolver`]; the
//! manifest itself is pure data.
//!
//! [`HandlerResolver`]: super::resolver::HandlerResolver

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::hooks::{HookCondition, HookType};
use crate::steering::{SteeringMode, SteeringVariable};

use super::{PluginError, PluginResult};

/// Plugin manifest file name.
pub const MANIFEST_FILE: &str = "plugin.toml";

/// A hook contribution declared in a manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestHook {
    /// Hook name, unique within the plugin.
    pub name: String,
    /// Data-flow type.
    #[serde(rename = "type")]
    pub hook_type: HookType,
    /// Extension point to bind to.
    pub extension_point: String,
    /// Execution priority; higher runs first.
    #[serde(default)]
    pub priority: i32,
    /// Conditions gating execution.
    #[serde(default)]
    pub conditions: Vec<HookCondition>,
    /// Handler key resolved at load time.
    pub handler: String,
}

fn default_schema() -> Value {
    serde_json::json!({"type": "object"})
}

/// A tool contribution declared in a manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestTool {
    /// Globally unique tool name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Category.
    #[serde(default)]
    pub category: String,
    /// Input schema.
    #[serde(default = "default_schema")]
    pub input_schema: Value,
    /// Output schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<Value>,
    /// Permission tags.
    #[serde(default)]
    pub permissions: Vec<String>,
    /// Handler key resolved at load time.
    pub handler: String,
}

/// A steering contribution declared in a manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestSteering {
    /// Document name, unique within the plugin.
    pub name: String,
    /// Topic label.
    #[serde(rename = "type", default)]
    pub doc_type: String,
    /// Applicability mode.
    pub mode: SteeringMode,
    /// Conflict-resolution priority.
    #[serde(default)]
    pub priority: i32,
    /// File patterns for conditional mode.
    #[serde(default)]
    pub patterns: Vec<String>,
    /// Template body.
    pub template: String,
    /// Expected variables.
    #[serde(default)]
    pub variables: Vec<SteeringVariable>,
}

/// A plugin's declared identity and contributions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginManifest {
    /// Plugin id, unique across the host.
    pub id: String,
    /// Plugin version.
    pub version: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Declared hooks.
    #[serde(default)]
    pub hooks: Vec<ManifestHook>,
    /// Declared tools.
    #[serde(default)]
    pub tools: Vec<ManifestTool>,
    /// Declared steering documents.
    #[serde(default)]
    pub steering: Vec<ManifestSteering>,
}

impl PluginManifest {
    /// Parse a manifest from TOML text.
    pub fn from_toml_str(content: &str) -> PluginResult<Self> {
        let manifest: Self =
            toml::from_str(content).map_err(|e| PluginError::InvalidManifest(e.to_string()))?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Load and parse a manifest file.
    pub fn from_file(path: &Path) -> PluginResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate structural requirements.
    pub fn validate(&self) -> PluginResult<()> {
        if self.id.trim().is_empty() {
            return Err(PluginError::InvalidManifest("plugin id must not be empty".to_string()));
        }
        if self.version.trim().is_empty() {
            return Err(PluginError::InvalidManifest(format!(
                "plugin '{}' has an empty version",
                self.id
            )));
        }

        let mut seen = std::collections::HashSet::new();
        for hook in &self.hooks {
            if !seen.insert(hook.name.as_str()) {
                return Err(PluginError::InvalidManifest(format!(
                    "duplicate hook name '{}' in plugin '{}'",
                    hook.name, self.id
                )));
            }
        }
        seen.clear();
        for tool in &self.tools {
            if !seen.insert(tool.name.as_str()) {
                return Err(PluginError::InvalidManifest(format!(
                    "duplicate tool name '{}' in plugin '{}'",
                    tool.name, self.id
                )));
            }
        }
        seen.clear();
        for doc in &self.steering {
            if !seen.insert(doc.name.as_str()) {
                return Err(PluginError::InvalidManifest(format!(
                    "duplicate steering document '{}' in plugin '{}'",
                    doc.name, self.id
                )));
            }
        }

        Ok(())
    }
}

/// Supplies plugin manifests to the manager.
///
/// The engine does not parse manifest files itself; hosts can implement
/// this over any format or source.
#[async_trait]
pub trait ManifestSource: Send + Sync {
    /// Discover available manifests.
    async fn discover(&self) -> PluginResult<Vec<PluginManifest>>;
}

/// Discovers `plugin.toml` manifests under a plugins directory.
///
/// Each plugin lives in its own subdirectory. Malformed manifests are
/// logged and skipped; they never abort discovery.
pub struct DirectoryManifestSource {
    root: PathBuf,
}

impl DirectoryManifestSource {
    /// Create a source scanning the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ManifestSource for DirectoryManifestSource {
    async fn discover(&self) -> PluginResult<Vec<PluginManifest>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut paths: Vec<PathBuf> = walkdir::WalkDir::new(&self.root)
            .max_depth(2)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file() && e.file_name() == MANIFEST_FILE)
            .map(walkdir::DirEntry::into_path)
            .collect();
        paths.sort();

        let reads = paths.iter().map(tokio::fs::read_to_string);
        let contents = futures::future::join_all(reads).await;

        let mut manifests = Vec::new();
        for (path, content) in paths.iter().zip(contents) {
            let parsed = content
                .map_err(PluginError::from)
                .and_then(|c| PluginManifest::from_toml_str(&c));
            match parsed {
                Ok(manifest) => manifests.push(manifest),
                Err(e) => {
                    tracing::warn!(path = ?path, error = %e, "Skipping malformed plugin manifest");
                }
            }
        }

        Ok(manifests)
    }
}

/// A fixed, in-memory manifest source.
pub struct StaticManifestSource {
    manifests: Vec<PluginManifest>,
}

impl StaticManifestSource {
    /// Create a source returning the given manifests.
    pub fn new(manifests: Vec<PluginManifest>) -> Self {
        Self { manifests }
    }
}

#[async_trait]
impl ManifestSource for StaticManifestSource {
    async fn discover(&self) -> PluginResult<Vec<PluginManifest>> {
        Ok(self.manifests.clone())
    }
}
