//! Plugin system error types.

use thiserror::Error;

/// Result type for plugin operations.
pub type PluginResult<T> = Result<T, PluginError>;

/// Errors that can occur during plugin operations.
#[derive(Debug, Error)]
pub enum PluginError {
    /// A plugin failed to load. Non-fatal to the manager: the plugin is
    /// skipped and loading continues.
    #[error("Failed to load plugin '{plugin}': {reason}")]
    LoadFailed { plugin: String, reason: String },

    /// A plugin with the same id is already loaded.
    #[error("Plugin '{0}' is already loaded")]
    Duplicate(String),

    /// A declared contribution references a handler the resolver does not
    /// know.
    #[error("Plugin '{plugin}' declares unknown handler '{handler}'")]
    UnresolvedHandler { plugin: String, handler: String },

    /// Invalid plugin manifest.
    #[error("Invalid plugin manifest: {0}")]
    InvalidManifest(String),

    /// No plugin loaded under the id.
    #[error("Unknown plugin: {0}")]
    Unknown(String),

    /// IO error while discovering manifests.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
