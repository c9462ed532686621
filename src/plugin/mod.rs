//! Plugin system for stagegate.
//!
//! Plugins are trusted, in-process extensions. Each declares its
//! contributions - hooks, tools, and steering documents - in a manifest;
//! the manager resolves declared handler keys to callables and wires the
//! contributions into the hook, tool, and steering registries, tagging
//! every registration with the owning plugin id.
//!
//! # Lifecycle
//!
//! registered -> active -> cleared. Unloading a plugin removes its
//! contributions from all three registries as one logical operation.
//!
//! # Example manifest
//!
//! ```toml
//! id = "docs-helper"
//! version = "0.2.0"
//!
//! [[hooks]]
//! name = "audit"
//! type = "observer"
//! extension_point = "workflow.post-phase"
//! priority = 10
//! handler = "audit_handler"
//! ```

mod error;
mod manager;
mod manifest;
mod resolver;

pub use error::{PluginError, PluginResult};
pub use manager::{ClearSummary, LoadedPlugin, PluginManager, PluginState};
pub use manifest::{
    DirectoryManifestSource, ManifestHook, ManifestSource, ManifestSteering, ManifestTool,
    PluginManifest, StaticManifestSource, MANIFEST_FILE,
};
pub use resolver::{HandlerResolver, StaticHandlerResolver};
