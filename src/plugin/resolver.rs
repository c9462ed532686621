//! Handler resolution.
//!
//! Manifests declare contributions by handler key; this is the narrow
//! interface that turns a key into runnable code. Hosts register their
//! in-process callables with a [`StaticHandlerResolver`], or implement
//! [`HandlerResolver`] over whatever dispatch they need.

use std::collections::HashMap;

use crate::hooks::HookHandler;
use crate::tools::ToolHandler;

/// Resolves a plugin's declared handler keys to callables.
pub trait HandlerResolver: Send + Sync {
    /// Resolve a hook handler key for a plugin.
    fn hook_handler(&self, plugin_id: &str, key: &str) -> Option<HookHandler>;

    /// Resolve a tool handler key for a plugin.
    fn tool_handler(&self, plugin_id: &str, key: &str) -> Option<ToolHandler>;
}

/// An in-process handler table keyed by `(plugin_id, key)`.
#[derive(Default)]
pub struct StaticHandlerResolver {
    hooks: HashMap<(String, String), HookHandler>,
    tools: HashMap<(String, String), ToolHandler>,
}

impl StaticHandlerResolver {
    /// Create an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hook handler under a key.
    pub fn add_hook_handler(
        &mut self,
        plugin_id: impl Into<String>,
        key: impl Into<String>,
        handler: HookHandler,
    ) {
        self.hooks.insert((plugin_id.into(), key.into()), handler);
    }

    /// Register a tool handler under a key.
    pub fn add_tool_handler(
        &mut self,
        plugin_id: impl Into<String>,
        key: impl Into<String>,
        handler: ToolHandler,
    ) {
        self.tools.insert((plugin_id.into(), key.into()), handler);
    }
}

impl HandlerResolver for StaticHandlerResolver {
    fn hook_handler(&self, plugin_id: &str, key: &str) -> Option<HookHandler> {
        self.hooks.get(&(plugin_id.to_string(), key.to_string())).cloned()
    }

    fn tool_handler(&self, plugin_id: &str, key: &str) -> Option<ToolHandler> {
        self.tools.get(&(plugin_id.to_string(), key.to_string())).cloned()
    }
}
