//! Plugin manager: discovery, loading, and lifecycle.
//!
//! The manager is the sole mutator of the hook, tool, and steering
//! registries. Plugin load and unload are expected to happen while no
//! requests are executing against the registries; the engine does not
//! serialize loads against in-flight pipelines.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::hooks::{HookRegistration, HookRegistry};
use crate::steering::{SteeringDocument, SteeringRegistry};
use crate::tools::{ToolDefinition, ToolRegistry};

use super::manifest::{ManifestSource, PluginManifest};
use super::resolver::HandlerResolver;
use super::{PluginError, PluginResult};

/// Lifecycle state of a loaded plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginState {
    /// Contributions are wired into the registries.
    Active,
    /// Contributions have been removed.
    Cleared,
    /// Loading failed; nothing was wired.
    Failed,
}

/// A plugin known to the manager.
#[derive(Debug, Clone)]
pub struct LoadedPlugin {
    /// The plugin's manifest.
    pub manifest: PluginManifest,
    /// Lifecycle state.
    pub state: PluginState,
    /// When the plugin was loaded.
    pub loaded_at: DateTime<Utc>,
    /// Last load error, if any.
    pub last_error: Option<String>,
}

/// Counts of contributions removed by a plugin clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearSummary {
    /// Hooks removed.
    pub hooks: usize,
    /// Tools removed.
    pub tools: usize,
    /// Steering documents removed.
    pub steering: usize,
}

/// Wires plugin contributions into the three registries and owns plugin
/// lifecycle.
pub struct PluginManager {
    hooks: Arc<HookRegistry>,
    tools: Arc<ToolRegistry>,
    steering: Arc<SteeringRegistry>,
    plugins: RwLock<HashMap<String, LoadedPlugin>>,
}

impl PluginManager {
    /// Create a manager over the given registries.
    pub fn new(
        hooks: Arc<HookRegistry>,
        tools: Arc<ToolRegistry>,
        steering: Arc<SteeringRegistry>,
    ) -> Self {
        Self { hooks, tools, steering, plugins: RwLock::new(HashMap::new()) }
    }

    /// Discover and load all plugins from a source.
    ///
    /// Each plugin's declared handlers are resolved before anything is
    /// registered, so a plugin either wires completely or not at all. A
    /// single plugin's failure is logged and recorded; it never aborts
    /// loading of the remaining plugins. Returns the number of plugins
    /// loaded successfully.
    pub async fn initialize(
        &self,
        source: &dyn ManifestSource,
        resolver: &dyn HandlerResolver,
    ) -> PluginResult<usize> {
        let manifests = source.discover().await?;
        let mut loaded = 0;

        for manifest in manifests {
            let id = manifest.id.clone();
            match self.load_plugin(manifest, resolver) {
                Ok(()) => loaded += 1,
                Err(e) => {
                    tracing::error!(plugin = %id, error = %e, "Plugin load failed");
                }
            }
        }

        tracing::info!(loaded, "Plugin initialization complete");
        Ok(loaded)
    }

    /// Load a single plugin from its manifest.
    pub fn load_plugin(
        &self,
        manifest: PluginManifest,
        resolver: &dyn HandlerResolver,
    ) -> PluginResult<()> {
        let id = manifest.id.clone();

        if let Some(existing) = self.plugins.read().get(&id) {
            if existing.state == PluginState::Active {
                return Err(PluginError::Duplicate(id));
            }
        }

        match self.wire_plugin(&manifest, resolver) {
            Ok(()) => {
                self.plugins.write().insert(
                    id.clone(),
                    LoadedPlugin {
                        manifest,
                        state: PluginState::Active,
                        loaded_at: Utc::now(),
                        last_error: None,
                    },
                );
                tracing::info!(plugin = %id, "Plugin loaded");
                Ok(())
            }
            Err(e) => {
                let reason = e.to_string();
                self.plugins.write().insert(
                    id.clone(),
                    LoadedPlugin {
                        manifest,
                        state: PluginState::Failed,
                        loaded_at: Utc::now(),
                        last_error: Some(reason.clone()),
                    },
                );
                Err(PluginError::LoadFailed { plugin: id, reason })
            }
        }
    }

    /// Resolve every declared handler, then register all contributions.
    fn wire_plugin(
        &self,
        manifest: &PluginManifest,
        resolver: &dyn HandlerResolver,
    ) -> PluginResult<()> {
        let id = &manifest.id;

        // Resolve first so a bad handler key leaves no partial wiring.
        let mut hook_registrations = Vec::with_capacity(manifest.hooks.len());
        for hook in &manifest.hooks {
            let handler = resolver.hook_handler(id, &hook.handler).ok_or_else(|| {
                PluginError::UnresolvedHandler { plugin: id.clone(), handler: hook.handler.clone() }
            })?;
            let mut registration = HookRegistration::new(
                id.clone(),
                hook.name.clone(),
                hook.hook_type,
                hook.extension_point.clone(),
                handler,
            )
            .with_priority(hook.priority);
            registration.conditions = hook.conditions.clone();
            hook_registrations.push(registration);
        }

        let mut tool_definitions = Vec::with_capacity(manifest.tools.len());
        for tool in &manifest.tools {
            let handler = resolver.tool_handler(id, &tool.handler).ok_or_else(|| {
                PluginError::UnresolvedHandler { plugin: id.clone(), handler: tool.handler.clone() }
            })?;
            tool_definitions.push(
                ToolDefinition::new(id.clone(), tool.name.clone(), handler)
                    .with_description(tool.description.clone())
                    .with_category(if tool.category.is_empty() {
                        "general".to_string()
                    } else {
                        tool.category.clone()
                    })
                    .with_input_schema(tool.input_schema.clone())
                    .with_permissions(tool.permissions.clone()),
            );
        }

        for registration in hook_registrations {
            self.hooks.register(registration);
        }
        for definition in tool_definitions {
            self.tools.register(definition);
        }
        for doc in &manifest.steering {
            self.steering.register(SteeringDocument {
                plugin_id: id.clone(),
                name: doc.name.clone(),
                doc_type: doc.doc_type.clone(),
                mode: doc.mode,
                priority: doc.priority,
                patterns: doc.patterns.clone(),
                template: doc.template.clone(),
                variables: doc.variables.clone(),
            });
        }

        Ok(())
    }

    /// Remove a plugin's contributions from all three registries as one
    /// logical operation.
    pub fn clear_plugin(&self, plugin_id: &str) -> PluginResult<ClearSummary> {
        let mut plugins = self.plugins.write();
        let plugin =
            plugins.get_mut(plugin_id).ok_or_else(|| PluginError::Unknown(plugin_id.to_string()))?;

        let summary = ClearSummary {
            hooks: self.hooks.clear_plugin(plugin_id),
            tools: self.tools.clear_plugin(plugin_id),
            steering: self.steering.clear_plugin(plugin_id),
        };
        plugin.state = PluginState::Cleared;

        tracing::info!(
            plugin = %plugin_id,
            hooks = summary.hooks,
            tools = summary.tools,
            steering = summary.steering,
            "Cleared plugin contributions"
        );

        Ok(summary)
    }

    /// Clear a plugin and re-wire it from its stored manifest.
    pub fn reload_plugin(
        &self,
        plugin_id: &str,
        resolver: &dyn HandlerResolver,
    ) -> PluginResult<()> {
        let manifest = self
            .plugins
            .read()
            .get(plugin_id)
            .map(|p| p.manifest.clone())
            .ok_or_else(|| PluginError::Unknown(plugin_id.to_string()))?;

        self.clear_plugin(plugin_id)?;
        self.load_plugin(manifest, resolver)
    }

    /// Get a loaded plugin by id.
    pub fn plugin(&self, plugin_id: &str) -> Option<LoadedPlugin> {
        self.plugins.read().get(plugin_id).cloned()
    }

    /// Ids of all known plugins, sorted.
    pub fn plugin_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.plugins.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Number of plugins in the active state.
    pub fn active_count(&self) -> usize {
        self.plugins.read().values().filter(|p| p.state == PluginState::Active).count()
    }

    /// Number of known plugins in any state.
    pub fn count(&self) -> usize {
        self.plugins.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::{HookHandler, HookOutcome, HookType};
    use crate::plugin::manifest::{ManifestHook, ManifestTool, StaticManifestSource};
    use crate::plugin::resolver::StaticHandlerResolver;
    use crate::tools::{ToolContext, ToolHandler};
    use serde_json::json;

    fn manifest_with_contributions(id: &str) -> PluginManifest {
        PluginManifest {
            id: id.to_string(),
            version: "1.0.0".to_string(),
            description: None,
            hooks: vec![ManifestHook {
                name: "audit".to_string(),
                hook_type: HookType::Observer,
                extension_point: "workflow.post-phase".to_string(),
                priority: 10,
                conditions: Vec::new(),
                handler: "audit".to_string(),
            }],
            tools: vec![ManifestTool {
                name: format!("{id}-echo"),
                description: String::new(),
                category: "debug".to_string(),
                input_schema: json!({"type": "object"}),
                output_schema: None,
                permissions: Vec::new(),
                handler: "echo".to_string(),
            }],
            steering: Vec::new(),
        }
    }

    fn resolver_for(id: &str) -> StaticHandlerResolver {
        let mut resolver = StaticHandlerResolver::new();
        let hook: HookHandler = Arc::new(|_, _| Ok(HookOutcome::unchanged()));
        resolver.add_hook_handler(id, "audit", hook);
        let tool: ToolHandler = Arc::new(|input, _| Ok(input));
        resolver.add_tool_handler(id, "echo", tool);
        resolver
    }

    fn manager() -> PluginManager {
        PluginManager::new(
            Arc::new(HookRegistry::new()),
            Arc::new(ToolRegistry::new()),
            Arc::new(SteeringRegistry::new()),
        )
    }

    #[tokio::test]
    async fn test_initialize_wires_contributions() {
        let manager = manager();
        let source = StaticManifestSource::new(vec![manifest_with_contributions("p1")]);

        let loaded = manager.initialize(&source, &resolver_for("p1")).await.unwrap();
        assert_eq!(loaded, 1);
        assert_eq!(manager.active_count(), 1);
        assert_eq!(manager.hooks.hook_count("workflow.post-phase"), 1);
        assert!(manager.tools.get("p1-echo").is_some());
    }

    #[tokio::test]
    async fn test_load_failure_is_isolated() {
        let manager = manager();
        // p1 resolves, p2 declares a handler the resolver does not know.
        let source = StaticManifestSource::new(vec![
            manifest_with_contributions("p1"),
            manifest_with_contributions("p2"),
        ]);

        let loaded = manager.initialize(&source, &resolver_for("p1")).await.unwrap();
        assert_eq!(loaded, 1);
        assert_eq!(manager.count(), 2);
        assert_eq!(manager.plugin("p2").unwrap().state, PluginState::Failed);
        assert!(manager.plugin("p2").unwrap().last_error.is_some());

        // Nothing from the failed plugin was wired.
        assert!(manager.tools.get("p2-echo").is_none());
        assert_eq!(manager.hooks.hook_count("workflow.post-phase"), 1);
    }

    #[tokio::test]
    async fn test_duplicate_active_plugin_rejected() {
        let manager = manager();
        let resolver = resolver_for("p1");

        manager.load_plugin(manifest_with_contributions("p1"), &resolver).unwrap();
        let result = manager.load_plugin(manifest_with_contributions("p1"), &resolver);
        assert!(matches!(result, Err(PluginError::Duplicate(_))));
    }

    #[tokio::test]
    async fn test_clear_plugin_spans_registries() {
        let manager = manager();
        let resolver = resolver_for("p1");
        let mut manifest = manifest_with_contributions("p1");
        manifest.steering.push(super::super::manifest::ManifestSteering {
            name: "guide".to_string(),
            doc_type: String::new(),
            mode: crate::steering::SteeringMode::Always,
            priority: 0,
            patterns: Vec::new(),
            template: "hello".to_string(),
            variables: Vec::new(),
        });

        manager.load_plugin(manifest, &resolver).unwrap();
        assert_eq!(manager.steering.count(), 1);

        let summary = manager.clear_plugin("p1").unwrap();
        assert_eq!(summary, ClearSummary { hooks: 1, tools: 1, steering: 1 });
        assert_eq!(manager.plugin("p1").unwrap().state, PluginState::Cleared);
        assert_eq!(manager.hooks.hook_count("workflow.post-phase"), 0);
        assert_eq!(manager.tools.count(), 0);
        assert_eq!(manager.steering.count(), 0);
    }

    #[tokio::test]
    async fn test_clear_unknown_plugin() {
        let manager = manager();
        assert!(matches!(manager.clear_plugin("nope"), Err(PluginError::Unknown(_))));
    }

    #[tokio::test]
    async fn test_reload_plugin() {
        let manager = manager();
        let resolver = resolver_for("p1");

        manager.load_plugin(manifest_with_contributions("p1"), &resolver).unwrap();
        manager.reload_plugin("p1", &resolver).unwrap();

        assert_eq!(manager.plugin("p1").unwrap().state, PluginState::Active);
        assert_eq!(manager.hooks.hook_count("workflow.post-phase"), 1);

        let execution =
            manager.tools.execute("p1-echo", json!({"x": 1}), &ToolContext::new()).unwrap();
        assert!(execution.success);
    }
}
