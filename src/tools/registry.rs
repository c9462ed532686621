//! Tool registry: registration, discovery, and execution.

use std::collections::HashMap;
use std::time::Instant;

use chrono::Utc;
use parking_lot::RwLock;
use serde_json::Value;
use thiserror::Error;

use super::schema;
use super::types::{ToolContext, ToolDefinition, ToolExecution, ToolInfo, ToolStats};

/// Result type for tool operations.
pub type ToolResult<T> = Result<T, ToolError>;

/// Errors surfaced to the caller of a tool invocation.
#[derive(Debug, Error)]
pub enum ToolError {
    /// No tool registered under the name.
    #[error("Tool not found: {0}")]
    NotFound(String),

    /// The input does not satisfy the tool's input schema.
    #[error("Input for tool '{tool}' violates its schema: {}", .violations.join("; "))]
    SchemaViolation { tool: String, violations: Vec<String> },
}

/// Stores registered tools and executes them.
///
/// Tool names are a global key; re-registration under the same name
/// overwrites. Mutated only by the plugin manager.
#[derive(Default)]
pub struct ToolRegistry {
    tools: RwLock<HashMap<String, ToolDefinition>>,
    stats: RwLock<HashMap<String, ToolStats>>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, overwriting any existing tool of the same name.
    pub fn register(&self, tool: ToolDefinition) {
        let mut tools = self.tools.write();

        if let Some(previous) = tools.get(&tool.name) {
            tracing::info!(
                tool = %tool.name,
                previous_owner = %previous.plugin_id,
                new_owner = %tool.plugin_id,
                "Overwriting existing tool registration"
            );
        }

        tools.insert(tool.name.clone(), tool);
    }

    /// Remove a tool by name. Returns whether it existed.
    pub fn unregister(&self, name: &str) -> bool {
        self.tools.write().remove(name).is_some()
    }

    /// Remove every tool owned by a plugin, returning the count.
    pub fn clear_plugin(&self, plugin_id: &str) -> usize {
        let mut tools = self.tools.write();
        let before = tools.len();
        tools.retain(|_, tool| tool.plugin_id != plugin_id);
        before - tools.len()
    }

    /// Execute a tool by name.
    ///
    /// The input is validated against the tool's input schema before the
    /// handler runs. Handler errors are wrapped into a failed
    /// [`ToolExecution`]; only lookup and validation failures are `Err`.
    pub fn execute(&self, name: &str, input: Value, context: &ToolContext) -> ToolResult<ToolExecution> {
        let tool = self
            .tools
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;

        let violations = schema::validate(&tool.input_schema, &input);
        if !violations.is_empty() {
            return Err(ToolError::SchemaViolation { tool: name.to_string(), violations });
        }

        let started = Instant::now();
        let outcome = (tool.handler)(input, context);
        let duration_ms = started.elapsed().as_millis() as u64;

        let execution = match outcome {
            Ok(output) => ToolExecution::success(name, output, duration_ms),
            Err(e) => {
                tracing::warn!(
                    tool = %name,
                    plugin = %tool.plugin_id,
                    error = %e,
                    "Tool handler failed"
                );
                ToolExecution::failure(name, e.to_string(), duration_ms)
            }
        };

        self.record(name, &execution);
        Ok(execution)
    }

    /// Look up a tool's discovery projection.
    pub fn get(&self, name: &str) -> Option<ToolInfo> {
        self.tools.read().get(name).map(ToolInfo::from)
    }

    /// All registered tools, sorted by name.
    pub fn all_tools(&self) -> Vec<ToolInfo> {
        let mut tools: Vec<ToolInfo> = self.tools.read().values().map(ToolInfo::from).collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }

    /// Registered tools in a category, sorted by name.
    pub fn tools_by_category(&self, category: &str) -> Vec<ToolInfo> {
        let mut tools: Vec<ToolInfo> = self
            .tools
            .read()
            .values()
            .filter(|t| t.category == category)
            .map(ToolInfo::from)
            .collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }

    /// Invocation statistics for a tool.
    pub fn statistics(&self, name: &str) -> Option<ToolStats> {
        self.stats.read().get(name).cloned()
    }

    /// Number of registered tools.
    pub fn count(&self) -> usize {
        self.tools.read().len()
    }

    fn record(&self, name: &str, execution: &ToolExecution) {
        let mut stats = self.stats.write();
        let entry = stats.entry(name.to_string()).or_default();
        entry.invocations += 1;
        if !execution.success {
            entry.failures += 1;
        }
        entry.total_duration_ms += execution.duration_ms;
        entry.last_invoked = Some(Utc::now());
    }
}
