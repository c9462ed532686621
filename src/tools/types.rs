//! Core tool types.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A plugin-supplied tool callback.
///
/// Receives the validated input and the execution context. Errors are
/// wrapped into a failed [`ToolExecution`] by the registry rather than
/// propagated to the caller.
pub type ToolHandler = Arc<dyn Fn(Value, &ToolContext) -> anyhow::Result<Value> + Send + Sync>;

/// A callable operation registered by a plugin.
///
/// Tool names are a global key: registering a second tool under the same
/// name overwrites the first.
#[derive(Clone)]
pub struct ToolDefinition {
    /// Owning plugin id.
    pub plugin_id: String,
    /// Globally unique tool name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Category for discovery grouping.
    pub category: String,
    /// JSON schema the input must satisfy (object subset: type,
    /// properties, required).
    pub input_schema: Value,
    /// Declared output schema, informational.
    pub output_schema: Option<Value>,
    /// Permission tags the host may enforce.
    pub permissions: Vec<String>,
    /// The callback.
    pub handler: ToolHandler,
}

impl ToolDefinition {
    /// Create a tool with an open object schema and no permissions.
    pub fn new(plugin_id: impl Into<String>, name: impl Into<String>, handler: ToolHandler) -> Self {
        Self {
            plugin_id: plugin_id.into(),
            name: name.into(),
            description: String::new(),
            category: "general".to_string(),
            input_schema: serde_json::json!({"type": "object"}),
            output_schema: None,
            permissions: Vec::new(),
            handler,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Set the input schema.
    pub fn with_input_schema(mut self, schema: Value) -> Self {
        self.input_schema = schema;
        self
    }

    /// Set the output schema.
    pub fn with_output_schema(mut self, schema: Value) -> Self {
        self.output_schema = Some(schema);
        self
    }

    /// Set the permission tags.
    pub fn with_permissions(mut self, permissions: Vec<String>) -> Self {
        self.permissions = permissions;
        self
    }
}

impl std::fmt::Debug for ToolDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolDefinition")
            .field("plugin_id", &self.plugin_id)
            .field("name", &self.name)
            .field("category", &self.category)
            .field("permissions", &self.permissions)
            .finish_non_exhaustive()
    }
}

/// Data-only projection of a registered tool, for discovery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    /// Owning plugin id.
    pub plugin_id: String,
    /// Tool name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Category.
    pub category: String,
    /// Input schema.
    pub input_schema: Value,
    /// Output schema.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<Value>,
    /// Permission tags.
    pub permissions: Vec<String>,
}

impl From<&ToolDefinition> for ToolInfo {
    fn from(tool: &ToolDefinition) -> Self {
        Self {
            plugin_id: tool.plugin_id.clone(),
            name: tool.name.clone(),
            description: tool.description.clone(),
            category: tool.category.clone(),
            input_schema: tool.input_schema.clone(),
            output_schema: tool.output_schema.clone(),
            permissions: tool.permissions.clone(),
        }
    }
}

/// Context passed to a tool invocation.
#[derive(Debug, Clone, Default)]
pub struct ToolContext {
    /// Project the invocation relates to, if any.
    pub project_path: Option<String>,
    /// Caller-supplied metadata.
    pub metadata: HashMap<String, Value>,
}

impl ToolContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a project path.
    pub fn with_project(mut self, project_path: impl Into<String>) -> Self {
        self.project_path = Some(project_path.into());
        self
    }

    /// Attach a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// Result of a tool invocation.
///
/// Handler errors land here as `success == false`; they never propagate as
/// exceptions to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolExecution {
    /// Tool name.
    pub tool: String,
    /// Whether the handler succeeded.
    pub success: bool,
    /// Handler output on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    /// Error message on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Wall-clock duration of the handler call.
    pub duration_ms: u64,
}

impl ToolExecution {
    /// A successful execution.
    pub fn success(tool: impl Into<String>, output: Value, duration_ms: u64) -> Self {
        Self { tool: tool.into(), success: true, output: Some(output), error: None, duration_ms }
    }

    /// A failed execution.
    pub fn failure(tool: impl Into<String>, error: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            tool: tool.into(),
            success: false,
            output: None,
            error: Some(error.into()),
            duration_ms,
        }
    }
}

/// Per-tool invocation counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolStats {
    /// Total invocations.
    pub invocations: u64,
    /// Failed invocations.
    pub failures: u64,
    /// Total handler time across invocations.
    pub total_duration_ms: u64,
    /// When the tool was last invoked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_invoked: Option<DateTime<Utc>>,
}

impl ToolStats {
    /// Mean handler latency, zero before the first invocation.
    pub fn avg_duration_ms(&self) -> u64 {
        if self.invocations == 0 {
            0
        } else {
            self.total_duration_ms / self.invocations
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_builder() {
        let handler: ToolHandler = Arc::new(|input, _| Ok(input));
        let tool = ToolDefinition::new("p1", "echo", handler)
            .with_description("Echoes its input")
            .with_category("debug")
            .with_permissions(vec!["read".to_string()]);

        assert_eq!(tool.name, "echo");
        assert_eq!(tool.category, "debug");
        assert_eq!(tool.input_schema, json!({"type": "object"}));
    }

    #[test]
    fn test_execution_constructors() {
        let ok = ToolExecution::success("t", json!({"r": 1}), 5);
        assert!(ok.success);
        assert_eq!(ok.output, Some(json!({"r": 1})));

        let err = ToolExecution::failure("t", "broke", 2);
        assert!(!err.success);
        assert_eq!(err.error.as_deref(), Some("broke"));
    }

    #[test]
    fn test_stats_avg() {
        let mut stats = ToolStats::default();
        assert_eq!(stats.avg_duration_ms(), 0);

        stats.invocations = 4;
        stats.total_duration_ms = 100;
        assert_eq!(stats.avg_duration_ms(), 25);
    }
}
