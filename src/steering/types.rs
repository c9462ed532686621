//! Core steering document types.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a steering document becomes applicable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SteeringMode {
    /// Included in every resolution.
    Always,
    /// Included when a pattern matches the current file.
    Conditional,
    /// Never included automatically; reachable only by explicit lookup.
    Manual,
}

impl std::fmt::Display for SteeringMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Always => "always",
            Self::Conditional => "conditional",
            Self::Manual => "manual",
        };
        write!(f, "{s}")
    }
}

/// A variable a steering template expects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SteeringVariable {
    /// Placeholder name.
    pub name: String,

    /// Declared type, informational.
    #[serde(rename = "type", default)]
    pub var_type: String,

    /// Whether the variable must be bound for the document to render.
    #[serde(default)]
    pub required: bool,

    /// Fallback used when the context leaves the variable unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl SteeringVariable {
    /// An optional variable with no default.
    pub fn optional(name: impl Into<String>) -> Self {
        Self { name: name.into(), var_type: "string".to_string(), required: false, default: None }
    }

    /// A required variable with no default.
    pub fn required(name: impl Into<String>) -> Self {
        Self { name: name.into(), var_type: "string".to_string(), required: true, default: None }
    }

    /// Set the default value.
    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }
}

/// A guidance document contributed by a plugin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SteeringDocument {
    /// Owning plugin id.
    pub plugin_id: String,
    /// Document name, unique per plugin.
    pub name: String,
    /// Topic label used by callers for conflict resolution.
    #[serde(rename = "type", default)]
    pub doc_type: String,
    /// Applicability mode.
    pub mode: SteeringMode,
    /// Conflict-resolution priority; higher wins.
    #[serde(default)]
    pub priority: i32,
    /// Glob patterns matched against the current file (conditional mode).
    #[serde(default)]
    pub patterns: Vec<String>,
    /// Template body with `{{name}}` placeholders.
    pub template: String,
    /// Variables the template expects.
    #[serde(default)]
    pub variables: Vec<SteeringVariable>,
}

impl SteeringDocument {
    /// Create an always-applicable document.
    pub fn new(
        plugin_id: impl Into<String>,
        name: impl Into<String>,
        template: impl Into<String>,
    ) -> Self {
        Self {
            plugin_id: plugin_id.into(),
            name: name.into(),
            doc_type: String::new(),
            mode: SteeringMode::Always,
            priority: 0,
            patterns: Vec::new(),
            template: template.into(),
            variables: Vec::new(),
        }
    }

    /// Set the applicability mode.
    pub fn with_mode(mut self, mode: SteeringMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the topic label.
    pub fn with_doc_type(mut self, doc_type: impl Into<String>) -> Self {
        self.doc_type = doc_type.into();
        self
    }

    /// Set the priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Add a file pattern.
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.patterns.push(pattern.into());
        self
    }

    /// Add an expected variable.
    pub fn with_variable(mut self, variable: SteeringVariable) -> Self {
        self.variables.push(variable);
        self
    }
}

/// Context a steering resolution runs against.
#[derive(Debug, Clone, Default)]
pub struct SteeringContext {
    /// File the caller is currently working on.
    pub current_file: Option<String>,
    /// Variable bindings for template rendering.
    pub variables: HashMap<String, Value>,
}

impl SteeringContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the current file.
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.current_file = Some(file.into());
        self
    }

    /// Bind a variable.
    pub fn with_variable(mut self, name: impl Into<String>, value: Value) -> Self {
        self.variables.insert(name.into(), value);
        self
    }
}

/// A steering document rendered for delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedSteering {
    /// Owning plugin id.
    pub plugin_id: String,
    /// Document name.
    pub name: String,
    /// Topic label.
    pub doc_type: String,
    /// Conflict-resolution priority.
    pub priority: i32,
    /// Rendered content.
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_builder() {
        let doc = SteeringDocument::new("p1", "rust-style", "Prefer {{style}}.")
            .with_mode(SteeringMode::Conditional)
            .with_pattern("**/*.rs")
            .with_priority(10)
            .with_variable(SteeringVariable::required("style"));

        assert_eq!(doc.mode, SteeringMode::Conditional);
        assert_eq!(doc.patterns, vec!["**/*.rs".to_string()]);
        assert_eq!(doc.variables.len(), 1);
    }

    #[test]
    fn test_variable_builder() {
        let var = SteeringVariable::optional("lang").with_default(json!("rust"));
        assert!(!var.required);
        assert_eq!(var.default, Some(json!("rust")));
    }

    #[test]
    fn test_mode_serde() {
        let json = serde_json::to_string(&SteeringMode::Conditional).unwrap();
        assert_eq!(json, "\"conditional\"");
    }
}
