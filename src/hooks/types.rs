//! Core hook types.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::workflow::Phase;

use super::conditions::HookCondition;

/// How a hook's returned data is folded into the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HookType {
    /// Adjusts fields of the payload; returned keys overlay the running data.
    Filter,
    /// Performs a side effect; returned keys overlay the running data.
    Action,
    /// Checks the payload; returned keys overlay the running data.
    Validator,
    /// Replaces the running data wholesale.
    Transformer,
    /// Watches the payload; returned keys overlay the running data.
    Observer,
}

impl HookType {
    /// Get the display name for this hook type.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Filter => "Filter",
            Self::Action => "Action",
            Self::Validator => "Validator",
            Self::Transformer => "Transformer",
            Self::Observer => "Observer",
        }
    }
}

impl std::fmt::Display for HookType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A plugin-supplied hook callback.
///
/// Receives the running pipeline data and the execution context. Returning
/// `Err` marks the hook failed; the pipeline records the failure and
/// continues. Handlers must not block indefinitely - plugin code is trusted
/// but unsandboxed, so hosts wrap handlers in a timeout.
pub type HookHandler =
    Arc<dyn Fn(&Value, &HookContext) -> anyhow::Result<HookOutcome> + Send + Sync>;

/// A hook registration owned by a plugin.
#[derive(Clone)]
pub struct HookRegistration {
    /// Owning plugin id.
    pub plugin_id: String,
    /// Hook name, unique per plugin.
    pub name: String,
    /// Data-flow type of the hook.
    pub hook_type: HookType,
    /// Extension point the hook is bound to.
    pub extension_point: String,
    /// Execution priority; higher runs first.
    pub priority: i32,
    /// Conditions gating execution; an empty list always matches.
    pub conditions: Vec<HookCondition>,
    /// The callback.
    pub handler: HookHandler,
}

impl HookRegistration {
    /// Create a registration with default priority and no conditions.
    pub fn new(
        plugin_id: impl Into<String>,
        name: impl Into<String>,
        hook_type: HookType,
        extension_point: impl Into<String>,
        handler: HookHandler,
    ) -> Self {
        Self {
            plugin_id: plugin_id.into(),
            name: name.into(),
            hook_type,
            extension_point: extension_point.into(),
            priority: 0,
            conditions: Vec::new(),
            handler,
        }
    }

    /// Set the priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Add a gating condition.
    pub fn with_condition(mut self, condition: HookCondition) -> Self {
        self.conditions.push(condition);
        self
    }
}

impl std::fmt::Debug for HookRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookRegistration")
            .field("plugin_id", &self.plugin_id)
            .field("name", &self.name)
            .field("hook_type", &self.hook_type)
            .field("extension_point", &self.extension_point)
            .field("priority", &self.priority)
            .field("conditions", &self.conditions)
            .finish_non_exhaustive()
    }
}

/// Context passed to every hook in a pipeline invocation.
#[derive(Debug, Clone)]
pub struct HookContext {
    /// Extension point being executed.
    pub extension_point: String,
    /// Workflow phase the invocation relates to, if any.
    pub phase: Option<Phase>,
    /// The initial payload the pipeline was invoked with.
    pub data: Value,
    /// Caller-supplied metadata.
    pub metadata: HashMap<String, Value>,
}

impl HookContext {
    /// Create a context for an extension point.
    pub fn new(extension_point: impl Into<String>, data: Value) -> Self {
        Self {
            extension_point: extension_point.into(),
            phase: None,
            data,
            metadata: HashMap::new(),
        }
    }

    /// Attach a workflow phase.
    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.phase = Some(phase);
        self
    }

    /// Attach a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// What a single hook returned.
#[derive(Debug, Clone, Default)]
pub struct HookOutcome {
    /// Data to fold into the pipeline, per the hook's type.
    pub data: Option<Value>,
    /// Halt the pipeline after this hook.
    pub stop_propagation: bool,
    /// Hook-supplied metadata, merged into the execution record.
    pub metadata: HashMap<String, Value>,
}

impl HookOutcome {
    /// An outcome that leaves the running data untouched.
    pub fn unchanged() -> Self {
        Self::default()
    }

    /// An outcome carrying data to fold into the pipeline.
    pub fn update(data: Value) -> Self {
        Self { data: Some(data), stop_propagation: false, metadata: HashMap::new() }
    }

    /// Halt the pipeline after this hook.
    pub fn stop(mut self) -> Self {
        self.stop_propagation = true;
        self
    }
}

/// A hook that failed during pipeline execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookFailure {
    /// Owning plugin id.
    pub plugin_id: String,
    /// Hook name.
    pub hook_name: String,
    /// Error message.
    pub message: String,
}

/// Result of executing a hook pipeline.
#[derive(Debug, Clone)]
pub struct HookExecution {
    /// Extension point that was executed.
    pub extension_point: String,
    /// False if any hook failed.
    pub success: bool,
    /// The final pipeline data after all merges.
    pub data: Value,
    /// Number of hooks whose handlers ran.
    pub executed: usize,
    /// Number of hooks skipped by their conditions.
    pub skipped: usize,
    /// Failures recorded along the way.
    pub failures: Vec<HookFailure>,
    /// Name of the hook that stopped propagation, if any.
    pub stopped_by: Option<String>,
    /// Metadata merged from hook outcomes.
    pub metadata: HashMap<String, Value>,
}
