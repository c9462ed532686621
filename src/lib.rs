//! # Stagegate
//!
//! Phase-gated workflow engine with a plugin runtime.
//!
//! Stagegate is the orchestration core of a developer-workflow server: a
//! multi-phase approval state machine (Init -> Requirements -> Design ->
//! Tasks -> Implementation) combined with a plugin system that lets
//! external modules observe, filter, transform, and validate data at
//! defined extension points, register callable tools, and contribute
//! conditionally-applicable steering documents.
//!
//! ## Architecture
//!
//! - [`workflow`]: the per-project state machine enforcing approval gates
//! - [`hooks`]: priority-ordered hook pipelines at named extension points
//! - [`tools`]: named callable operations with schema-validated inputs
//! - [`steering`]: templated guidance documents resolved by mode and priority
//! - [`plugin`]: manifest discovery and lifecycle, wiring contributions
//!   into the three registries
//! - [`store`]: whole-record workflow state persistence
//!
//! Registries are plain owned values shared behind `Arc`; construct fresh
//! ones per host (or per test) and inject them - there are no ambient
//! singletons.
//!
//! ## Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//! use stagegate::hooks::HookRegistry;
//! use stagegate::store::MemoryStateStore;
//! use stagegate::workflow::{Phase, WorkflowStateMachine};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let hooks = Arc::new(HookRegistry::new());
//! let store = Arc::new(MemoryStateStore::new());
//! let machine = WorkflowStateMachine::new(store, hooks);
//!
//! let mut state = machine.initialize("/home/dev/project").await?;
//! machine.approve_phase(&mut state, Phase::Init).await?;
//! machine.progress_to_phase(&mut state, Phase::Requirements).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
// Allow common patterns that are intentional in this codebase
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::significant_drop_tightening)]
#![allow(clippy::map_unwrap_or)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::redundant_closure_for_method_calls)]

pub mod config;
pub mod hooks;
pub mod plugin;
pub mod steering;
pub mod store;
pub mod tools;
pub mod workflow;

pub use config::EngineConfig;
pub use hooks::{
    ConditionOperator, HookCondition, HookContext, HookExecution, HookOutcome, HookRegistration,
    HookRegistry, HookType,
};
pub use plugin::{
    DirectoryManifestSource, HandlerResolver, ManifestSource, PluginError, PluginManager,
    PluginManifest, PluginResult, StaticHandlerResolver,
};
pub use steering::{
    RenderedSteering, SteeringContext, SteeringDocument, SteeringMode, SteeringRegistry,
    SteeringVariable,
};
pub use store::{FileStateStore, MemoryStateStore, StateStore, StoreError};
pub use tools::{ToolContext, ToolDefinition, ToolExecution, ToolInfo, ToolRegistry};
pub use workflow::{
    ApprovalStatus, Phase, WorkflowError, WorkflowState, WorkflowStateMachine, WorkflowStatus,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name
pub const ENGINE_NAME: &str = "stagegate";
