//! Hook system: extension points, condition gating, and pipeline execution.
//!
//! Plugins register hooks against named extension points. Executing a point
//! runs the matching hooks sequentially in priority order, folding each
//! hook's returned data into a running payload. A failing hook never aborts
//! the pipeline; it is recorded and execution continues.

mod conditions;
mod registry;
mod types;

pub use conditions::{ConditionOperator, HookCondition};
pub use registry::{HookRegistry, HookStats};
pub use types::{
    HookContext, HookExecution, HookFailure, HookHandler, HookOutcome, HookRegistration, HookType,
};
