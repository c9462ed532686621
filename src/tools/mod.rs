//! Tool system: named callable operations registered by plugins.
//!
//! Tools are invoked on demand, independent of workflow phase. The registry
//! validates inputs against each tool's declared schema, wraps handler
//! errors into failure results, and tracks per-tool invocation statistics.

mod registry;
mod schema;
mod types;

pub use registry::{ToolError, ToolRegistry, ToolResult};
pub use schema::validate as validate_input;
pub use types::{
    ToolContext, ToolDefinition, ToolExecution, ToolHandler, ToolInfo, ToolStats,
};
