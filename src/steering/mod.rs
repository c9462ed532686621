//! Steering system: conditionally-applicable guidance documents.
//!
//! Plugins contribute templated guidance documents with an applicability
//! mode. Resolution filters by mode and file patterns, renders templates
//! against variable bindings, and returns results in priority order.

mod registry;
mod template;
mod types;

pub use registry::{SteeringError, SteeringRegistry, SteeringResult};
pub use template::{pattern_matches, render};
pub use types::{
    RenderedSteering, SteeringContext, SteeringDocument, SteeringMode, SteeringVariable,
};
