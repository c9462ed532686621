//! Workflow state machine error types.

use thiserror::Error;

use crate::store::StoreError;

use super::phase::Phase;

/// Result type for workflow operations.
pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Errors that can occur during workflow operations.
///
/// These indicate caller misuse and are surfaced verbatim; the engine never
/// retries them.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// A workflow already exists for the project path.
    #[error("Workflow already initialized for '{0}'")]
    AlreadyInitialized(String),

    /// No workflow exists for the project path.
    #[error("No workflow initialized for '{0}'")]
    NotInitialized(String),

    /// The requested phase is not the current phase.
    #[error("Phase mismatch: current phase is '{current}', requested '{requested}'")]
    PhaseMismatch { current: Phase, requested: Phase },

    /// The requested transition is not legal.
    #[error("Invalid transition from '{from}' to '{to}': {reason}")]
    InvalidTransition { from: Phase, to: Phase, reason: String },

    /// The rollback target does not precede the current phase.
    #[error("Invalid rollback target '{target}': must precede current phase '{current}'")]
    InvalidRollbackTarget { current: Phase, target: Phase },

    /// Persisting the mutated state failed; the caller must not assume
    /// durability.
    #[error("Failed to persist workflow state: {0}")]
    Persistence(#[from] StoreError),
}
