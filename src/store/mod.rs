//! Workflow state persistence.
//!
//! A key-value-by-path store with atomic whole-record writes. The engine
//! persists a full `WorkflowState` record after every mutation; there is no
//! finer-grained durability.

mod file;
mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::workflow::WorkflowState;

pub use file::FileStateStore;
pub use memory::MemoryStateStore;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record exists for the project path.
    #[error("No workflow state recorded for '{0}'")]
    NotFound(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Whole-record persistence for workflow state, keyed by project path.
///
/// Writes must be atomic (write-temp-then-rename or equivalent): a reader
/// never observes a partially-written record.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the record for a project path.
    ///
    /// Returns [`StoreError::NotFound`] for an uninitialized path.
    async fn load(&self, project_path: &str) -> StoreResult<WorkflowState>;

    /// Atomically write the whole record, replacing any previous one.
    async fn save(&self, state: &WorkflowState) -> StoreResult<()>;

    /// Whether a record exists for the project path.
    async fn exists(&self, project_path: &str) -> bool;
}
