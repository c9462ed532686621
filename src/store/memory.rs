//! In-memory state store for tests and ephemeral hosts.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::workflow::WorkflowState;

use super::{StateStore, StoreError, StoreResult};

/// Keeps records in a process-local map. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryStateStore {
    records: RwLock<HashMap<String, WorkflowState>>,
    fail_saves: RwLock<bool>,
}

impl MemoryStateStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `save` fail, for exercising persistence
    /// failure paths.
    pub fn set_fail_saves(&self, fail: bool) {
        *self.fail_saves.write() = fail;
    }

    /// Number of stored records.
    pub fn count(&self) -> usize {
        self.records.read().len()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn load(&self, project_path: &str) -> StoreResult<WorkflowState> {
        self.records
            .read()
            .get(project_path)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(project_path.to_string()))
    }

    async fn save(&self, state: &WorkflowState) -> StoreResult<()> {
        if *self.fail_saves.read() {
            return Err(StoreError::Io(std::io::Error::other("simulated save failure")));
        }
        self.records.write().insert(state.project_path.clone(), state.clone());
        Ok(())
    }

    async fn exists(&self, project_path: &str) -> bool {
        self.records.read().contains_key(project_path)
    }
}
