//! Filesystem-backed state store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::workflow::WorkflowState;

use super::{StateStore, StoreError, StoreResult};

/// One JSON record per project path, stored under a root directory.
///
/// File names are the percent-encoded project path, so arbitrary paths map
/// to flat, unambiguous keys. Writes go to a temp file in the same
/// directory and are renamed into place.
pub struct FileStateStore {
    root: PathBuf,
}

impl FileStateStore {
    /// Create a store rooted at the given directory, creating it if needed.
    pub fn new(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// The store's root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, project_path: &str) -> PathBuf {
        self.root.join(format!("{}.json", urlencoding::encode(project_path)))
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn load(&self, project_path: &str) -> StoreResult<WorkflowState> {
        let path = self.record_path(project_path);

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(project_path.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        Ok(serde_json::from_str(&content)?)
    }

    async fn save(&self, state: &WorkflowState) -> StoreResult<()> {
        let path = self.record_path(&state.project_path);
        let tmp = path.with_extension("json.tmp");

        let content = serde_json::to_string_pretty(state)?;

        // Same-directory rename keeps the swap atomic.
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &path).await?;

        Ok(())
    }

    async fn exists(&self, project_path: &str) -> bool {
        self.record_path(project_path).exists()
    }
}
