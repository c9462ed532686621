//! Steering registry: applicability resolution and rendering.

use std::collections::HashMap;

use parking_lot::RwLock;
use thiserror::Error;

use super::template;
use super::types::{RenderedSteering, SteeringContext, SteeringDocument, SteeringMode};

/// Result type for steering operations.
pub type SteeringResult<T> = Result<T, SteeringError>;

/// Errors surfaced from explicit steering lookups.
///
/// Automatic resolution never returns these; a document that fails to
/// render there is logged and dropped in isolation.
#[derive(Debug, Error)]
pub enum SteeringError {
    /// No document stored under the key.
    #[error("Steering document not found: {plugin_id}/{name}")]
    DocumentNotFound { plugin_id: String, name: String },

    /// Required variables were unbound with no default.
    #[error("Missing required variables for '{name}': {}", .variables.join(", "))]
    MissingVariables { name: String, variables: Vec<String> },
}

/// Stores steering documents keyed by `(plugin_id, name)` and resolves the
/// applicable set for a context.
///
/// Mutated only by the plugin manager.
#[derive(Default)]
pub struct SteeringRegistry {
    documents: RwLock<HashMap<(String, String), SteeringDocument>>,
}

impl SteeringRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document, replacing any existing one under the same key.
    pub fn register(&self, doc: SteeringDocument) {
        let key = (doc.plugin_id.clone(), doc.name.clone());
        let mut documents = self.documents.write();

        if documents.contains_key(&key) {
            tracing::warn!(
                plugin = %doc.plugin_id,
                document = %doc.name,
                "Replacing existing steering document"
            );
        }

        documents.insert(key, doc);
    }

    /// Remove a document by key. Returns whether it existed.
    pub fn unregister(&self, plugin_id: &str, name: &str) -> bool {
        self.documents
            .write()
            .remove(&(plugin_id.to_string(), name.to_string()))
            .is_some()
    }

    /// Remove every document owned by a plugin, returning the count.
    pub fn clear_plugin(&self, plugin_id: &str) -> usize {
        let mut documents = self.documents.write();
        let before = documents.len();
        documents.retain(|(owner, _), _| owner != plugin_id);
        before - documents.len()
    }

    /// Resolve and render the documents applicable to a context.
    ///
    /// Always-mode documents are always included. Conditional documents are
    /// included only when one of their patterns matches the context's
    /// current file. Manual documents are never included here. A document
    /// whose required variables cannot be resolved is dropped in isolation
    /// and logged; the rest of the resolution is unaffected. Results are
    /// sorted by descending priority - callers resolve topic conflicts by
    /// taking the highest-priority entry.
    pub fn applicable_documents(&self, context: &SteeringContext) -> Vec<RenderedSteering> {
        let documents = self.documents.read();
        let mut rendered = Vec::new();

        for doc in documents.values() {
            let applicable = match doc.mode {
                SteeringMode::Always => true,
                SteeringMode::Conditional => context.current_file.as_deref().is_some_and(|file| {
                    doc.patterns.iter().any(|p| template::pattern_matches(p, file))
                }),
                SteeringMode::Manual => false,
            };
            if !applicable {
                continue;
            }

            match template::render(doc, context) {
                Ok(content) => rendered.push(RenderedSteering {
                    plugin_id: doc.plugin_id.clone(),
                    name: doc.name.clone(),
                    doc_type: doc.doc_type.clone(),
                    priority: doc.priority,
                    content,
                }),
                Err(missing) => {
                    tracing::warn!(
                        plugin = %doc.plugin_id,
                        document = %doc.name,
                        missing = ?missing,
                        "Dropping steering document with unresolved required variables"
                    );
                }
            }
        }

        rendered.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.name.cmp(&b.name)));
        rendered
    }

    /// Explicitly render one document, including manual-mode ones.
    ///
    /// Unlike automatic resolution this surfaces render failures.
    pub fn render_manual(
        &self,
        plugin_id: &str,
        name: &str,
        context: &SteeringContext,
    ) -> SteeringResult<RenderedSteering> {
        let documents = self.documents.read();
        let doc = documents
            .get(&(plugin_id.to_string(), name.to_string()))
            .ok_or_else(|| SteeringError::DocumentNotFound {
                plugin_id: plugin_id.to_string(),
                name: name.to_string(),
            })?;

        let content = template::render(doc, context).map_err(|variables| {
            SteeringError::MissingVariables { name: doc.name.clone(), variables }
        })?;

        Ok(RenderedSteering {
            plugin_id: doc.plugin_id.clone(),
            name: doc.name.clone(),
            doc_type: doc.doc_type.clone(),
            priority: doc.priority,
            content,
        })
    }

    /// Look up a stored document.
    pub fn document(&self, plugin_id: &str, name: &str) -> Option<SteeringDocument> {
        self.documents.read().get(&(plugin_id.to_string(), name.to_string())).cloned()
    }

    /// Number of stored documents.
    pub fn count(&self) -> usize {
        self.documents.read().len()
    }
}
