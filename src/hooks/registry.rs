//! Hook registry and pipeline execution.
//!
//! Registrations are kept per extension point, sorted by descending
//! priority with insertion order breaking ties. Execution is strictly
//! sequential in that order - an external contract, since hooks can have
//! side effects that later hooks or the caller depend on.

use std::collections::HashMap;

use parking_lot::RwLock;
use serde_json::Value;

use super::types::{HookContext, HookExecution, HookFailure, HookRegistration, HookType};

/// Per-plugin execution counters for one extension point.
///
/// In-memory only; counters reset with the process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HookStats {
    /// Handler invocations.
    pub executions: u64,
    /// Handler failures.
    pub errors: u64,
}

#[derive(Clone)]
struct HookEntry {
    registration: HookRegistration,
    seq: u64,
}

#[derive(Default)]
struct Inner {
    /// Registrations per extension point, kept sorted.
    hooks: HashMap<String, Vec<HookEntry>>,
    /// Monotonic insertion counter for deterministic tie-breaking.
    next_seq: u64,
}

/// Stores hook registrations and executes pipelines against them.
///
/// Mutated only by the plugin manager; read by everyone else. Plugin
/// load/unload is expected to happen while no pipelines are executing.
#[derive(Default)]
pub struct HookRegistry {
    inner: RwLock<Inner>,
    stats: RwLock<HashMap<String, HashMap<String, HookStats>>>,
}

impl HookRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hook.
    ///
    /// Re-registering the same `(plugin_id, name)` under the same extension
    /// point replaces the existing entry in place: the new priority and
    /// handler apply, the original insertion order is retained for
    /// tie-breaking.
    pub fn register(&self, registration: HookRegistration) {
        let mut inner = self.inner.write();

        let seq = inner.next_seq;
        inner.next_seq += 1;

        let entries = inner.hooks.entry(registration.extension_point.clone()).or_default();

        let existing = entries.iter_mut().find(|e| {
            e.registration.plugin_id == registration.plugin_id
                && e.registration.name == registration.name
        });

        match existing {
            Some(entry) => {
                tracing::warn!(
                    plugin = %registration.plugin_id,
                    hook = %registration.name,
                    point = %registration.extension_point,
                    "Replacing existing hook registration"
                );
                entry.registration = registration;
            }
            None => entries.push(HookEntry { registration, seq }),
        }

        entries.sort_by(|a, b| {
            b.registration.priority.cmp(&a.registration.priority).then(a.seq.cmp(&b.seq))
        });
    }

    /// Remove a hook by owner and name. Warns and no-ops when absent.
    pub fn unregister(&self, plugin_id: &str, name: &str) {
        let mut inner = self.inner.write();
        let mut removed = false;

        for entries in inner.hooks.values_mut() {
            let before = entries.len();
            entries
                .retain(|e| !(e.registration.plugin_id == plugin_id && e.registration.name == name));
            removed |= entries.len() < before;
        }

        if !removed {
            tracing::warn!(plugin = %plugin_id, hook = %name, "Unregister of unknown hook");
        }
    }

    /// Remove every registration owned by a plugin, returning the count.
    pub fn clear_plugin(&self, plugin_id: &str) -> usize {
        let mut inner = self.inner.write();
        let mut removed = 0;

        for entries in inner.hooks.values_mut() {
            let before = entries.len();
            entries.retain(|e| e.registration.plugin_id != plugin_id);
            removed += before - entries.len();
        }
        inner.hooks.retain(|_, entries| !entries.is_empty());

        removed
    }

    /// Number of hooks registered for an extension point.
    pub fn hook_count(&self, extension_point: &str) -> usize {
        self.inner.read().hooks.get(extension_point).map_or(0, Vec::len)
    }

    /// Extension points with at least one registration, sorted.
    pub fn extension_points(&self) -> Vec<String> {
        let mut points: Vec<String> = self.inner.read().hooks.keys().cloned().collect();
        points.sort();
        points
    }

    /// Execute the hook pipeline for an extension point.
    ///
    /// With no hooks registered this returns success with the context data
    /// unchanged. Otherwise hooks run sequentially in priority order; each
    /// hook's conditions are matched against the running data and
    /// non-matching hooks are skipped. A failing handler is recorded and the
    /// pipeline continues. Data merging is type-dependent: a
    /// [`HookType::Transformer`] replaces the running data wholesale, every
    /// other type shallow-overlays returned object keys onto it. A result
    /// with `stop_propagation` halts iteration immediately.
    pub fn execute(&self, extension_point: &str, context: &HookContext) -> HookExecution {
        let entries: Vec<HookEntry> =
            self.inner.read().hooks.get(extension_point).cloned().unwrap_or_default();

        let mut data = context.data.clone();
        let mut failures = Vec::new();
        let mut metadata = HashMap::new();
        let mut executed = 0;
        let mut skipped = 0;
        let mut stopped_by = None;

        for entry in &entries {
            let hook = &entry.registration;

            if !hook.conditions.iter().all(|c| c.matches(&data)) {
                tracing::debug!(
                    plugin = %hook.plugin_id,
                    hook = %hook.name,
                    "Skipping hook (conditions not met)"
                );
                skipped += 1;
                continue;
            }

            executed += 1;

            match (hook.handler)(&data, context) {
                Ok(outcome) => {
                    self.record(extension_point, &hook.plugin_id, false);

                    if let Some(returned) = outcome.data {
                        merge(&mut data, returned, hook.hook_type, hook);
                    }
                    metadata.extend(outcome.metadata);

                    if outcome.stop_propagation {
                        tracing::debug!(
                            plugin = %hook.plugin_id,
                            hook = %hook.name,
                            "Hook stopped propagation"
                        );
                        stopped_by = Some(hook.name.clone());
                        break;
                    }
                }
                Err(e) => {
                    self.record(extension_point, &hook.plugin_id, true);
                    tracing::warn!(
                        plugin = %hook.plugin_id,
                        hook = %hook.name,
                        point = %extension_point,
                        error = %e,
                        "Hook handler failed"
                    );
                    failures.push(HookFailure {
                        plugin_id: hook.plugin_id.clone(),
                        hook_name: hook.name.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        HookExecution {
            extension_point: extension_point.to_string(),
            success: failures.is_empty(),
            data,
            executed,
            skipped,
            failures,
            stopped_by,
            metadata,
        }
    }

    /// Per-plugin execution statistics for an extension point.
    pub fn statistics(&self, extension_point: &str) -> HashMap<String, HookStats> {
        self.stats.read().get(extension_point).cloned().unwrap_or_default()
    }

    fn record(&self, extension_point: &str, plugin_id: &str, error: bool) {
        let mut stats = self.stats.write();
        let entry = stats
            .entry(extension_point.to_string())
            .or_default()
            .entry(plugin_id.to_string())
            .or_default();
        entry.executions += 1;
        if error {
            entry.errors += 1;
        }
    }
}

/// Fold a hook's returned data into the running pipeline data.
fn merge(running: &mut Value, returned: Value, hook_type: HookType, hook: &HookRegistration) {
    if hook_type == HookType::Transformer {
        *running = returned;
        return;
    }

    // Replace semantics are reserved to Transformer hooks; everything else
    // overlays object keys.
    if let Value::Object(overlay) = returned {
        if let Value::Object(base) = running {
            for (key, value) in overlay {
                base.insert(key, value);
            }
        } else if running.is_null() {
            *running = Value::Object(overlay);
        } else {
            tracing::warn!(
                plugin = %hook.plugin_id,
                hook = %hook.name,
                "Ignoring overlay onto non-object pipeline data"
            );
        }
    } else {
        tracing::warn!(
            plugin = %hook.plugin_id,
            hook = %hook.name,
            "Ignoring non-object data from overlay hook"
        );
    }
}
