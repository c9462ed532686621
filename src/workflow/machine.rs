//! The phase-gated workflow state machine.
//!
//! Owns transition legality, approval gates, and rollback for per-project
//! workflow state. Every mutating operation persists the whole record
//! through the injected store and reports a persistence failure as an
//! operation failure.

use std::sync::Arc;

use serde_json::json;

use crate::hooks::{HookContext, HookRegistry};
use crate::store::{StateStore, StoreError};

use super::error::{WorkflowError, WorkflowResult};
use super::phase::{ApprovalStatus, Phase, PhaseApproval};
use super::state::{WorkflowState, WorkflowStatus};

/// Extension point fired before a phase transition mutates state.
pub const PRE_PHASE_HOOK: &str = "workflow.pre-phase";

/// Extension point fired after a phase transition has mutated state.
pub const POST_PHASE_HOOK: &str = "workflow.post-phase";

/// Enforces ordering and approval invariants over workflow state.
///
/// Operations act on an explicit state value owned by the caller; the
/// machine holds no per-project state of its own, so distinct projects are
/// fully independent. Two mutations of the same project's state must be
/// serialized by the caller.
pub struct WorkflowStateMachine {
    store: Arc<dyn StateStore>,
    hooks: Arc<HookRegistry>,
}

impl WorkflowStateMachine {
    /// Create a machine over a store and hook registry.
    pub fn new(store: Arc<dyn StateStore>, hooks: Arc<HookRegistry>) -> Self {
        Self { store, hooks }
    }

    /// Initialize a workflow for a project path.
    ///
    /// Fails with [`WorkflowError::AlreadyInitialized`] if a record exists.
    pub async fn initialize(&self, project_path: &str) -> WorkflowResult<WorkflowState> {
        if self.store.exists(project_path).await {
            return Err(WorkflowError::AlreadyInitialized(project_path.to_string()));
        }

        let state = WorkflowState::new(project_path);
        self.store.save(&state).await?;

        tracing::info!(project = %project_path, "Initialized workflow");
        Ok(state)
    }

    /// Load the persisted state for a project path.
    pub async fn load(&self, project_path: &str) -> WorkflowResult<WorkflowState> {
        match self.store.load(project_path).await {
            Ok(state) => Ok(state),
            Err(StoreError::NotFound(path)) => Err(WorkflowError::NotInitialized(path)),
            Err(e) => Err(WorkflowError::Persistence(e)),
        }
    }

    /// Approve the current phase.
    ///
    /// `phase` must equal the state's current phase. Approving the final
    /// phase completes the workflow.
    pub async fn approve_phase(
        &self,
        state: &mut WorkflowState,
        phase: Phase,
    ) -> WorkflowResult<()> {
        if phase != state.current_phase {
            return Err(WorkflowError::PhaseMismatch {
                current: state.current_phase,
                requested: phase,
            });
        }

        let now = chrono::Utc::now();
        let approval = state.phase_mut(phase);
        approval.status = ApprovalStatus::Approved;
        approval.feedback = None;
        approval.completed_at = Some(now);

        if phase.is_final() {
            state.status = WorkflowStatus::Completed;
        }
        state.updated_at = now;

        self.store.save(state).await?;
        tracing::info!(project = %state.project_path, phase = %phase, "Phase approved");
        Ok(())
    }

    /// Reject the current phase with feedback.
    ///
    /// The workflow stays on the phase; rejection never advances or
    /// rewinds. Rejecting a non-current phase is a mismatch, since earlier
    /// phases are approved by construction and later ones have not started.
    pub async fn reject_phase(
        &self,
        state: &mut WorkflowState,
        phase: Phase,
        feedback: impl Into<String>,
    ) -> WorkflowResult<()> {
        if phase != state.current_phase {
            return Err(WorkflowError::PhaseMismatch {
                current: state.current_phase,
                requested: phase,
            });
        }

        let feedback = feedback.into();
        let approval = state.phase_mut(phase);
        approval.status = ApprovalStatus::Rejected;
        approval.feedback = Some(feedback);
        state.updated_at = chrono::Utc::now();

        self.store.save(state).await?;
        tracing::info!(project = %state.project_path, phase = %phase, "Phase rejected");
        Ok(())
    }

    /// Advance the workflow to the next phase.
    ///
    /// `target` must be the immediate successor of the current phase and
    /// the current phase must be approved. Fires the pre-phase hook before
    /// mutating and the post-phase hook after; hook failures are logged and
    /// do not veto the transition.
    pub async fn progress_to_phase(
        &self,
        state: &mut WorkflowState,
        target: Phase,
    ) -> WorkflowResult<()> {
        let from = state.current_phase;

        if from.next() != Some(target) {
            return Err(WorkflowError::InvalidTransition {
                from,
                to: target,
                reason: "target is not the immediate successor".to_string(),
            });
        }
        if !state.is_phase_approved(from) {
            return Err(WorkflowError::InvalidTransition {
                from,
                to: target,
                reason: format!("current phase '{from}' is not approved"),
            });
        }

        self.fire_transition_hook(PRE_PHASE_HOOK, state, from, target);

        state.current_phase = target;
        *state.phase_mut(target) = PhaseApproval::in_progress();
        state.updated_at = chrono::Utc::now();

        self.fire_transition_hook(POST_PHASE_HOOK, state, from, target);

        self.store.save(state).await?;
        tracing::info!(project = %state.project_path, from = %from, to = %target, "Workflow advanced");
        Ok(())
    }

    /// Roll the workflow back to an earlier phase.
    ///
    /// `target` must strictly precede the current phase. The target is
    /// reset to in-progress; every phase after it up to and including the
    /// old current phase returns to pending, so the gate invariant holds
    /// for the rewound state. The only backward-moving operation.
    pub async fn rollback_to_phase(
        &self,
        state: &mut WorkflowState,
        target: Phase,
        reason: &str,
    ) -> WorkflowResult<()> {
        let current = state.current_phase;

        if target >= current {
            return Err(WorkflowError::InvalidRollbackTarget { current, target });
        }

        *state.phase_mut(target) = PhaseApproval::in_progress();
        for phase in Phase::ALL {
            if phase > target && phase <= current {
                *state.phase_mut(phase) = PhaseApproval::pending();
            }
        }

        state.current_phase = target;
        state.status = WorkflowStatus::InProgress;
        state.updated_at = chrono::Utc::now();

        self.store.save(state).await?;
        tracing::info!(
            project = %state.project_path,
            from = %current,
            to = %target,
            reason = %reason,
            "Rolled back workflow"
        );
        Ok(())
    }

    fn fire_transition_hook(&self, point: &str, state: &WorkflowState, from: Phase, to: Phase) {
        let context = HookContext::new(
            point,
            json!({
                "project_path": state.project_path,
                "from_phase": from,
                "to_phase": to,
            }),
        )
        .with_phase(to);

        let execution = self.hooks.execute(point, &context);
        if !execution.success {
            tracing::warn!(
                project = %state.project_path,
                point = %point,
                failures = execution.failures.len(),
                "Transition hook pipeline reported failures"
            );
        }
    }
}
