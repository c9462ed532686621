//! Per-project workflow state.
//!
//! A `WorkflowState` is the whole persisted record for one project path.
//! It is owned by the caller, mutated only through the state machine, and
//! re-persisted after every mutation.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::phase::{ApprovalStatus, Phase, PhaseApproval};

/// Overall status of a workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    /// At least one phase remains unapproved.
    InProgress,
    /// The final phase has been approved.
    Completed,
}

/// The persisted workflow record for one project path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowState {
    /// Project path; identity of the record.
    pub project_path: String,

    /// The phase the workflow currently sits in.
    pub current_phase: Phase,

    /// Approval record per phase. Always holds an entry for every phase.
    pub phases: BTreeMap<Phase, PhaseApproval>,

    /// Overall workflow status.
    pub status: WorkflowStatus,

    /// When the workflow was first initialized.
    pub created_at: DateTime<Utc>,

    /// When the record was last mutated.
    pub updated_at: DateTime<Utc>,
}

impl WorkflowState {
    /// Create a fresh workflow at the Init phase.
    pub fn new(project_path: impl Into<String>) -> Self {
        let now = Utc::now();
        let mut phases: BTreeMap<Phase, PhaseApproval> =
            Phase::ALL.iter().map(|p| (*p, PhaseApproval::pending())).collect();
        phases.insert(Phase::Init, PhaseApproval::in_progress());

        Self {
            project_path: project_path.into(),
            current_phase: Phase::Init,
            phases,
            status: WorkflowStatus::InProgress,
            created_at: now,
            updated_at: now,
        }
    }

    /// Approval record for a phase.
    pub fn phase(&self, phase: Phase) -> &PhaseApproval {
        // `new` seeds every phase and no operation removes entries.
        self.phases.get(&phase).unwrap_or_else(|| unreachable!("phase map is seeded for all phases"))
    }

    /// Mutable approval record for a phase.
    pub(crate) fn phase_mut(&mut self, phase: Phase) -> &mut PhaseApproval {
        self.phases.entry(phase).or_default()
    }

    /// Whether a phase has been approved.
    pub fn is_phase_approved(&self, phase: Phase) -> bool {
        self.phase(phase).is_approved()
    }

    /// Whether every phase preceding the current one is approved.
    ///
    /// Holds for every reachable state; exposed so callers and tests can
    /// assert it after restoring persisted records.
    pub fn gates_satisfied(&self) -> bool {
        Phase::ALL
            .iter()
            .take_while(|p| **p < self.current_phase)
            .all(|p| self.is_phase_approved(*p))
    }

    /// Derive progress metrics from the approval map.
    ///
    /// Purely derived; there are no hidden counters to drift out of sync.
    pub fn metrics(&self) -> WorkflowMetrics {
        let total_phases = Phase::ALL.len();
        let phases_completed =
            self.phases.values().filter(|a| a.status == ApprovalStatus::Approved).count();
        let completion_percent = (phases_completed as f64 / total_phases as f64) * 100.0;

        WorkflowMetrics {
            current_phase: self.current_phase,
            status: self.status,
            phases_completed,
            total_phases,
            completion_percent,
        }
    }
}

/// Progress metrics derived from a workflow state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkflowMetrics {
    /// The phase the workflow currently sits in.
    pub current_phase: Phase,

    /// Overall workflow status.
    pub status: WorkflowStatus,

    /// Number of approved phases.
    pub phases_completed: usize,

    /// Total number of phases.
    pub total_phases: usize,

    /// Completion percentage (0.0 - 100.0).
    pub completion_percent: f64,
}
