//! Workflow phases and per-phase approval records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stage of the five-step workflow.
///
/// Phases are totally ordered; a project moves forward one phase at a time
/// and only through an approval gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Project setup and scoping.
    Init,
    /// Requirements gathering.
    Requirements,
    /// Technical design.
    Design,
    /// Task breakdown.
    Tasks,
    /// Implementation work.
    Implementation,
}

impl Phase {
    /// All phases in workflow order.
    pub const ALL: [Self; 5] =
        [Self::Init, Self::Requirements, Self::Design, Self::Tasks, Self::Implementation];

    /// The immediate successor, if any.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Init => Some(Self::Requirements),
            Self::Requirements => Some(Self::Design),
            Self::Design => Some(Self::Tasks),
            Self::Tasks => Some(Self::Implementation),
            Self::Implementation => None,
        }
    }

    /// The immediate predecessor, if any.
    pub fn previous(self) -> Option<Self> {
        match self {
            Self::Init => None,
            Self::Requirements => Some(Self::Init),
            Self::Design => Some(Self::Requirements),
            Self::Tasks => Some(Self::Design),
            Self::Implementation => Some(Self::Tasks),
        }
    }

    /// Whether this is the final phase.
    pub fn is_final(self) -> bool {
        self == Self::Implementation
    }

    /// Stable lowercase identifier (matches the serialized form).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Requirements => "requirements",
            Self::Design => "design",
            Self::Tasks => "tasks",
            Self::Implementation => "implementation",
        }
    }

    /// Get the display name for this phase.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Init => "Init",
            Self::Requirements => "Requirements",
            Self::Design => "Design",
            Self::Tasks => "Tasks",
            Self::Implementation => "Implementation",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Approval status of a single phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    /// Not started.
    Pending,
    /// Currently being worked on.
    InProgress,
    /// Explicitly approved.
    Approved,
    /// Explicitly rejected; stays the current phase until reworked.
    Rejected,
}

impl Default for ApprovalStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        };
        write!(f, "{s}")
    }
}

/// Per-phase approval record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseApproval {
    /// Current status of the phase.
    pub status: ApprovalStatus,

    /// Reviewer feedback from the most recent rejection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,

    /// When work on the phase started.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    /// When the phase was approved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl PhaseApproval {
    /// A fresh, untouched phase record.
    pub fn pending() -> Self {
        Self { status: ApprovalStatus::Pending, feedback: None, started_at: None, completed_at: None }
    }

    /// A record for a phase that work has started on.
    pub fn in_progress() -> Self {
        Self {
            status: ApprovalStatus::InProgress,
            feedback: None,
            started_at: Some(Utc::now()),
            completed_at: None,
        }
    }

    /// Whether this phase has been approved.
    pub fn is_approved(&self) -> bool {
        self.status == ApprovalStatus::Approved
    }
}

impl Default for PhaseApproval {
    fn default() -> Self {
        Self::pending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_ordering() {
        assert!(Phase::Init < Phase::Requirements);
        assert!(Phase::Requirements < Phase::Design);
        assert!(Phase::Design < Phase::Tasks);
        assert!(Phase::Tasks < Phase::Implementation);
    }

    #[test]
    fn test_phase_next_chain() {
        assert_eq!(Phase::Init.next(), Some(Phase::Requirements));
        assert_eq!(Phase::Tasks.next(), Some(Phase::Implementation));
        assert_eq!(Phase::Implementation.next(), None);
    }

    #[test]
    fn test_phase_previous_chain() {
        assert_eq!(Phase::Init.previous(), None);
        assert_eq!(Phase::Implementation.previous(), Some(Phase::Tasks));
    }

    #[test]
    fn test_phase_serde_roundtrip() {
        for phase in Phase::ALL {
            let json = serde_json::to_string(&phase).unwrap();
            assert_eq!(json, format!("\"{}\"", phase.as_str()));
            let back: Phase = serde_json::from_str(&json).unwrap();
            assert_eq!(back, phase);
        }
    }

    #[test]
    fn test_approval_status_default() {
        assert_eq!(ApprovalStatus::default(), ApprovalStatus::Pending);
    }

    #[test]
    fn test_phase_approval_in_progress() {
        let approval = PhaseApproval::in_progress();
        assert_eq!(approval.status, ApprovalStatus::InProgress);
        assert!(approval.started_at.is_some());
        assert!(approval.completed_at.is_none());
    }
}
