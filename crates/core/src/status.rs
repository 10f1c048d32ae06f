//! Step lifecycle status vocabulary.

use serde::{Deserialize, Serialize};

pub const STATUS_NOT_STARTED: &str = "not_started";
pub const STATUS_IN_PROGRESS: &str = "in_progress";
pub const STATUS_AWAITING_APPROVALS: &str = "awaiting_approvals";
pub const STATUS_CHANGES_REQUESTED: &str = "changes_requested";
pub const STATUS_COMPLETE: &str = "complete";
pub const STATUS_REJECTED: &str = "rejected";

/// All valid step status strings.
pub const VALID_STEP_STATUSES: &[&str] = &[
    STATUS_NOT_STARTED,
    STATUS_IN_PROGRESS,
    STATUS_AWAITING_APPROVALS,
    STATUS_CHANGES_REQUESTED,
    STATUS_COMPLETE,
    STATUS_REJECTED,
];

/// The lifecycle state of a step.
///
/// A step's stored `status` column is nullable: when absent, the effective
/// status is derived from the approval ledger (see [`crate::gate`]). When
/// present, the explicit value is authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    NotStarted,
    InProgress,
    AwaitingApprovals,
    ChangesRequested,
    Complete,
    Rejected,
}

impl StepStatus {
    /// Convert to the database string value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => STATUS_NOT_STARTED,
            Self::InProgress => STATUS_IN_PROGRESS,
            Self::AwaitingApprovals => STATUS_AWAITING_APPROVALS,
            Self::ChangesRequested => STATUS_CHANGES_REQUESTED,
            Self::Complete => STATUS_COMPLETE,
            Self::Rejected => STATUS_REJECTED,
        }
    }

    /// Parse from a stored string value.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            STATUS_NOT_STARTED => Ok(Self::NotStarted),
            STATUS_IN_PROGRESS => Ok(Self::InProgress),
            STATUS_AWAITING_APPROVALS => Ok(Self::AwaitingApprovals),
            STATUS_CHANGES_REQUESTED => Ok(Self::ChangesRequested),
            STATUS_COMPLETE => Ok(Self::Complete),
            STATUS_REJECTED => Ok(Self::Rejected),
            other => Err(format!(
                "Invalid step status '{other}'. Must be one of: {}",
                VALID_STEP_STATUSES.join(", ")
            )),
        }
    }

    /// Human-readable label for display.
    pub fn label(self) -> &'static str {
        match self {
            Self::NotStarted => "Not Started",
            Self::InProgress => "In Progress",
            Self::AwaitingApprovals => "Awaiting Approvals",
            Self::ChangesRequested => "Changes Requested",
            Self::Complete => "Complete",
            Self::Rejected => "Rejected",
        }
    }

    /// Terminal until an explicit reopen or reset.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Rejected)
    }
}
