//! Approval decision vocabulary and validation.

use serde::{Deserialize, Serialize};

/// The role's seat holder signed off.
pub const DECISION_APPROVED: &str = "approved";

/// The role's seat holder blocked completion.
pub const DECISION_REJECTED: &str = "rejected";

/// All valid decision values.
pub const VALID_DECISIONS: &[&str] = &[DECISION_APPROVED, DECISION_REJECTED];

/// A gate decision recorded against a (step, role, approver) triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approved,
    Rejected,
}

impl Decision {
    /// Convert to the database string value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Approved => DECISION_APPROVED,
            Self::Rejected => DECISION_REJECTED,
        }
    }

    /// Parse from a stored string value.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            DECISION_APPROVED => Ok(Self::Approved),
            DECISION_REJECTED => Ok(Self::Rejected),
            other => Err(format!(
                "Invalid decision '{other}'. Must be one of: {}",
                VALID_DECISIONS.join(", ")
            )),
        }
    }
}

/// Validate that a decision string is one of the accepted values.
pub fn validate_decision(decision: &str) -> Result<(), String> {
    Decision::from_str_value(decision).map(|_| ())
}
