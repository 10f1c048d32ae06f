//! Step entity model and DTOs.

use greenlight_core::error::CoreError;
use greenlight_core::roles::RoleKey;
use greenlight_core::status::StepStatus;
use greenlight_core::types::{DbId, DueDate, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `steps` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Step {
    pub id: DbId,
    pub segment_id: DbId,
    /// Stable template key, unique within the segment.
    pub step_key: String,
    pub name: String,
    pub phase: String,
    pub due_date: Option<DueDate>,
    /// NULL means "derive from the approval ledger".
    pub status: Option<String>,
    pub assignee_id: Option<DbId>,
    pub is_gate: bool,
    pub gate_roles: Vec<String>,
    pub position: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Step {
    /// The explicit status override, if one is set.
    pub fn explicit_status(&self) -> Result<Option<StepStatus>, CoreError> {
        self.status
            .as_deref()
            .map(|s| StepStatus::from_str_value(s).map_err(CoreError::Internal))
            .transpose()
    }

    /// The parsed required-role set. Legacy alias strings in old rows are
    /// normalized during parsing; duplicates are dropped.
    pub fn required_roles(&self) -> Result<Vec<RoleKey>, CoreError> {
        let mut roles = Vec::with_capacity(self.gate_roles.len());
        for raw in &self.gate_roles {
            let rk = RoleKey::from_str_value(raw).map_err(CoreError::Internal)?;
            if !roles.contains(&rk) {
                roles.push(rk);
            }
        }
        Ok(roles)
    }
}

/// DTO for inserting a step row.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateStep {
    pub segment_id: DbId,
    pub step_key: String,
    pub name: String,
    pub phase: String,
    pub due_date: Option<DueDate>,
    pub assignee_id: Option<DbId>,
    pub is_gate: bool,
    pub gate_roles: Vec<String>,
    pub position: i32,
}

/// DTO for updating a step's editable fields.
///
/// `status` is double-optional: `None` leaves the column untouched,
/// `Some(None)` clears the explicit override (reset), `Some(Some(_))` sets
/// it.
#[derive(Debug, Clone, Default)]
pub struct UpdateStep {
    pub due_date: Option<Option<DueDate>>,
    pub status: Option<Option<StepStatus>>,
    pub assignee_id: Option<Option<DbId>>,
}
